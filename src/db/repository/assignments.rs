//! Class and teacher binding repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{ClassId, ClassTimetableId, TeacherId, TeacherTimetableId, TenantId};
use crate::models::{ClassTimetable, TeacherTimetable};

/// Repository trait for class/teacher timetable bindings.
///
/// A binding attaches one class or teacher to a master timetable for an
/// academic year/term. At most one *active* binding may exist per
/// (entity, academic_year, term); the store operations enforce this
/// atomically with the insert so concurrent callers cannot both succeed.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Persist a class binding.
    ///
    /// # Returns
    /// * `Ok(ClassTimetable)` - The stored binding
    /// * `Err(RepositoryError::DuplicateBindingError)` - An active binding
    ///   already exists for the same (class, academic_year, term); the
    ///   existing binding is left untouched
    async fn store_class_timetable(
        &self,
        timetable: &ClassTimetable,
    ) -> RepositoryResult<ClassTimetable>;

    /// Persist a teacher binding.
    ///
    /// # Returns
    /// * `Ok(TeacherTimetable)` - The stored binding
    /// * `Err(RepositoryError::DuplicateBindingError)` - An active binding
    ///   already exists for the same (teacher, academic_year, term)
    async fn store_teacher_timetable(
        &self,
        timetable: &TeacherTimetable,
    ) -> RepositoryResult<TeacherTimetable>;

    /// Fetch one class binding by id. Unknown, deleted, and cross-tenant
    /// ids are `NotFound`.
    async fn get_class_timetable(
        &self,
        tenant_id: TenantId,
        id: ClassTimetableId,
    ) -> RepositoryResult<ClassTimetable>;

    /// Fetch one teacher binding by id.
    async fn get_teacher_timetable(
        &self,
        tenant_id: TenantId,
        id: TeacherTimetableId,
    ) -> RepositoryResult<TeacherTimetable>;

    /// Find the active binding of a class for an academic year, if any.
    async fn find_active_class_binding(
        &self,
        tenant_id: TenantId,
        class_id: ClassId,
        academic_year: &str,
    ) -> RepositoryResult<Option<ClassTimetable>>;

    /// Find the active binding of a teacher for an academic year, if any.
    async fn find_active_teacher_binding(
        &self,
        tenant_id: TenantId,
        teacher_id: TeacherId,
        academic_year: &str,
    ) -> RepositoryResult<Option<TeacherTimetable>>;
}
