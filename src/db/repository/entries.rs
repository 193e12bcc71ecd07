//! Schedule entry repository trait: the placement primitive and the
//! entry-level reads and writes built on it.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    ClassTimetableId, PlacementOutcome, PlacementPolicy, ScheduleEntryId, ScheduleEntryUpdate,
    TeacherTimetableId, TenantId,
};
use crate::models::ScheduleEntry;

/// Repository trait for schedule entries.
///
/// `place_entry` is the core primitive: referential checks, conflict
/// detection, and the insert happen as **one atomic step**, so two
/// concurrent placements into the same cell can never both miss the
/// other. The in-memory backend holds its state write-lock across the
/// whole placement; the Postgres backend runs it in one transaction
/// serialized by a per-tenant advisory lock.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ScheduleEntryRepository: Send + Sync {
    /// Place one schedule entry into its (class timetable, day, period)
    /// cell.
    ///
    /// Validates that the referenced class timetable, period, and teacher
    /// binding (when set) exist, are active, and belong to `entry.tenant_id`.
    /// Detects teacher double-bookings and room double-bookings against the
    /// entries present at commit time and records one conflict per colliding
    /// pair. Conflicts never fail the placement.
    ///
    /// # Arguments
    /// * `entry` - The fully-populated entry to store (id pre-generated)
    /// * `policy` - What to do when the active class cell is occupied:
    ///   `Reject` fails with `ValidationError`, `Replace` updates the
    ///   occupant in place and keeps its id
    ///
    /// # Returns
    /// * `Ok(PlacementOutcome)` - The stored entry plus any conflict
    ///   records created by this placement
    /// * `Err(RepositoryError::ReferentialIntegrityError)` - A referenced
    ///   entity is missing, inactive, or cross-tenant
    /// * `Err(RepositoryError::ValidationError)` - Occupied class cell
    ///   under the `Reject` policy
    async fn place_entry(
        &self,
        entry: &ScheduleEntry,
        policy: PlacementPolicy,
    ) -> RepositoryResult<PlacementOutcome>;

    /// Apply field changes to an existing entry and re-run conflict
    /// detection against the entry's new state, atomically.
    ///
    /// Moving the entry into an occupied active class cell is rejected.
    /// Newly detected conflicts are recorded and returned; conflicts
    /// recorded before the update are left untouched.
    async fn update_entry_checked(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
        changes: &ScheduleEntryUpdate,
    ) -> RepositoryResult<PlacementOutcome>;

    /// Delete an entry.
    ///
    /// Soft delete (`hard = false`) marks the entry `is_deleted = true,
    /// is_active = false` and keeps the row readable by id; hard delete
    /// removes the row. Existing conflict records are never auto-resolved
    /// by either mode.
    ///
    /// # Returns
    /// * `Ok(ScheduleEntry)` - The entry as it was deleted
    /// * `Err(RepositoryError::NotFound)` - Unknown id
    async fn delete_entry(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
        hard: bool,
    ) -> RepositoryResult<ScheduleEntry>;

    /// Fetch one entry by id, including soft-deleted entries.
    async fn get_entry(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
    ) -> RepositoryResult<ScheduleEntry>;

    /// Active, non-deleted entries of one class timetable.
    async fn list_entries_for_class(
        &self,
        tenant_id: TenantId,
        class_timetable_id: ClassTimetableId,
    ) -> RepositoryResult<Vec<ScheduleEntry>>;

    /// Active, non-deleted entries of one teacher timetable.
    async fn list_entries_for_teacher(
        &self,
        tenant_id: TenantId,
        teacher_timetable_id: TeacherTimetableId,
    ) -> RepositoryResult<Vec<ScheduleEntry>>;
}
