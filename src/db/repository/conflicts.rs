//! Conflict repository trait.
//!
//! Conflict records are created as a side effect of placement (see
//! `ScheduleEntryRepository::place_entry`); this trait covers the read
//! side and the explicit resolution action that closes them.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{ConflictFilter, ConflictId, TenantId};
use crate::models::TimetableConflict;

/// Repository trait for detected timetable conflicts.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ConflictRepository: Send + Sync {
    /// List a tenant's conflicts, sorted by severity descending and then
    /// by creation time descending.
    ///
    /// # Arguments
    /// * `filter` - `unresolved_only` (defaults to true) and an optional
    ///   exact-severity filter
    async fn list_conflicts(
        &self,
        tenant_id: TenantId,
        filter: &ConflictFilter,
    ) -> RepositoryResult<Vec<TimetableConflict>>;

    /// Fetch one conflict by id.
    async fn get_conflict(
        &self,
        tenant_id: TenantId,
        id: ConflictId,
    ) -> RepositoryResult<TimetableConflict>;

    /// Mark a conflict resolved.
    ///
    /// # Returns
    /// * `Ok(TimetableConflict)` - The updated record with
    ///   `is_resolved = true` and `resolved_date` set
    /// * `Err(RepositoryError::NotFound)` - Unknown id
    /// * `Err(RepositoryError::ValidationError)` - Already resolved
    async fn resolve_conflict(
        &self,
        tenant_id: TenantId,
        id: ConflictId,
        resolved_by: &str,
        resolution_notes: Option<&str>,
    ) -> RepositoryResult<TimetableConflict>;
}
