//! Master timetable repository trait.
//!
//! Covers the canonical period grids: creation of a master timetable
//! together with its generated periods, and the read side used by the
//! assignment and query layers.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{MasterTimetableFilter, MasterTimetableId, PeriodId, TenantId};
use crate::models::{MasterTimetable, TimetablePeriod};

/// Repository trait for master timetables and their period grids.
///
/// All reads are tenant-scoped: an id belonging to another tenant behaves
/// exactly like a missing id.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TimetableRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Persist a master timetable together with its generated periods as
    /// one unit of work.
    ///
    /// # Arguments
    /// * `timetable` - The master timetable to store
    /// * `periods` - The generated period grid (may be empty when grid
    ///   generation was skipped)
    ///
    /// # Returns
    /// * `Ok(MasterTimetable)` - The stored timetable
    /// * `Err(RepositoryError)` - If the write fails; no periods survive a
    ///   failed timetable write
    async fn store_master_timetable(
        &self,
        timetable: &MasterTimetable,
        periods: &[TimetablePeriod],
    ) -> RepositoryResult<MasterTimetable>;

    /// Fetch one master timetable by id.
    ///
    /// # Returns
    /// * `Ok(MasterTimetable)` - The timetable
    /// * `Err(RepositoryError::NotFound)` - Unknown, deleted, or
    ///   cross-tenant id
    async fn get_master_timetable(
        &self,
        tenant_id: TenantId,
        id: MasterTimetableId,
    ) -> RepositoryResult<MasterTimetable>;

    /// List non-deleted master timetables for a tenant, optionally
    /// filtered by academic year and status.
    async fn list_master_timetables(
        &self,
        tenant_id: TenantId,
        filter: &MasterTimetableFilter,
    ) -> RepositoryResult<Vec<MasterTimetable>>;

    /// Fetch the period grid of a master timetable, ordered by
    /// `period_number`.
    async fn get_periods(
        &self,
        tenant_id: TenantId,
        master_timetable_id: MasterTimetableId,
    ) -> RepositoryResult<Vec<TimetablePeriod>>;

    /// Fetch one period by id.
    async fn get_period(
        &self,
        tenant_id: TenantId,
        period_id: PeriodId,
    ) -> RepositoryResult<TimetablePeriod>;
}
