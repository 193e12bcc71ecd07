//! Analytics repository trait for aggregate queries.
//!
//! The repository only fetches; the statistics themselves are computed in
//! `crate::services::analytics` from the fetched rows, so both backends
//! share one implementation of the math.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{MasterTimetableId, TenantId};
use crate::models::{
    ClassTimetable, MasterTimetable, ScheduleEntry, TeacherTimetable, TimetableConflict,
};

/// Usage counts of one master timetable, aggregated at read time rather
/// than stored redundantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingCounts {
    pub classes: usize,
    pub teachers: usize,
    pub schedule_entries: usize,
}

/// Everything the analytics math needs for one (tenant, academic year).
///
/// `entries` are the active, non-deleted entries whose class binding
/// carries the academic year; bindings are the active ones for the year.
/// `conflicts` are tenant-wide (conflict records carry no year).
#[derive(Debug, Clone, Default)]
pub struct TenantYearSnapshot {
    pub master_timetables: Vec<MasterTimetable>,
    pub class_timetables: Vec<ClassTimetable>,
    pub teacher_timetables: Vec<TeacherTimetable>,
    pub entries: Vec<ScheduleEntry>,
    pub conflicts: Vec<TimetableConflict>,
}

/// Repository trait for analytics fetches.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Count the active bindings and entries attached to one master
    /// timetable.
    ///
    /// # Arguments
    /// * `master_timetable_id` - The master timetable to count for
    ///
    /// # Returns
    /// * `Ok(BindingCounts)` - Zero counts when the id is unknown
    /// * `Err(RepositoryError)` - If the fetch fails
    async fn binding_counts(
        &self,
        tenant_id: TenantId,
        master_timetable_id: MasterTimetableId,
    ) -> RepositoryResult<BindingCounts>;

    /// Fetch the rows backing tenant-level analytics for one academic
    /// year.
    ///
    /// # Returns
    /// * `Ok(TenantYearSnapshot)` - Possibly-empty row sets
    /// * `Err(RepositoryError)` - If the fetch fails
    async fn fetch_tenant_snapshot(
        &self,
        tenant_id: TenantId,
        academic_year: &str,
    ) -> RepositoryResult<TenantYearSnapshot>;
}
