//! Repository abstraction for the timetable engine.
//!
//! The persistence surface is split into focused traits so callers can
//! depend on just the operations they use:
//!
//! - [`TimetableRepository`]: master timetables and period grids
//! - [`AssignmentRepository`]: class/teacher bindings
//! - [`ScheduleEntryRepository`]: atomic placement, updates, deletes
//! - [`ConflictRepository`]: conflict listing and resolution
//! - [`AnalyticsRepository`]: aggregate fetches
//!
//! [`FullRepository`] combines all of them and is what the service layer
//! and the global singleton use.

pub mod analytics;
pub mod assignments;
pub mod conflicts;
pub mod entries;
pub mod error;
pub mod timetables;

pub use analytics::{AnalyticsRepository, BindingCounts, TenantYearSnapshot};
pub use assignments::AssignmentRepository;
pub use conflicts::ConflictRepository;
pub use entries::ScheduleEntryRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use timetables::TimetableRepository;

/// The complete repository surface: every trait a backend must implement.
///
/// Blanket-implemented for any type that implements all of the focused
/// traits, so backends only implement those.
pub trait FullRepository:
    TimetableRepository
    + AssignmentRepository
    + ScheduleEntryRepository
    + ConflictRepository
    + AnalyticsRepository
    + std::fmt::Debug
{
}

impl<T> FullRepository for T where
    T: TimetableRepository
        + AssignmentRepository
        + ScheduleEntryRepository
        + ConflictRepository
        + AnalyticsRepository
        + std::fmt::Debug
{
}
