//! Service layer for scheduling logic and pure computation.
//!
//! This module contains the computation that sits between the database
//! operations and the public API: period grid generation, weekly/daily
//! schedule projection, analytics math, and conflict record construction.
//! Everything here is pure; orchestration and persistence live in
//! `crate::db::services`.

pub mod analytics;
pub mod conflicts;
pub mod grid;
pub mod weekly;

pub use analytics::{compute_analytics, compute_room_utilization, compute_teacher_workload};
pub use conflicts::{room_conflict, teacher_double_booking};
pub use grid::{generate_periods, validate_config, GeneratedPeriod, GridConfig};
pub use weekly::{project_class_day, project_class_week, project_teacher_week};
