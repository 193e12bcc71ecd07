//! Database module for timetable data storage.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! The database module follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (admin tooling, import jobs, etc.)   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic           │
//! │  - Period grid generation and fit validation            │
//! │  - Placement orchestration and bulk row isolation       │
//! │  - Weekly/daily projections and analytics               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │      Local (in-memory) / Postgres backends    │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! # Repository Pattern
//! The module includes:
//! - `services`: High-level business logic functions (use these in your application!)
//! - `repository`: Trait definitions for database operations
//! - `repositories::postgres`: Postgres implementation with Diesel ORM
//! - `repositories::local`: In-memory implementation for unit testing and local development
//! - `factory`: Factory for creating repository instances
//!
//! # Recommended Usage
//!
//! **For new code, use the service layer:**
//! ```ignore
//! use tms_rust::db::{services, factory, RepositoryType};
//! use tms_rust::api::{MasterTimetableFilter, TenantId};
//!
//! async fn example(tenant: TenantId) -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = factory::RepositoryFactory::create(RepositoryType::Local, None).await?;
//!
//!     // Use service layer functions
//!     let filter = MasterTimetableFilter::default();
//!     let timetables = services::list_master_timetables(repo.as_ref(), tenant, &filter).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Postgres Implementation
//! PostgreSQL-specific code is in `repositories::postgres`.

// Feature flag priority: postgres > local
// When multiple features are enabled (e.g., --all-features), postgres takes precedence.
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    _private: (),
}

// ==================== Service Layer (Recommended for new code) ====================
// Use these high-level functions that work with any repository implementation

pub use services::{
    bulk_create_schedule_entries, bulk_delete_schedule_entries, bulk_update_schedule_entries,
    create_class_timetable, create_master_timetable, create_teacher_timetable,
    delete_schedule_entry, get_class_daily_schedule, get_class_timetable,
    get_class_weekly_schedule, get_conflicts, get_master_timetable, get_period_grid,
    get_room_utilization, get_teacher_timetable, get_teacher_weekly_schedule,
    get_teacher_workload, get_timetable_analytics, health_check, list_master_timetables,
    place_schedule_entry, resolve_conflict, update_schedule_entry,
};

// ==================== Repository Pattern Exports ====================

pub use repo_config::RepositoryConfig;

// Repository traits and implementations
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AnalyticsRepository, AssignmentRepository, BindingCounts, ConflictRepository, ErrorContext,
    FullRepository, RepositoryError, RepositoryResult, ScheduleEntryRepository,
    TenantYearSnapshot, TimetableRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};
#[cfg(feature = "postgres-repo")]
use tokio::runtime::Runtime;

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

// Priority: postgres > local (when --all-features is used)
#[cfg(feature = "postgres-repo")]
async fn create_selected_repository() -> RepositoryResult<Arc<dyn FullRepository>> {
    let config = PostgresConfig::from_env()?;
    let repo = RepositoryFactory::create_postgres(&config).await?;
    Ok(repo as Arc<dyn FullRepository>)
}

#[cfg(all(feature = "local-repo", not(feature = "postgres-repo")))]
fn create_selected_repository() -> RepositoryResult<Arc<dyn FullRepository>> {
    Ok(RepositoryFactory::create_local())
}

/// Initialize the global repository singleton for the selected backend.
#[cfg(feature = "postgres-repo")]
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let runtime = Runtime::new().context("Failed to create async runtime for repository init")?;
    let repo = runtime
        .block_on(create_selected_repository())
        .map_err(|e| anyhow::Error::msg(e.to_string()))?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Initialize the global repository singleton for the selected backend.
#[cfg(all(feature = "local-repo", not(feature = "postgres-repo")))]
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = create_selected_repository()?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Database not initialized. Call init_repository() first.")
}
