//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres database
//! using the migrations embedded under `migrations/`.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//! - Per-tenant advisory locks around schedule writes
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `TMS_MAX_CONNECTIONS` or `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
//! - `TMS_RUN_MIGRATIONS`: Run pending migrations on startup (default: true)

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task;
use uuid::Uuid;

use crate::api::{
    ClassId, ClassTimetableId, ConflictFilter, ConflictId, MasterTimetableFilter,
    MasterTimetableId, PeriodId, PlacementOutcome, PlacementPolicy, ScheduleEntryId,
    ScheduleEntryUpdate, TeacherId, TeacherTimetableId, TenantId,
};
use crate::db::repository::{
    AnalyticsRepository, AssignmentRepository, BindingCounts, ConflictRepository, ErrorContext,
    RepositoryError, RepositoryResult, ScheduleEntryRepository, TenantYearSnapshot,
    TimetableRepository,
};
use crate::models::{
    ClassTimetable, ConflictSeverity, ConflictType, DayOfWeek, MasterTimetable, PeriodType,
    ScheduleEntry, TeacherTimetable, TimetableConflict, TimetablePeriod, TimetableStatus,
};
use crate::services::conflicts as conflict_records;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
    /// Whether to run pending migrations during initialization
    pub run_migrations: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_retries: 3,
            retry_delay_ms: 100,
            run_migrations: true,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `TMS_MAX_CONNECTIONS` or `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    /// - `PG_MAX_RETRIES`: Maximum retry attempts (default: 3)
    /// - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
    /// - `TMS_RUN_MIGRATIONS`: Run pending migrations on startup (default: true)
    pub fn from_env() -> RepositoryResult<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| {
                RepositoryError::configuration("DATABASE_URL or PG_DATABASE_URL must be set")
            })?;

        let max_pool_size = std::env::var("TMS_MAX_CONNECTIONS")
            .or_else(|_| std::env::var("PG_POOL_MAX"))
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_secs = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        let run_migrations = std::env::var("TMS_RUN_MIGRATIONS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_secs,
            idle_timeout_secs,
            max_retries,
            retry_delay_ms,
            run_migrations,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// This repository implementation provides:
/// - Connection pooling with configurable limits
/// - Automatic retry for transient failures
/// - Health monitoring and statistics
/// - Automatic schema migrations
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Arguments
    /// * `config` - Database configuration
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        if config.run_migrations {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// This method will retry the operation up to `max_retries` times if a
    /// retryable error occurs (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                // Get connection
                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                // Execute the operation
                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    ///
    /// Returns current pool state and query statistics for monitoring.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    ///
    /// Performs a simple query to verify connectivity.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Get detailed health information.
    ///
    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// The partial unique indexes on the binding tables back the duplicate
/// pre-checks under concurrent inserts.
fn map_binding_violation(
    err: diesel::result::Error,
    message: impl FnOnce() -> String,
) -> RepositoryError {
    match &err {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => RepositoryError::duplicate_binding(message()),
        _ => map_diesel_error(err),
    }
}

/// Serialize schedule writes for one tenant. The transaction-scoped advisory
/// lock guarantees that two concurrent placements into the same cell always
/// see each other, matching the single-lock behavior of the local backend.
fn lock_tenant_grid(conn: &mut PgConnection, tenant_id: TenantId) -> RepositoryResult<()> {
    sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind::<diesel::sql_types::Text, _>(tenant_id.to_string())
        .execute(conn)
        .map(|_| ())
        .map_err(map_diesel_error)
}

// ==================== Row Conversions ====================

fn days_to_json(days: &[DayOfWeek]) -> Value {
    serde_json::to_value(days).unwrap_or_else(|_| json!([]))
}

fn json_to_days(value: &Value) -> RepositoryResult<Vec<DayOfWeek>> {
    serde_json::from_value(value.clone())
        .map_err(|e| RepositoryError::internal(format!("Failed to parse day list JSON: {e}")))
}

fn master_to_row(t: &MasterTimetable) -> MasterTimetableRow {
    MasterTimetableRow {
        id: t.id.value(),
        tenant_id: t.tenant_id.value(),
        timetable_name: t.timetable_name.clone(),
        description: t.description.clone(),
        academic_year: t.academic_year.clone(),
        term: t.term.clone(),
        effective_from: t.effective_from,
        effective_until: t.effective_until,
        total_periods_per_day: t.total_periods_per_day,
        school_start_time: t.school_start_time,
        school_end_time: t.school_end_time,
        period_duration: t.period_duration,
        break_duration: t.break_duration,
        lunch_duration: t.lunch_duration,
        working_days: days_to_json(&t.working_days),
        status: t.status.as_str().to_string(),
        is_default: t.is_default,
        is_deleted: t.is_deleted,
        created_at: t.created_at,
        updated_at: t.updated_at,
    }
}

fn row_to_master(row: MasterTimetableRow) -> RepositoryResult<MasterTimetable> {
    let working_days = json_to_days(&row.working_days)?;
    let status: TimetableStatus = row.status.parse()?;
    Ok(MasterTimetable {
        id: MasterTimetableId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        timetable_name: row.timetable_name,
        description: row.description,
        academic_year: row.academic_year,
        term: row.term,
        effective_from: row.effective_from,
        effective_until: row.effective_until,
        total_periods_per_day: row.total_periods_per_day,
        school_start_time: row.school_start_time,
        school_end_time: row.school_end_time,
        period_duration: row.period_duration,
        break_duration: row.break_duration,
        lunch_duration: row.lunch_duration,
        working_days,
        status,
        is_default: row.is_default,
        is_deleted: row.is_deleted,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn period_to_row(p: &TimetablePeriod) -> PeriodRow {
    PeriodRow {
        id: p.id.value(),
        tenant_id: p.tenant_id.value(),
        master_timetable_id: p.master_timetable_id.value(),
        period_number: p.period_number,
        period_name: p.period_name.clone(),
        period_type: p.period_type.as_str().to_string(),
        start_time: p.start_time,
        end_time: p.end_time,
        duration_minutes: p.duration_minutes,
        is_teaching_period: p.is_teaching_period,
        is_deleted: p.is_deleted,
        created_at: p.created_at,
        updated_at: p.updated_at,
    }
}

fn row_to_period(row: PeriodRow) -> RepositoryResult<TimetablePeriod> {
    let period_type: PeriodType = row.period_type.parse()?;
    Ok(TimetablePeriod {
        id: PeriodId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        master_timetable_id: MasterTimetableId::new(row.master_timetable_id),
        period_number: row.period_number,
        period_name: row.period_name,
        period_type,
        start_time: row.start_time,
        end_time: row.end_time,
        duration_minutes: row.duration_minutes,
        is_teaching_period: row.is_teaching_period,
        is_deleted: row.is_deleted,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn class_to_row(c: &ClassTimetable) -> ClassTimetableRow {
    ClassTimetableRow {
        id: c.id.value(),
        tenant_id: c.tenant_id.value(),
        class_id: c.class_id.value(),
        master_timetable_id: c.master_timetable_id.value(),
        academic_year: c.academic_year.clone(),
        term: c.term.clone(),
        class_name: c.class_name.clone(),
        grade_level: c.grade_level.clone(),
        is_active: c.is_active,
        is_deleted: c.is_deleted,
        created_at: c.created_at,
        updated_at: c.updated_at,
    }
}

fn row_to_class(row: ClassTimetableRow) -> RepositoryResult<ClassTimetable> {
    Ok(ClassTimetable {
        id: ClassTimetableId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        class_id: ClassId::new(row.class_id),
        master_timetable_id: MasterTimetableId::new(row.master_timetable_id),
        academic_year: row.academic_year,
        term: row.term,
        class_name: row.class_name,
        grade_level: row.grade_level,
        is_active: row.is_active,
        is_deleted: row.is_deleted,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn teacher_binding_to_row(t: &TeacherTimetable) -> TeacherTimetableRow {
    TeacherTimetableRow {
        id: t.id.value(),
        tenant_id: t.tenant_id.value(),
        teacher_id: t.teacher_id.value(),
        master_timetable_id: t.master_timetable_id.value(),
        academic_year: t.academic_year.clone(),
        term: t.term.clone(),
        teacher_name: t.teacher_name.clone(),
        max_periods_per_day: t.max_periods_per_day,
        total_periods_per_week: t.total_periods_per_week,
        preferred_periods: serde_json::to_value(&t.preferred_periods)
            .unwrap_or_else(|_| json!([])),
        preferred_days: days_to_json(&t.preferred_days),
        is_active: t.is_active,
        is_deleted: t.is_deleted,
        created_at: t.created_at,
        updated_at: t.updated_at,
    }
}

fn row_to_teacher_binding(row: TeacherTimetableRow) -> RepositoryResult<TeacherTimetable> {
    let preferred_periods: Vec<i32> =
        serde_json::from_value(row.preferred_periods).map_err(|e| {
            RepositoryError::internal(format!("Failed to parse preferred period JSON: {e}"))
        })?;
    let preferred_days = json_to_days(&row.preferred_days)?;
    Ok(TeacherTimetable {
        id: TeacherTimetableId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        teacher_id: TeacherId::new(row.teacher_id),
        master_timetable_id: MasterTimetableId::new(row.master_timetable_id),
        academic_year: row.academic_year,
        term: row.term,
        teacher_name: row.teacher_name,
        max_periods_per_day: row.max_periods_per_day,
        total_periods_per_week: row.total_periods_per_week,
        preferred_periods,
        preferred_days,
        is_active: row.is_active,
        is_deleted: row.is_deleted,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn entry_to_row(e: &ScheduleEntry) -> ScheduleEntryRow {
    ScheduleEntryRow {
        id: e.id.value(),
        tenant_id: e.tenant_id.value(),
        class_timetable_id: e.class_timetable_id.value(),
        teacher_timetable_id: e.teacher_timetable_id.map(|t| t.value()),
        period_id: e.period_id.value(),
        day_of_week: e.day_of_week.as_str().to_string(),
        subject_name: e.subject_name.clone(),
        subject_code: e.subject_code.clone(),
        teacher_name: e.teacher_name.clone(),
        room_number: e.room_number.clone(),
        building: e.building.clone(),
        notes: e.notes.clone(),
        is_substitution: e.is_substitution,
        is_recurring: e.is_recurring,
        effective_date: e.effective_date,
        expiry_date: e.expiry_date,
        batch_id: e.batch_id,
        import_source: e.import_source.clone(),
        is_active: e.is_active,
        is_deleted: e.is_deleted,
        created_at: e.created_at,
        updated_at: e.updated_at,
    }
}

fn row_to_entry(row: ScheduleEntryRow) -> RepositoryResult<ScheduleEntry> {
    let day_of_week: DayOfWeek = row.day_of_week.parse()?;
    Ok(ScheduleEntry {
        id: ScheduleEntryId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        class_timetable_id: ClassTimetableId::new(row.class_timetable_id),
        teacher_timetable_id: row.teacher_timetable_id.map(TeacherTimetableId::new),
        period_id: PeriodId::new(row.period_id),
        day_of_week,
        subject_name: row.subject_name,
        subject_code: row.subject_code,
        teacher_name: row.teacher_name,
        room_number: row.room_number,
        building: row.building,
        notes: row.notes,
        is_substitution: row.is_substitution,
        is_recurring: row.is_recurring,
        effective_date: row.effective_date,
        expiry_date: row.expiry_date,
        batch_id: row.batch_id,
        import_source: row.import_source,
        is_active: row.is_active,
        is_deleted: row.is_deleted,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn conflict_to_row(c: &TimetableConflict) -> TimetableConflictRow {
    TimetableConflictRow {
        id: c.id.value(),
        tenant_id: c.tenant_id.value(),
        conflict_type: c.conflict_type.as_str().to_string(),
        severity: c.severity.as_str().to_string(),
        title: c.title.clone(),
        description: c.description.clone(),
        schedule_entry_1_id: c.schedule_entry_1_id.map(|v| v.value()),
        schedule_entry_2_id: c.schedule_entry_2_id.map(|v| v.value()),
        teacher_id: c.teacher_id.map(|v| v.value()),
        room_number: c.room_number.clone(),
        day_of_week: c.day_of_week.map(|d| d.as_str().to_string()),
        period_number: c.period_number,
        conflict_data: c.conflict_data.clone(),
        detected_by: c.detected_by.clone(),
        is_resolved: c.is_resolved,
        resolved_by: c.resolved_by.clone(),
        resolution_notes: c.resolution_notes.clone(),
        resolved_date: c.resolved_date,
        is_deleted: c.is_deleted,
        created_at: c.created_at,
        updated_at: c.updated_at,
    }
}

fn row_to_conflict(row: TimetableConflictRow) -> RepositoryResult<TimetableConflict> {
    let conflict_type: ConflictType = row.conflict_type.parse()?;
    let severity: ConflictSeverity = row.severity.parse()?;
    let day_of_week = row
        .day_of_week
        .map(|d| d.parse::<DayOfWeek>())
        .transpose()?;
    Ok(TimetableConflict {
        id: ConflictId::new(row.id),
        tenant_id: TenantId::new(row.tenant_id),
        conflict_type,
        severity,
        title: row.title,
        description: row.description,
        schedule_entry_1_id: row.schedule_entry_1_id.map(ScheduleEntryId::new),
        schedule_entry_2_id: row.schedule_entry_2_id.map(ScheduleEntryId::new),
        teacher_id: row.teacher_id.map(TeacherId::new),
        room_number: row.room_number,
        day_of_week,
        period_number: row.period_number,
        conflict_data: row.conflict_data,
        detected_by: row.detected_by,
        is_resolved: row.is_resolved,
        resolved_by: row.resolved_by,
        resolution_notes: row.resolution_notes,
        resolved_date: row.resolved_date,
        is_deleted: row.is_deleted,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

// ==================== Placement Helpers ====================

/// Label for a class in conflict context data: the binding's class name
/// when set, else the class id.
fn class_label_sql(
    conn: &mut PgConnection,
    class_timetable_id: ClassTimetableId,
) -> RepositoryResult<String> {
    let row: Option<(Option<String>, Uuid)> = class_timetables::table
        .filter(class_timetables::id.eq(class_timetable_id.value()))
        .select((class_timetables::class_name, class_timetables::class_id))
        .first(conn)
        .optional()
        .map_err(map_diesel_error)?;

    Ok(match row {
        Some((Some(name), _)) => name,
        Some((None, class_id)) => class_id.to_string(),
        None => class_timetable_id.to_string(),
    })
}

/// Check that everything `entry` references exists, is active, and belongs
/// to `entry.tenant_id`. Returns the period number of the referenced period
/// for use in conflict records.
fn validate_entry_refs_sql(
    conn: &mut PgConnection,
    entry: &ScheduleEntry,
    operation: &str,
) -> RepositoryResult<f64> {
    let class_binding: Option<ClassTimetableRow> = class_timetables::table
        .filter(class_timetables::id.eq(entry.class_timetable_id.value()))
        .filter(class_timetables::tenant_id.eq(entry.tenant_id.value()))
        .filter(class_timetables::is_active.eq(true))
        .filter(class_timetables::is_deleted.eq(false))
        .select(ClassTimetableRow::as_select())
        .first(conn)
        .optional()
        .map_err(map_diesel_error)?;
    let class_binding = class_binding.ok_or_else(|| {
        RepositoryError::referential_integrity_with_context(
            format!(
                "Class timetable {} not found or inactive",
                entry.class_timetable_id
            ),
            ErrorContext::new(operation)
                .with_entity("class_timetable")
                .with_entity_id(entry.class_timetable_id),
        )
    })?;

    let period: Option<PeriodRow> = periods::table
        .filter(periods::id.eq(entry.period_id.value()))
        .filter(periods::tenant_id.eq(entry.tenant_id.value()))
        .filter(periods::is_deleted.eq(false))
        .select(PeriodRow::as_select())
        .first(conn)
        .optional()
        .map_err(map_diesel_error)?;
    let period = period.ok_or_else(|| {
        RepositoryError::referential_integrity_with_context(
            format!("Period {} not found", entry.period_id),
            ErrorContext::new(operation)
                .with_entity("period")
                .with_entity_id(entry.period_id),
        )
    })?;

    if period.master_timetable_id != class_binding.master_timetable_id {
        return Err(RepositoryError::referential_integrity_with_context(
            format!(
                "Period {} does not belong to the master timetable of class timetable {}",
                entry.period_id, entry.class_timetable_id
            ),
            ErrorContext::new(operation)
                .with_entity("period")
                .with_entity_id(entry.period_id),
        ));
    }

    if let Some(teacher_timetable_id) = entry.teacher_timetable_id {
        let teacher_count: i64 = teacher_timetables::table
            .filter(teacher_timetables::id.eq(teacher_timetable_id.value()))
            .filter(teacher_timetables::tenant_id.eq(entry.tenant_id.value()))
            .filter(teacher_timetables::is_active.eq(true))
            .filter(teacher_timetables::is_deleted.eq(false))
            .count()
            .get_result(conn)
            .map_err(map_diesel_error)?;
        if teacher_count == 0 {
            return Err(RepositoryError::referential_integrity_with_context(
                format!(
                    "Teacher timetable {} not found or inactive",
                    teacher_timetable_id
                ),
                ErrorContext::new(operation)
                    .with_entity("teacher_timetable")
                    .with_entity_id(teacher_timetable_id),
            ));
        }
    }

    Ok(period.period_number)
}

/// The active occupant of `entry`'s class cell, other than `entry` itself.
fn cell_occupant_sql(
    conn: &mut PgConnection,
    entry: &ScheduleEntry,
) -> RepositoryResult<Option<ScheduleEntryRow>> {
    schedule_entries::table
        .filter(schedule_entries::id.ne(entry.id.value()))
        .filter(schedule_entries::tenant_id.eq(entry.tenant_id.value()))
        .filter(schedule_entries::class_timetable_id.eq(entry.class_timetable_id.value()))
        .filter(schedule_entries::day_of_week.eq(entry.day_of_week.as_str()))
        .filter(schedule_entries::period_id.eq(entry.period_id.value()))
        .filter(schedule_entries::is_active.eq(true))
        .filter(schedule_entries::is_deleted.eq(false))
        .select(ScheduleEntryRow::as_select())
        .first(conn)
        .optional()
        .map_err(map_diesel_error)
}

/// Run the teacher and room checks for `stored` against every other active
/// entry, one record per colliding pair. Does not write; the caller inserts
/// the returned records inside its own transaction.
fn detect_conflicts_sql(
    conn: &mut PgConnection,
    stored: &ScheduleEntry,
    period_number: f64,
) -> RepositoryResult<Vec<TimetableConflict>> {
    let mut conflicts = Vec::new();

    if let Some(teacher_timetable_id) = stored.teacher_timetable_id {
        let teacher_row: Option<TeacherTimetableRow> = teacher_timetables::table
            .filter(teacher_timetables::id.eq(teacher_timetable_id.value()))
            .select(TeacherTimetableRow::as_select())
            .first(conn)
            .optional()
            .map_err(map_diesel_error)?;

        if let Some(teacher_row) = teacher_row {
            let teacher = row_to_teacher_binding(teacher_row)?;
            let rows: Vec<ScheduleEntryRow> = schedule_entries::table
                .filter(schedule_entries::id.ne(stored.id.value()))
                .filter(schedule_entries::tenant_id.eq(stored.tenant_id.value()))
                .filter(schedule_entries::teacher_timetable_id.eq(teacher_timetable_id.value()))
                .filter(schedule_entries::day_of_week.eq(stored.day_of_week.as_str()))
                .filter(schedule_entries::period_id.eq(stored.period_id.value()))
                .filter(schedule_entries::is_active.eq(true))
                .filter(schedule_entries::is_deleted.eq(false))
                .select(ScheduleEntryRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;

            for row in rows {
                let existing = row_to_entry(row)?;
                let labels = (
                    class_label_sql(conn, existing.class_timetable_id)?,
                    class_label_sql(conn, stored.class_timetable_id)?,
                );
                conflicts.push(conflict_records::teacher_double_booking(
                    &existing,
                    stored,
                    &teacher,
                    period_number,
                    labels,
                ));
            }
        }
    }

    if let Some(room) = stored.occupied_room() {
        let room = room.to_string();
        let rows: Vec<ScheduleEntryRow> = schedule_entries::table
            .filter(schedule_entries::id.ne(stored.id.value()))
            .filter(schedule_entries::tenant_id.eq(stored.tenant_id.value()))
            .filter(schedule_entries::day_of_week.eq(stored.day_of_week.as_str()))
            .filter(schedule_entries::period_id.eq(stored.period_id.value()))
            .filter(schedule_entries::room_number.eq(room.clone()))
            .filter(schedule_entries::is_active.eq(true))
            .filter(schedule_entries::is_deleted.eq(false))
            .select(ScheduleEntryRow::as_select())
            .load(conn)
            .map_err(map_diesel_error)?;

        for row in rows {
            let existing = row_to_entry(row)?;
            conflicts.push(conflict_records::room_conflict(
                &existing,
                stored,
                &room,
                period_number,
            ));
        }
    }

    Ok(conflicts)
}

fn insert_conflicts(
    conn: &mut PgConnection,
    conflicts: &[TimetableConflict],
) -> RepositoryResult<()> {
    if conflicts.is_empty() {
        return Ok(());
    }
    let rows: Vec<TimetableConflictRow> = conflicts.iter().map(conflict_to_row).collect();
    diesel::insert_into(timetable_conflicts::table)
        .values(&rows)
        .execute(conn)
        .map_err(map_diesel_error)?;
    Ok(())
}

// ==================== Timetable Repository ====================

#[async_trait]
impl TimetableRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn store_master_timetable(
        &self,
        timetable: &MasterTimetable,
        periods: &[TimetablePeriod],
    ) -> RepositoryResult<MasterTimetable> {
        let timetable = timetable.clone();
        let grid: Vec<TimetablePeriod> = periods.to_vec();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                diesel::insert_into(master_timetables::table)
                    .values(master_to_row(&timetable))
                    .execute(tx)
                    .map_err(map_diesel_error)?;

                if !grid.is_empty() {
                    let period_rows: Vec<PeriodRow> = grid.iter().map(period_to_row).collect();
                    diesel::insert_into(periods::table)
                        .values(&period_rows)
                        .execute(tx)
                        .map_err(map_diesel_error)?;
                }

                Ok(timetable.clone())
            })
        })
        .await
    }

    async fn get_master_timetable(
        &self,
        tenant_id: TenantId,
        id: MasterTimetableId,
    ) -> RepositoryResult<MasterTimetable> {
        self.with_conn(move |conn| {
            let row: Option<MasterTimetableRow> = master_timetables::table
                .filter(master_timetables::id.eq(id.value()))
                .filter(master_timetables::tenant_id.eq(tenant_id.value()))
                .filter(master_timetables::is_deleted.eq(false))
                .select(MasterTimetableRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_master).transpose()?.ok_or_else(|| {
                RepositoryError::not_found(format!("Master timetable {} not found", id))
            })
        })
        .await
    }

    async fn list_master_timetables(
        &self,
        tenant_id: TenantId,
        filter: &MasterTimetableFilter,
    ) -> RepositoryResult<Vec<MasterTimetable>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = master_timetables::table
                .filter(master_timetables::tenant_id.eq(tenant_id.value()))
                .filter(master_timetables::is_deleted.eq(false))
                .select(MasterTimetableRow::as_select())
                .order(master_timetables::created_at.desc())
                .into_boxed();

            if let Some(ref year) = filter.academic_year {
                query = query.filter(master_timetables::academic_year.eq(year.clone()));
            }
            if let Some(status) = filter.status {
                query = query.filter(master_timetables::status.eq(status.as_str()));
            }

            let rows = query
                .load::<MasterTimetableRow>(conn)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_master).collect()
        })
        .await
    }

    async fn get_periods(
        &self,
        tenant_id: TenantId,
        master_timetable_id: MasterTimetableId,
    ) -> RepositoryResult<Vec<TimetablePeriod>> {
        self.with_conn(move |conn| {
            let rows: Vec<PeriodRow> = periods::table
                .filter(periods::tenant_id.eq(tenant_id.value()))
                .filter(periods::master_timetable_id.eq(master_timetable_id.value()))
                .filter(periods::is_deleted.eq(false))
                .select(PeriodRow::as_select())
                .order(periods::period_number.asc())
                .load(conn)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_period).collect()
        })
        .await
    }

    async fn get_period(
        &self,
        tenant_id: TenantId,
        period_id: PeriodId,
    ) -> RepositoryResult<TimetablePeriod> {
        self.with_conn(move |conn| {
            let row: Option<PeriodRow> = periods::table
                .filter(periods::id.eq(period_id.value()))
                .filter(periods::tenant_id.eq(tenant_id.value()))
                .filter(periods::is_deleted.eq(false))
                .select(PeriodRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_period).transpose()?.ok_or_else(|| {
                RepositoryError::not_found(format!("Period {} not found", period_id))
            })
        })
        .await
    }
}

// ==================== Assignment Repository ====================

#[async_trait]
impl AssignmentRepository for PostgresRepository {
    async fn store_class_timetable(
        &self,
        timetable: &ClassTimetable,
    ) -> RepositoryResult<ClassTimetable> {
        let timetable = timetable.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                if timetable.is_active {
                    let duplicates: i64 = class_timetables::table
                        .filter(class_timetables::id.ne(timetable.id.value()))
                        .filter(class_timetables::tenant_id.eq(timetable.tenant_id.value()))
                        .filter(class_timetables::class_id.eq(timetable.class_id.value()))
                        .filter(
                            class_timetables::academic_year.eq(timetable.academic_year.clone()),
                        )
                        .filter(class_timetables::term.is_not_distinct_from(timetable.term.clone()))
                        .filter(class_timetables::is_active.eq(true))
                        .filter(class_timetables::is_deleted.eq(false))
                        .count()
                        .get_result(tx)
                        .map_err(map_diesel_error)?;
                    if duplicates > 0 {
                        return Err(RepositoryError::duplicate_binding_with_context(
                            format!(
                                "Class {} already has an active timetable for {}",
                                timetable.class_id, timetable.academic_year
                            ),
                            ErrorContext::new("store_class_timetable")
                                .with_entity("class_timetable")
                                .with_entity_id(timetable.class_id),
                        ));
                    }
                }

                diesel::insert_into(class_timetables::table)
                    .values(class_to_row(&timetable))
                    .execute(tx)
                    .map_err(|e| {
                        map_binding_violation(e, || {
                            format!(
                                "Class {} already has an active timetable for {}",
                                timetable.class_id, timetable.academic_year
                            )
                        })
                    })?;

                Ok(timetable.clone())
            })
        })
        .await
    }

    async fn store_teacher_timetable(
        &self,
        timetable: &TeacherTimetable,
    ) -> RepositoryResult<TeacherTimetable> {
        let timetable = timetable.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                if timetable.is_active {
                    let duplicates: i64 = teacher_timetables::table
                        .filter(teacher_timetables::id.ne(timetable.id.value()))
                        .filter(teacher_timetables::tenant_id.eq(timetable.tenant_id.value()))
                        .filter(teacher_timetables::teacher_id.eq(timetable.teacher_id.value()))
                        .filter(
                            teacher_timetables::academic_year.eq(timetable.academic_year.clone()),
                        )
                        .filter(
                            teacher_timetables::term.is_not_distinct_from(timetable.term.clone()),
                        )
                        .filter(teacher_timetables::is_active.eq(true))
                        .filter(teacher_timetables::is_deleted.eq(false))
                        .count()
                        .get_result(tx)
                        .map_err(map_diesel_error)?;
                    if duplicates > 0 {
                        return Err(RepositoryError::duplicate_binding_with_context(
                            format!(
                                "Teacher {} already has an active timetable for {}",
                                timetable.teacher_id, timetable.academic_year
                            ),
                            ErrorContext::new("store_teacher_timetable")
                                .with_entity("teacher_timetable")
                                .with_entity_id(timetable.teacher_id),
                        ));
                    }
                }

                diesel::insert_into(teacher_timetables::table)
                    .values(teacher_binding_to_row(&timetable))
                    .execute(tx)
                    .map_err(|e| {
                        map_binding_violation(e, || {
                            format!(
                                "Teacher {} already has an active timetable for {}",
                                timetable.teacher_id, timetable.academic_year
                            )
                        })
                    })?;

                Ok(timetable.clone())
            })
        })
        .await
    }

    async fn get_class_timetable(
        &self,
        tenant_id: TenantId,
        id: ClassTimetableId,
    ) -> RepositoryResult<ClassTimetable> {
        self.with_conn(move |conn| {
            let row: Option<ClassTimetableRow> = class_timetables::table
                .filter(class_timetables::id.eq(id.value()))
                .filter(class_timetables::tenant_id.eq(tenant_id.value()))
                .filter(class_timetables::is_deleted.eq(false))
                .select(ClassTimetableRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_class).transpose()?.ok_or_else(|| {
                RepositoryError::not_found(format!("Class timetable {} not found", id))
            })
        })
        .await
    }

    async fn get_teacher_timetable(
        &self,
        tenant_id: TenantId,
        id: TeacherTimetableId,
    ) -> RepositoryResult<TeacherTimetable> {
        self.with_conn(move |conn| {
            let row: Option<TeacherTimetableRow> = teacher_timetables::table
                .filter(teacher_timetables::id.eq(id.value()))
                .filter(teacher_timetables::tenant_id.eq(tenant_id.value()))
                .filter(teacher_timetables::is_deleted.eq(false))
                .select(TeacherTimetableRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_teacher_binding).transpose()?.ok_or_else(|| {
                RepositoryError::not_found(format!("Teacher timetable {} not found", id))
            })
        })
        .await
    }

    async fn find_active_class_binding(
        &self,
        tenant_id: TenantId,
        class_id: ClassId,
        academic_year: &str,
    ) -> RepositoryResult<Option<ClassTimetable>> {
        let academic_year = academic_year.to_string();
        self.with_conn(move |conn| {
            let row: Option<ClassTimetableRow> = class_timetables::table
                .filter(class_timetables::tenant_id.eq(tenant_id.value()))
                .filter(class_timetables::class_id.eq(class_id.value()))
                .filter(class_timetables::academic_year.eq(academic_year.clone()))
                .filter(class_timetables::is_active.eq(true))
                .filter(class_timetables::is_deleted.eq(false))
                .select(ClassTimetableRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_class).transpose()
        })
        .await
    }

    async fn find_active_teacher_binding(
        &self,
        tenant_id: TenantId,
        teacher_id: TeacherId,
        academic_year: &str,
    ) -> RepositoryResult<Option<TeacherTimetable>> {
        let academic_year = academic_year.to_string();
        self.with_conn(move |conn| {
            let row: Option<TeacherTimetableRow> = teacher_timetables::table
                .filter(teacher_timetables::tenant_id.eq(tenant_id.value()))
                .filter(teacher_timetables::teacher_id.eq(teacher_id.value()))
                .filter(teacher_timetables::academic_year.eq(academic_year.clone()))
                .filter(teacher_timetables::is_active.eq(true))
                .filter(teacher_timetables::is_deleted.eq(false))
                .select(TeacherTimetableRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_teacher_binding).transpose()
        })
        .await
    }
}

// ==================== Schedule Entry Repository ====================

#[async_trait]
impl ScheduleEntryRepository for PostgresRepository {
    async fn place_entry(
        &self,
        entry: &ScheduleEntry,
        policy: PlacementPolicy,
    ) -> RepositoryResult<PlacementOutcome> {
        let entry = entry.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                lock_tenant_grid(tx, entry.tenant_id)?;

                let period_number = validate_entry_refs_sql(tx, &entry, "place_entry")?;

                let mut stored = entry.clone();
                let mut replaced_entry_id = None;
                if let Some(occupant) = cell_occupant_sql(tx, &entry)? {
                    match policy {
                        PlacementPolicy::Reject => {
                            return Err(RepositoryError::validation_with_context(
                                "An active schedule entry already occupies this class cell",
                                ErrorContext::new("place_entry")
                                    .with_entity("schedule_entry")
                                    .with_entity_id(ScheduleEntryId::new(occupant.id))
                                    .with_details(format!(
                                        "day={}, period={}",
                                        entry.day_of_week, entry.period_id
                                    )),
                            ));
                        }
                        PlacementPolicy::Replace => {
                            stored.id = ScheduleEntryId::new(occupant.id);
                            stored.created_at = occupant.created_at;
                            stored.updated_at = Utc::now();
                            replaced_entry_id = Some(stored.id);
                        }
                    }
                }

                let conflicts = detect_conflicts_sql(tx, &stored, period_number)?;

                // The conflict rows reference the new entry's id, so the
                // entry has to land first.
                let row = entry_to_row(&stored);
                if replaced_entry_id.is_some() {
                    diesel::update(
                        schedule_entries::table.filter(schedule_entries::id.eq(row.id)),
                    )
                    .set(&row)
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                } else {
                    diesel::insert_into(schedule_entries::table)
                        .values(&row)
                        .execute(tx)
                        .map_err(map_diesel_error)?;
                }
                insert_conflicts(tx, &conflicts)?;

                Ok(PlacementOutcome {
                    entry: stored,
                    conflicts,
                    replaced_entry_id,
                })
            })
        })
        .await
    }

    async fn update_entry_checked(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
        changes: &ScheduleEntryUpdate,
    ) -> RepositoryResult<PlacementOutcome> {
        let changes = changes.clone();
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                lock_tenant_grid(tx, tenant_id)?;

                let row: Option<ScheduleEntryRow> = schedule_entries::table
                    .filter(schedule_entries::id.eq(entry_id.value()))
                    .filter(schedule_entries::tenant_id.eq(tenant_id.value()))
                    .filter(schedule_entries::is_deleted.eq(false))
                    .select(ScheduleEntryRow::as_select())
                    .first(tx)
                    .optional()
                    .map_err(map_diesel_error)?;
                let mut updated = row.map(row_to_entry).transpose()?.ok_or_else(|| {
                    RepositoryError::not_found(format!("Schedule entry {} not found", entry_id))
                })?;

                changes.apply_to(&mut updated);

                let period_number = validate_entry_refs_sql(tx, &updated, "update_entry")?;

                let mut conflicts = Vec::new();
                if changes.affects_conflicts() && updated.is_current() {
                    if cell_occupant_sql(tx, &updated)?.is_some() {
                        return Err(RepositoryError::validation_with_context(
                            "An active schedule entry already occupies the target class cell",
                            ErrorContext::new("update_entry")
                                .with_entity("schedule_entry")
                                .with_entity_id(entry_id),
                        ));
                    }
                    conflicts = detect_conflicts_sql(tx, &updated, period_number)?;
                    insert_conflicts(tx, &conflicts)?;
                }

                let row = entry_to_row(&updated);
                diesel::update(schedule_entries::table.filter(schedule_entries::id.eq(row.id)))
                    .set(&row)
                    .execute(tx)
                    .map_err(map_diesel_error)?;

                Ok(PlacementOutcome {
                    entry: updated,
                    conflicts,
                    replaced_entry_id: None,
                })
            })
        })
        .await
    }

    async fn delete_entry(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
        hard: bool,
    ) -> RepositoryResult<ScheduleEntry> {
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let not_found =
                    || RepositoryError::not_found(format!("Schedule entry {} not found", entry_id));

                let row: ScheduleEntryRow = schedule_entries::table
                    .filter(schedule_entries::id.eq(entry_id.value()))
                    .filter(schedule_entries::tenant_id.eq(tenant_id.value()))
                    .select(ScheduleEntryRow::as_select())
                    .first(tx)
                    .optional()
                    .map_err(map_diesel_error)?
                    .ok_or_else(not_found)?;

                if hard {
                    diesel::delete(
                        schedule_entries::table.filter(schedule_entries::id.eq(entry_id.value())),
                    )
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                    return row_to_entry(row);
                }

                if row.is_deleted {
                    return Err(not_found());
                }

                let updated: ScheduleEntryRow = diesel::update(
                    schedule_entries::table.filter(schedule_entries::id.eq(entry_id.value())),
                )
                .set((
                    schedule_entries::is_deleted.eq(true),
                    schedule_entries::is_active.eq(false),
                    schedule_entries::updated_at.eq(Utc::now()),
                ))
                .returning(ScheduleEntryRow::as_returning())
                .get_result(tx)
                .map_err(map_diesel_error)?;

                row_to_entry(updated)
            })
        })
        .await
    }

    async fn get_entry(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
    ) -> RepositoryResult<ScheduleEntry> {
        self.with_conn(move |conn| {
            let row: Option<ScheduleEntryRow> = schedule_entries::table
                .filter(schedule_entries::id.eq(entry_id.value()))
                .filter(schedule_entries::tenant_id.eq(tenant_id.value()))
                .select(ScheduleEntryRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_entry).transpose()?.ok_or_else(|| {
                RepositoryError::not_found(format!("Schedule entry {} not found", entry_id))
            })
        })
        .await
    }

    async fn list_entries_for_class(
        &self,
        tenant_id: TenantId,
        class_timetable_id: ClassTimetableId,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        self.with_conn(move |conn| {
            let rows: Vec<ScheduleEntryRow> = schedule_entries::table
                .filter(schedule_entries::tenant_id.eq(tenant_id.value()))
                .filter(schedule_entries::class_timetable_id.eq(class_timetable_id.value()))
                .filter(schedule_entries::is_active.eq(true))
                .filter(schedule_entries::is_deleted.eq(false))
                .select(ScheduleEntryRow::as_select())
                .order((
                    schedule_entries::created_at.asc(),
                    schedule_entries::id.asc(),
                ))
                .load(conn)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }

    async fn list_entries_for_teacher(
        &self,
        tenant_id: TenantId,
        teacher_timetable_id: TeacherTimetableId,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        self.with_conn(move |conn| {
            let rows: Vec<ScheduleEntryRow> = schedule_entries::table
                .filter(schedule_entries::tenant_id.eq(tenant_id.value()))
                .filter(schedule_entries::teacher_timetable_id.eq(teacher_timetable_id.value()))
                .filter(schedule_entries::is_active.eq(true))
                .filter(schedule_entries::is_deleted.eq(false))
                .select(ScheduleEntryRow::as_select())
                .order((
                    schedule_entries::created_at.asc(),
                    schedule_entries::id.asc(),
                ))
                .load(conn)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }
}

// ==================== Conflict Repository ====================

#[async_trait]
impl ConflictRepository for PostgresRepository {
    async fn list_conflicts(
        &self,
        tenant_id: TenantId,
        filter: &ConflictFilter,
    ) -> RepositoryResult<Vec<TimetableConflict>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = timetable_conflicts::table
                .filter(timetable_conflicts::tenant_id.eq(tenant_id.value()))
                .filter(timetable_conflicts::is_deleted.eq(false))
                .select(TimetableConflictRow::as_select())
                .order(timetable_conflicts::created_at.desc())
                .into_boxed();

            if filter.unresolved_only {
                query = query.filter(timetable_conflicts::is_resolved.eq(false));
            }
            if let Some(severity) = filter.severity {
                query = query.filter(timetable_conflicts::severity.eq(severity.as_str()));
            }

            let rows = query
                .load::<TimetableConflictRow>(conn)
                .map_err(map_diesel_error)?;
            let mut conflicts = rows
                .into_iter()
                .map(row_to_conflict)
                .collect::<RepositoryResult<Vec<_>>>()?;

            // Severity is stored as text; rank it here. The stable sort keeps
            // the created_at ordering within each severity.
            conflicts.sort_by(|a, b| b.severity.cmp(&a.severity));
            Ok(conflicts)
        })
        .await
    }

    async fn get_conflict(
        &self,
        tenant_id: TenantId,
        id: ConflictId,
    ) -> RepositoryResult<TimetableConflict> {
        self.with_conn(move |conn| {
            let row: Option<TimetableConflictRow> = timetable_conflicts::table
                .filter(timetable_conflicts::id.eq(id.value()))
                .filter(timetable_conflicts::tenant_id.eq(tenant_id.value()))
                .filter(timetable_conflicts::is_deleted.eq(false))
                .select(TimetableConflictRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_conflict)
                .transpose()?
                .ok_or_else(|| RepositoryError::not_found(format!("Conflict {} not found", id)))
        })
        .await
    }

    async fn resolve_conflict(
        &self,
        tenant_id: TenantId,
        id: ConflictId,
        resolved_by: &str,
        resolution_notes: Option<&str>,
    ) -> RepositoryResult<TimetableConflict> {
        let resolved_by = resolved_by.to_string();
        let resolution_notes = resolution_notes.map(str::to_string);
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let row: TimetableConflictRow = timetable_conflicts::table
                    .filter(timetable_conflicts::id.eq(id.value()))
                    .filter(timetable_conflicts::tenant_id.eq(tenant_id.value()))
                    .filter(timetable_conflicts::is_deleted.eq(false))
                    .select(TimetableConflictRow::as_select())
                    .first(tx)
                    .optional()
                    .map_err(map_diesel_error)?
                    .ok_or_else(|| {
                        RepositoryError::not_found(format!("Conflict {} not found", id))
                    })?;

                if row.is_resolved {
                    return Err(RepositoryError::validation_with_context(
                        format!("Conflict {} is already resolved", id),
                        ErrorContext::new("resolve_conflict")
                            .with_entity("conflict")
                            .with_entity_id(id),
                    ));
                }

                let now = Utc::now();
                let updated: TimetableConflictRow = diesel::update(
                    timetable_conflicts::table.filter(timetable_conflicts::id.eq(id.value())),
                )
                .set((
                    timetable_conflicts::is_resolved.eq(true),
                    timetable_conflicts::resolved_by.eq(Some(resolved_by.clone())),
                    timetable_conflicts::resolution_notes.eq(resolution_notes.clone()),
                    timetable_conflicts::resolved_date.eq(Some(now)),
                    timetable_conflicts::updated_at.eq(now),
                ))
                .returning(TimetableConflictRow::as_returning())
                .get_result(tx)
                .map_err(map_diesel_error)?;

                row_to_conflict(updated)
            })
        })
        .await
    }
}

// ==================== Analytics Repository ====================

#[async_trait]
impl AnalyticsRepository for PostgresRepository {
    async fn binding_counts(
        &self,
        tenant_id: TenantId,
        master_timetable_id: MasterTimetableId,
    ) -> RepositoryResult<BindingCounts> {
        self.with_conn(move |conn| {
            let class_ids: Vec<Uuid> = class_timetables::table
                .filter(class_timetables::tenant_id.eq(tenant_id.value()))
                .filter(class_timetables::master_timetable_id.eq(master_timetable_id.value()))
                .filter(class_timetables::is_active.eq(true))
                .filter(class_timetables::is_deleted.eq(false))
                .select(class_timetables::id)
                .load(conn)
                .map_err(map_diesel_error)?;

            let teachers: i64 = teacher_timetables::table
                .filter(teacher_timetables::tenant_id.eq(tenant_id.value()))
                .filter(teacher_timetables::master_timetable_id.eq(master_timetable_id.value()))
                .filter(teacher_timetables::is_active.eq(true))
                .filter(teacher_timetables::is_deleted.eq(false))
                .count()
                .get_result(conn)
                .map_err(map_diesel_error)?;

            let entries: i64 = if class_ids.is_empty() {
                0
            } else {
                schedule_entries::table
                    .filter(schedule_entries::tenant_id.eq(tenant_id.value()))
                    .filter(schedule_entries::class_timetable_id.eq_any(class_ids.clone()))
                    .filter(schedule_entries::is_active.eq(true))
                    .filter(schedule_entries::is_deleted.eq(false))
                    .count()
                    .get_result(conn)
                    .map_err(map_diesel_error)?
            };

            Ok(BindingCounts {
                classes: class_ids.len(),
                teachers: teachers as usize,
                schedule_entries: entries as usize,
            })
        })
        .await
    }

    async fn fetch_tenant_snapshot(
        &self,
        tenant_id: TenantId,
        academic_year: &str,
    ) -> RepositoryResult<TenantYearSnapshot> {
        let academic_year = academic_year.to_string();
        self.with_conn(move |conn| {
            let master_rows: Vec<MasterTimetableRow> = master_timetables::table
                .filter(master_timetables::tenant_id.eq(tenant_id.value()))
                .filter(master_timetables::academic_year.eq(academic_year.clone()))
                .filter(master_timetables::is_deleted.eq(false))
                .select(MasterTimetableRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;

            let class_rows: Vec<ClassTimetableRow> = class_timetables::table
                .filter(class_timetables::tenant_id.eq(tenant_id.value()))
                .filter(class_timetables::academic_year.eq(academic_year.clone()))
                .filter(class_timetables::is_active.eq(true))
                .filter(class_timetables::is_deleted.eq(false))
                .select(ClassTimetableRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;

            let teacher_rows: Vec<TeacherTimetableRow> = teacher_timetables::table
                .filter(teacher_timetables::tenant_id.eq(tenant_id.value()))
                .filter(teacher_timetables::academic_year.eq(academic_year.clone()))
                .filter(teacher_timetables::is_active.eq(true))
                .filter(teacher_timetables::is_deleted.eq(false))
                .select(TeacherTimetableRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;

            let class_ids: Vec<Uuid> = class_rows.iter().map(|c| c.id).collect();
            let entry_rows: Vec<ScheduleEntryRow> = if class_ids.is_empty() {
                Vec::new()
            } else {
                schedule_entries::table
                    .filter(schedule_entries::tenant_id.eq(tenant_id.value()))
                    .filter(schedule_entries::class_timetable_id.eq_any(class_ids))
                    .filter(schedule_entries::is_active.eq(true))
                    .filter(schedule_entries::is_deleted.eq(false))
                    .select(ScheduleEntryRow::as_select())
                    .load(conn)
                    .map_err(map_diesel_error)?
            };

            let conflict_rows: Vec<TimetableConflictRow> = timetable_conflicts::table
                .filter(timetable_conflicts::tenant_id.eq(tenant_id.value()))
                .filter(timetable_conflicts::is_deleted.eq(false))
                .select(TimetableConflictRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(TenantYearSnapshot {
                master_timetables: master_rows
                    .into_iter()
                    .map(row_to_master)
                    .collect::<RepositoryResult<_>>()?,
                class_timetables: class_rows
                    .into_iter()
                    .map(row_to_class)
                    .collect::<RepositoryResult<_>>()?,
                teacher_timetables: teacher_rows
                    .into_iter()
                    .map(row_to_teacher_binding)
                    .collect::<RepositoryResult<_>>()?,
                entries: entry_rows
                    .into_iter()
                    .map(row_to_entry)
                    .collect::<RepositoryResult<_>>()?,
                conflicts: conflict_rows
                    .into_iter()
                    .map(row_to_conflict)
                    .collect::<RepositoryResult<_>>()?,
            })
        })
        .await
    }
}
