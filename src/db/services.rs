//! Service layer: the engine's operations as free async functions over
//! any repository backend.
//!
//! Functions here own input validation, entity construction, and the
//! orchestration of repository calls; the repository owns atomicity and
//! the pure `crate::services` modules own the math. Everything is generic
//! over the repository so callers can pass a concrete backend in tests or
//! the `dyn FullRepository` singleton in production.

use std::collections::HashMap;

use chrono::Utc;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::api::{
    BulkEntryRow, BulkResult, BulkRowError, BulkStatus, BulkUpdateRow, ClassId, ClassTimetableId,
    ConflictFilter, ConflictId, CreateClassTimetableSpec, CreateMasterTimetableSpec,
    CreateTeacherTimetableSpec, MasterTimetableFilter, MasterTimetableId, MasterTimetableSummary,
    PeriodId, PlacementOutcome, PlacementPolicy, RoomUtilization, ScheduleEntryId,
    ScheduleEntrySpec, ScheduleEntryUpdate, ScheduleSlot, TeacherId, TeacherTimetableId,
    TeacherWorkload, TenantId, TimetableAnalytics, WeeklySchedule,
};
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    ClassTimetable, DayOfWeek, MasterTimetable, ScheduleEntry, TeacherTimetable, TimetableConflict,
    TimetablePeriod, TimetableStatus,
};
use crate::services::{analytics, grid, weekly};

/// Provenance tag written to every entry a bulk import creates.
const BULK_IMPORT_SOURCE: &str = "bulk_import";

// ==================== Health ====================

/// Check that the backing store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Master timetables ====================

/// Create a master timetable, generating its period grid unless the spec
/// skips generation.
///
/// The school-day parameters are validated either way: a grid that cannot
/// fit the school day fails with `ConfigurationError` before anything is
/// persisted, so a bad configuration never survives. The timetable and
/// its periods are stored as one unit of work.
pub async fn create_master_timetable<R: FullRepository + ?Sized>(
    repo: &R,
    spec: &CreateMasterTimetableSpec,
) -> RepositoryResult<MasterTimetable> {
    if spec.timetable_name.trim().is_empty() {
        return Err(RepositoryError::validation(
            "timetable_name must not be empty",
        ));
    }
    if spec.academic_year.trim().is_empty() {
        return Err(RepositoryError::validation(
            "academic_year must not be empty",
        ));
    }
    if spec.working_days.is_empty() {
        return Err(RepositoryError::validation(
            "working_days must not be empty",
        ));
    }

    let config = grid::GridConfig {
        school_start_time: spec.school_start_time,
        school_end_time: spec.school_end_time,
        total_periods_per_day: spec.total_periods_per_day,
        period_duration: spec.period_duration,
        break_duration: spec.break_duration,
        lunch_duration: spec.lunch_duration,
    };
    // Generated even when the rows are discarded: the fit check must run
    // at creation time regardless.
    let generated = grid::generate_periods(&config)?;

    let now = Utc::now();
    let timetable = MasterTimetable {
        id: MasterTimetableId::generate(),
        tenant_id: spec.tenant_id,
        timetable_name: spec.timetable_name.clone(),
        description: spec.description.clone(),
        academic_year: spec.academic_year.clone(),
        term: spec.term.clone(),
        effective_from: spec.effective_from,
        effective_until: spec.effective_until,
        total_periods_per_day: spec.total_periods_per_day,
        school_start_time: spec.school_start_time,
        school_end_time: spec.school_end_time,
        period_duration: spec.period_duration,
        break_duration: spec.break_duration,
        lunch_duration: spec.lunch_duration,
        working_days: spec.working_days.clone(),
        status: spec.status,
        is_default: spec.is_default,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    };

    let periods: Vec<TimetablePeriod> = if spec.auto_generate_periods {
        generated
            .into_iter()
            .map(|p| TimetablePeriod {
                id: PeriodId::generate(),
                tenant_id: spec.tenant_id,
                master_timetable_id: timetable.id,
                period_number: p.period_number,
                period_name: p.period_name,
                period_type: p.period_type,
                start_time: p.start_time,
                end_time: p.end_time,
                duration_minutes: p.duration_minutes,
                is_teaching_period: p.is_teaching_period,
                is_deleted: false,
                created_at: now,
                updated_at: now,
            })
            .collect()
    } else {
        Vec::new()
    };

    let stored = repo.store_master_timetable(&timetable, &periods).await?;
    info!(
        "Created master timetable {} ({} periods) for tenant {}",
        stored.id,
        periods.len(),
        stored.tenant_id
    );
    Ok(stored)
}

/// Fetch one master timetable by id.
pub async fn get_master_timetable<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: MasterTimetableId,
) -> RepositoryResult<MasterTimetable> {
    repo.get_master_timetable(tenant_id, id).await
}

/// Fetch the period grid of a master timetable, ordered by period number.
/// Unknown master timetable ids are `NotFound` rather than an empty grid.
pub async fn get_period_grid<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    master_timetable_id: MasterTimetableId,
) -> RepositoryResult<Vec<TimetablePeriod>> {
    repo.get_master_timetable(tenant_id, master_timetable_id)
        .await?;
    repo.get_periods(tenant_id, master_timetable_id).await
}

/// List a tenant's master timetables with usage counts aggregated at read
/// time.
pub async fn list_master_timetables<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    filter: &MasterTimetableFilter,
) -> RepositoryResult<Vec<MasterTimetableSummary>> {
    let timetables = repo.list_master_timetables(tenant_id, filter).await?;

    let mut summaries = Vec::with_capacity(timetables.len());
    for timetable in timetables {
        let counts = repo.binding_counts(tenant_id, timetable.id).await?;
        summaries.push(MasterTimetableSummary {
            timetable,
            total_classes: counts.classes,
            total_teachers: counts.teachers,
            total_schedule_entries: counts.schedule_entries,
        });
    }
    Ok(summaries)
}

// ==================== Class/teacher bindings ====================

/// Fetch a master timetable a binding wants to reference, converting
/// `NotFound` into the referential-integrity failure the assigners report.
async fn require_master<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: MasterTimetableId,
) -> RepositoryResult<MasterTimetable> {
    repo.get_master_timetable(tenant_id, id)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound { .. } => RepositoryError::referential_integrity(format!(
                "Master timetable {} not found",
                id
            )),
            other => other,
        })
}

/// Bind a class to a master timetable for an academic year/term.
///
/// # Returns
/// * `Err(RepositoryError::ReferentialIntegrityError)` - Unknown master
///   timetable
/// * `Err(RepositoryError::DuplicateBindingError)` - The class already has
///   an active binding for that year/term
pub async fn create_class_timetable<R: FullRepository + ?Sized>(
    repo: &R,
    spec: &CreateClassTimetableSpec,
) -> RepositoryResult<ClassTimetable> {
    if spec.academic_year.trim().is_empty() {
        return Err(RepositoryError::validation(
            "academic_year must not be empty",
        ));
    }
    require_master(repo, spec.tenant_id, spec.master_timetable_id).await?;

    let now = Utc::now();
    let binding = ClassTimetable {
        id: ClassTimetableId::generate(),
        tenant_id: spec.tenant_id,
        class_id: spec.class_id,
        master_timetable_id: spec.master_timetable_id,
        academic_year: spec.academic_year.clone(),
        term: spec.term.clone(),
        class_name: spec.class_name.clone(),
        grade_level: spec.grade_level.clone(),
        is_active: true,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    };

    let stored = repo.store_class_timetable(&binding).await?;
    info!(
        "Bound class {} to master timetable {} for {}",
        stored.class_id, stored.master_timetable_id, stored.academic_year
    );
    Ok(stored)
}

/// Bind a teacher to a master timetable for an academic year/term,
/// recording load limits and preferences.
pub async fn create_teacher_timetable<R: FullRepository + ?Sized>(
    repo: &R,
    spec: &CreateTeacherTimetableSpec,
) -> RepositoryResult<TeacherTimetable> {
    if spec.academic_year.trim().is_empty() {
        return Err(RepositoryError::validation(
            "academic_year must not be empty",
        ));
    }
    if spec.max_periods_per_day < 0 {
        return Err(RepositoryError::validation(
            "max_periods_per_day must not be negative",
        ));
    }
    if spec.total_periods_per_week < 0 {
        return Err(RepositoryError::validation(
            "total_periods_per_week must not be negative",
        ));
    }
    require_master(repo, spec.tenant_id, spec.master_timetable_id).await?;

    let now = Utc::now();
    let binding = TeacherTimetable {
        id: TeacherTimetableId::generate(),
        tenant_id: spec.tenant_id,
        teacher_id: spec.teacher_id,
        master_timetable_id: spec.master_timetable_id,
        academic_year: spec.academic_year.clone(),
        term: spec.term.clone(),
        teacher_name: spec.teacher_name.clone(),
        max_periods_per_day: spec.max_periods_per_day,
        total_periods_per_week: spec.total_periods_per_week,
        preferred_periods: spec.preferred_periods.clone(),
        preferred_days: spec.preferred_days.clone(),
        is_active: true,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    };

    let stored = repo.store_teacher_timetable(&binding).await?;
    info!(
        "Bound teacher {} to master timetable {} for {}",
        stored.teacher_id, stored.master_timetable_id, stored.academic_year
    );
    Ok(stored)
}

/// Fetch one class binding by id.
pub async fn get_class_timetable<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ClassTimetableId,
) -> RepositoryResult<ClassTimetable> {
    repo.get_class_timetable(tenant_id, id).await
}

/// Fetch one teacher binding by id.
pub async fn get_teacher_timetable<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: TeacherTimetableId,
) -> RepositoryResult<TeacherTimetable> {
    repo.get_teacher_timetable(tenant_id, id).await
}

// ==================== Placement ====================

fn entry_from_spec(
    spec: &ScheduleEntrySpec,
    batch_id: Option<Uuid>,
    import_source: Option<&str>,
) -> RepositoryResult<ScheduleEntry> {
    if spec.subject_name.trim().is_empty() {
        return Err(RepositoryError::validation("subject_name must not be empty"));
    }

    let now = Utc::now();
    Ok(ScheduleEntry {
        id: ScheduleEntryId::generate(),
        tenant_id: spec.tenant_id,
        class_timetable_id: spec.class_timetable_id,
        teacher_timetable_id: spec.teacher_timetable_id,
        period_id: spec.period_id,
        day_of_week: spec.day_of_week,
        subject_name: spec.subject_name.clone(),
        subject_code: spec.subject_code.clone(),
        teacher_name: spec.teacher_name.clone(),
        room_number: spec.room_number.clone(),
        building: spec.building.clone(),
        notes: spec.notes.clone(),
        is_substitution: spec.is_substitution,
        is_recurring: spec.is_recurring,
        effective_date: spec.effective_date,
        expiry_date: spec.expiry_date,
        batch_id,
        import_source: import_source.map(str::to_string),
        is_active: true,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

/// Place one schedule entry into its timetable cell.
///
/// Teacher and room double-bookings are detected and recorded but never
/// block the placement; the outcome carries the new conflict records. An
/// occupied class cell does fail (`ValidationError`) - a class cannot be
/// in two places at once, and single placements never overwrite.
pub async fn place_schedule_entry<R: FullRepository + ?Sized>(
    repo: &R,
    spec: &ScheduleEntrySpec,
) -> RepositoryResult<PlacementOutcome> {
    let entry = entry_from_spec(spec, None, None)?;
    let outcome = repo.place_entry(&entry, PlacementPolicy::Reject).await?;

    if outcome.conflicts.is_empty() {
        debug!(
            "Placed schedule entry {} ({} {} {})",
            outcome.entry.id, outcome.entry.subject_name, outcome.entry.day_of_week,
            outcome.entry.period_id
        );
    } else {
        warn!(
            "Placed schedule entry {} with {} conflict(s)",
            outcome.entry.id,
            outcome.conflicts.len()
        );
    }
    Ok(outcome)
}

/// Apply field changes to an entry, re-running conflict detection when the
/// changes move it to another cell or teacher.
pub async fn update_schedule_entry<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    entry_id: ScheduleEntryId,
    changes: &ScheduleEntryUpdate,
) -> RepositoryResult<PlacementOutcome> {
    let outcome = repo.update_entry_checked(tenant_id, entry_id, changes).await?;
    if !outcome.conflicts.is_empty() {
        warn!(
            "Updated schedule entry {} with {} new conflict(s)",
            entry_id,
            outcome.conflicts.len()
        );
    }
    Ok(outcome)
}

/// Delete an entry, softly by default. Conflict records referencing the
/// entry stay open either way; resolution is always explicit.
pub async fn delete_schedule_entry<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    entry_id: ScheduleEntryId,
    hard: bool,
) -> RepositoryResult<ScheduleEntry> {
    let deleted = repo.delete_entry(tenant_id, entry_id, hard).await?;
    debug!("Deleted schedule entry {} (hard={})", entry_id, hard);
    Ok(deleted)
}

// ==================== Bulk operations ====================

fn missing_field(row: usize, field: &str) -> String {
    format!("Row {}: Missing required field '{}'", row, field)
}

fn bulk_result(
    total: usize,
    successful: usize,
    errors: Vec<BulkRowError>,
    batch_id: Option<Uuid>,
    conflicts_detected: usize,
) -> BulkResult {
    let failed = errors.len();
    let status = if failed == 0 {
        BulkStatus::Completed
    } else {
        BulkStatus::CompletedWithErrors
    };
    BulkResult {
        status,
        total,
        successful,
        failed,
        errors,
        batch_id,
        conflicts_detected,
    }
}

/// Build the entry for one bulk-create row, or the operator-facing message
/// naming the first missing required field.
fn entry_from_bulk_row(
    tenant_id: TenantId,
    row: &BulkEntryRow,
    row_number: usize,
    batch_id: Uuid,
) -> Result<ScheduleEntry, String> {
    let class_timetable_id = row
        .class_timetable_id
        .ok_or_else(|| missing_field(row_number, "class_timetable_id"))?;
    let period_id = row
        .period_id
        .ok_or_else(|| missing_field(row_number, "period_id"))?;
    let day_of_week = row
        .day_of_week
        .ok_or_else(|| missing_field(row_number, "day_of_week"))?;
    let subject_name = row
        .subject_name
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| missing_field(row_number, "subject_name"))?;

    let now = Utc::now();
    Ok(ScheduleEntry {
        id: ScheduleEntryId::generate(),
        tenant_id,
        class_timetable_id,
        teacher_timetable_id: row.teacher_timetable_id,
        period_id,
        day_of_week,
        subject_name,
        subject_code: row.subject_code.clone(),
        teacher_name: row.teacher_name.clone(),
        room_number: row.room_number.clone(),
        building: row.building.clone(),
        notes: row.notes.clone(),
        is_substitution: row.is_substitution,
        is_recurring: row.is_recurring,
        effective_date: row.effective_date,
        expiry_date: row.expiry_date,
        batch_id: Some(batch_id),
        import_source: Some(BULK_IMPORT_SOURCE.to_string()),
        is_active: true,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

/// Create many schedule entries with per-row isolation.
///
/// Rows are processed sequentially in input order; a bad row is recorded
/// in `errors` (1-based index) without aborting the rest, and every
/// successful row is committed on its own. All created entries share one
/// `batch_id` and carry `import_source = "bulk_import"`. Rows targeting an
/// occupied class cell replace the occupant in place (upsert) and count as
/// successful.
pub async fn bulk_create_schedule_entries<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    rows: &[BulkEntryRow],
) -> RepositoryResult<BulkResult> {
    let batch_id = Uuid::new_v4();
    let mut successful = 0usize;
    let mut conflicts_detected = 0usize;
    let mut errors: Vec<BulkRowError> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let reference = row.class_timetable_id.map(|id| id.to_string());

        let entry = match entry_from_bulk_row(tenant_id, row, row_number, batch_id) {
            Ok(entry) => entry,
            Err(message) => {
                errors.push(BulkRowError {
                    row: row_number,
                    reference,
                    message,
                });
                continue;
            }
        };

        match repo.place_entry(&entry, PlacementPolicy::Replace).await {
            Ok(outcome) => {
                successful += 1;
                conflicts_detected += outcome.conflicts.len();
            }
            Err(err) => errors.push(BulkRowError {
                row: row_number,
                reference,
                message: err.message().to_string(),
            }),
        }
    }

    info!(
        "Bulk create batch {}: {}/{} rows succeeded, {} conflict(s) detected",
        batch_id,
        successful,
        rows.len(),
        conflicts_detected
    );
    Ok(bulk_result(
        rows.len(),
        successful,
        errors,
        Some(batch_id),
        conflicts_detected,
    ))
}

/// Update many schedule entries with per-row isolation. A row without a
/// `schedule_entry_id`, or one naming an unknown entry, is a row error.
pub async fn bulk_update_schedule_entries<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    rows: &[BulkUpdateRow],
) -> RepositoryResult<BulkResult> {
    let mut successful = 0usize;
    let mut conflicts_detected = 0usize;
    let mut errors: Vec<BulkRowError> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let entry_id = match row.schedule_entry_id {
            Some(id) => id,
            None => {
                errors.push(BulkRowError {
                    row: row_number,
                    reference: None,
                    message: missing_field(row_number, "schedule_entry_id"),
                });
                continue;
            }
        };

        match repo.update_entry_checked(tenant_id, entry_id, &row.changes).await {
            Ok(outcome) => {
                successful += 1;
                conflicts_detected += outcome.conflicts.len();
            }
            Err(err) => errors.push(BulkRowError {
                row: row_number,
                reference: Some(entry_id.to_string()),
                message: err.message().to_string(),
            }),
        }
    }

    info!(
        "Bulk update: {}/{} rows succeeded, {} conflict(s) detected",
        successful,
        rows.len(),
        conflicts_detected
    );
    Ok(bulk_result(
        rows.len(),
        successful,
        errors,
        None,
        conflicts_detected,
    ))
}

/// Delete many schedule entries with per-row isolation. Soft by default;
/// `hard_delete` removes rows irreversibly.
pub async fn bulk_delete_schedule_entries<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    entry_ids: &[ScheduleEntryId],
    hard_delete: bool,
) -> RepositoryResult<BulkResult> {
    let mut successful = 0usize;
    let mut errors: Vec<BulkRowError> = Vec::new();

    for (index, entry_id) in entry_ids.iter().enumerate() {
        match repo.delete_entry(tenant_id, *entry_id, hard_delete).await {
            Ok(_) => successful += 1,
            Err(err) => errors.push(BulkRowError {
                row: index + 1,
                reference: Some(entry_id.to_string()),
                message: err.message().to_string(),
            }),
        }
    }

    info!(
        "Bulk delete (hard={}): {}/{} rows succeeded",
        hard_delete,
        successful,
        entry_ids.len()
    );
    Ok(bulk_result(entry_ids.len(), successful, errors, None, 0))
}

// ==================== Weekly and daily views ====================

/// A class's weekly schedule for an academic year, built through its
/// active binding.
///
/// # Returns
/// * `Err(RepositoryError::NotFound)` - No active class binding for the
///   (class, academic_year)
pub async fn get_class_weekly_schedule<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    class_id: ClassId,
    academic_year: &str,
) -> RepositoryResult<WeeklySchedule> {
    let binding = repo
        .find_active_class_binding(tenant_id, class_id, academic_year)
        .await?
        .ok_or_else(|| {
            RepositoryError::not_found(format!(
                "No active class timetable for class {} in {}",
                class_id, academic_year
            ))
        })?;

    let periods = repo.get_periods(tenant_id, binding.master_timetable_id).await?;
    let entries = repo.list_entries_for_class(tenant_id, binding.id).await?;
    Ok(weekly::project_class_week(academic_year, &periods, &entries))
}

/// A teacher's weekly schedule for an academic year; slots carry the class
/// label of each entry's class binding.
pub async fn get_teacher_weekly_schedule<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    teacher_id: TeacherId,
    academic_year: &str,
) -> RepositoryResult<WeeklySchedule> {
    let binding = repo
        .find_active_teacher_binding(tenant_id, teacher_id, academic_year)
        .await?
        .ok_or_else(|| {
            RepositoryError::not_found(format!(
                "No active teacher timetable for teacher {} in {}",
                teacher_id, academic_year
            ))
        })?;

    let periods = repo.get_periods(tenant_id, binding.master_timetable_id).await?;
    let entries = repo.list_entries_for_teacher(tenant_id, binding.id).await?;

    let mut class_labels: HashMap<ClassTimetableId, String> = HashMap::new();
    for entry in &entries {
        if class_labels.contains_key(&entry.class_timetable_id) {
            continue;
        }
        let label = match repo.get_class_timetable(tenant_id, entry.class_timetable_id).await {
            Ok(class) => class
                .class_name
                .unwrap_or_else(|| class.class_id.to_string()),
            // A binding deleted after placement still needs a label.
            Err(RepositoryError::NotFound { .. }) => entry.class_timetable_id.to_string(),
            Err(other) => return Err(other),
        };
        class_labels.insert(entry.class_timetable_id, label);
    }

    Ok(weekly::project_teacher_week(
        academic_year,
        &periods,
        &entries,
        &class_labels,
    ))
}

/// One day of a class timetable, ordered by period number.
pub async fn get_class_daily_schedule<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    class_timetable_id: ClassTimetableId,
    day: DayOfWeek,
) -> RepositoryResult<Vec<ScheduleSlot>> {
    let binding = repo.get_class_timetable(tenant_id, class_timetable_id).await?;
    let periods = repo.get_periods(tenant_id, binding.master_timetable_id).await?;
    let entries = repo.list_entries_for_class(tenant_id, binding.id).await?;
    Ok(weekly::project_class_day(&periods, &entries, day))
}

// ==================== Conflicts ====================

/// List a tenant's conflicts, severity descending then newest first.
/// Defaults to unresolved records only.
pub async fn get_conflicts<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    filter: &ConflictFilter,
) -> RepositoryResult<Vec<TimetableConflict>> {
    repo.list_conflicts(tenant_id, filter).await
}

/// Mark a conflict resolved. Resolving an already-resolved conflict is a
/// `ValidationError`.
pub async fn resolve_conflict<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    conflict_id: ConflictId,
    resolved_by: &str,
    resolution_notes: Option<&str>,
) -> RepositoryResult<TimetableConflict> {
    if resolved_by.trim().is_empty() {
        return Err(RepositoryError::validation("resolved_by must not be empty"));
    }

    let resolved = repo
        .resolve_conflict(tenant_id, conflict_id, resolved_by, resolution_notes)
        .await?;
    info!("Conflict {} resolved by {}", conflict_id, resolved_by);
    Ok(resolved)
}

// ==================== Analytics ====================

/// Tenant-wide scheduling statistics for one academic year.
pub async fn get_timetable_analytics<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    academic_year: &str,
) -> RepositoryResult<TimetableAnalytics> {
    let snapshot = repo.fetch_tenant_snapshot(tenant_id, academic_year).await?;
    Ok(analytics::compute_analytics(&snapshot))
}

/// The master timetable whose grid defines slot capacity for a year: an
/// active one when present, else the default, else any.
fn governing_master(timetables: &[MasterTimetable]) -> Option<&MasterTimetable> {
    timetables
        .iter()
        .find(|t| t.status == TimetableStatus::Active)
        .or_else(|| timetables.iter().find(|t| t.is_default))
        .or_else(|| timetables.first())
}

/// Occupancy of one room for a year against the governing grid's
/// `working_days x teaching periods` capacity.
pub async fn get_room_utilization<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    room_number: &str,
    academic_year: &str,
) -> RepositoryResult<RoomUtilization> {
    let snapshot = repo.fetch_tenant_snapshot(tenant_id, academic_year).await?;

    let (working_days, teaching_periods) = match governing_master(&snapshot.master_timetables) {
        Some(master) => (
            master.working_days.len(),
            master.total_periods_per_day.max(0) as usize,
        ),
        None => (0, 0),
    };

    Ok(analytics::compute_room_utilization(
        room_number,
        academic_year,
        &snapshot.entries,
        working_days,
        teaching_periods,
    ))
}

/// A teacher's assigned load for a year against the limits configured on
/// their active binding.
pub async fn get_teacher_workload<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    teacher_id: TeacherId,
    academic_year: &str,
) -> RepositoryResult<TeacherWorkload> {
    let binding = repo
        .find_active_teacher_binding(tenant_id, teacher_id, academic_year)
        .await?
        .ok_or_else(|| {
            RepositoryError::not_found(format!(
                "No active teacher timetable for teacher {} in {}",
                teacher_id, academic_year
            ))
        })?;

    let entries = repo.list_entries_for_teacher(tenant_id, binding.id).await?;
    Ok(analytics::compute_teacher_workload(&binding, &entries))
}
