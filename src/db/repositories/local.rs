//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and single-process deployments. All data is
//! stored in memory using HashMaps, providing fast, deterministic, and
//! isolated execution.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::api::*;
use crate::db::repository::*;
use crate::models::*;
use crate::services::conflicts as conflict_records;

/// In-memory local repository.
///
/// Placement atomicity comes from the single state lock: `place_entry`
/// holds the write guard across referential checks, conflict detection,
/// and the insert, so two concurrent placements into the same cell can
/// never both miss the other.
#[derive(Clone, Debug)]
pub struct LocalRepository {
    state: Arc<RwLock<LocalState>>,
}

#[derive(Debug)]
struct LocalState {
    master_timetables: HashMap<MasterTimetableId, MasterTimetable>,
    periods: HashMap<PeriodId, TimetablePeriod>,
    class_timetables: HashMap<ClassTimetableId, ClassTimetable>,
    teacher_timetables: HashMap<TeacherTimetableId, TeacherTimetable>,
    entries: HashMap<ScheduleEntryId, ScheduleEntry>,
    conflicts: HashMap<ConflictId, TimetableConflict>,

    // Connection health, togglable from tests.
    is_healthy: bool,
}

impl Default for LocalState {
    fn default() -> Self {
        Self {
            master_timetables: HashMap::new(),
            periods: HashMap::new(),
            class_timetables: HashMap::new(),
            teacher_timetables: HashMap::new(),
            entries: HashMap::new(),
            conflicts: HashMap::new(),
            is_healthy: true,
        }
    }
}

fn ensure_healthy(state: &LocalState) -> RepositoryResult<()> {
    if !state.is_healthy {
        return Err(RepositoryError::connection("Database is not healthy"));
    }
    Ok(())
}

/// Label for a class in conflict context data: the binding's class name
/// when set, else the class id.
fn class_label(state: &LocalState, class_timetable_id: ClassTimetableId) -> String {
    match state.class_timetables.get(&class_timetable_id) {
        Some(binding) => binding
            .class_name
            .clone()
            .unwrap_or_else(|| binding.class_id.to_string()),
        None => class_timetable_id.to_string(),
    }
}

/// Check that everything `entry` references exists, is active, and
/// belongs to `entry.tenant_id`. Returns the period number of the
/// referenced period for use in conflict records.
fn validate_entry_refs(
    state: &LocalState,
    entry: &ScheduleEntry,
    operation: &str,
) -> RepositoryResult<f64> {
    let class_binding = state
        .class_timetables
        .get(&entry.class_timetable_id)
        .filter(|c| c.tenant_id == entry.tenant_id && c.is_current())
        .ok_or_else(|| {
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

    let period = state
        .periods
        .get(&entry.period_id)
        .filter(|p| p.tenant_id == entry.tenant_id && !p.is_deleted)
        .ok_or_else(|| {
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
        state
            .teacher_timetables
            .get(&teacher_timetable_id)
            .filter(|t| t.tenant_id == entry.tenant_id && t.is_current())
            .ok_or_else(|| {
                RepositoryError::referential_integrity_with_context(
                    format!(
                        "Teacher timetable {} not found or inactive",
                        teacher_timetable_id
                    ),
                    ErrorContext::new(operation)
                        .with_entity("teacher_timetable")
                        .with_entity_id(teacher_timetable_id),
                )
            })?;
    }

    Ok(period.period_number)
}

/// The active occupant of `entry`'s class cell, other than `entry` itself.
fn cell_occupant(state: &LocalState, entry: &ScheduleEntry) -> Option<ScheduleEntryId> {
    state
        .entries
        .values()
        .find(|e| {
            e.id != entry.id
                && e.tenant_id == entry.tenant_id
                && e.is_current()
                && e.class_timetable_id == entry.class_timetable_id
                && e.day_of_week == entry.day_of_week
                && e.period_id == entry.period_id
        })
        .map(|e| e.id)
}

/// Run the teacher and room conflict checks for `stored` against every
/// other active entry, one record per colliding pair. Does not mutate
/// state; the caller inserts the returned records under its own guard.
fn detect_conflicts(
    state: &LocalState,
    stored: &ScheduleEntry,
    period_number: f64,
) -> Vec<TimetableConflict> {
    let mut conflicts = Vec::new();

    if let Some(teacher_timetable_id) = stored.teacher_timetable_id {
        if let Some(teacher) = state.teacher_timetables.get(&teacher_timetable_id) {
            for existing in state.entries.values() {
                if existing.id != stored.id
                    && existing.tenant_id == stored.tenant_id
                    && existing.is_current()
                    && existing.teacher_timetable_id == Some(teacher_timetable_id)
                    && existing.day_of_week == stored.day_of_week
                    && existing.period_id == stored.period_id
                {
                    let labels = (
                        class_label(state, existing.class_timetable_id),
                        class_label(state, stored.class_timetable_id),
                    );
                    conflicts.push(conflict_records::teacher_double_booking(
                        existing,
                        stored,
                        teacher,
                        period_number,
                        labels,
                    ));
                }
            }
        }
    }

    if let Some(room) = stored.occupied_room() {
        for existing in state.entries.values() {
            if existing.id != stored.id
                && existing.tenant_id == stored.tenant_id
                && existing.is_current()
                && existing.day_of_week == stored.day_of_week
                && existing.period_id == stored.period_id
                && existing.occupied_room() == Some(room)
            {
                conflicts.push(conflict_records::room_conflict(
                    existing,
                    stored,
                    room,
                    period_number,
                ));
            }
        }
    }

    conflicts
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LocalState::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.state.write().is_healthy = healthy;
    }

    /// Clear all data from the repository, keeping the health status.
    pub fn clear(&self) {
        let mut state = self.state.write();
        *state = LocalState {
            is_healthy: state.is_healthy,
            ..Default::default()
        };
    }

    /// Number of entries stored, including inactive and soft-deleted ones.
    pub fn entry_count(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Number of conflict records stored.
    pub fn conflict_count(&self) -> usize {
        self.state.read().conflicts.len()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Timetable Repository ====================

#[async_trait]
impl TimetableRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.state.read().is_healthy)
    }

    async fn store_master_timetable(
        &self,
        timetable: &MasterTimetable,
        periods: &[TimetablePeriod],
    ) -> RepositoryResult<MasterTimetable> {
        let mut state = self.state.write();
        ensure_healthy(&state)?;

        state
            .master_timetables
            .insert(timetable.id, timetable.clone());
        for period in periods {
            state.periods.insert(period.id, period.clone());
        }

        Ok(timetable.clone())
    }

    async fn get_master_timetable(
        &self,
        tenant_id: TenantId,
        id: MasterTimetableId,
    ) -> RepositoryResult<MasterTimetable> {
        let state = self.state.read();
        state
            .master_timetables
            .get(&id)
            .filter(|t| t.tenant_id == tenant_id && !t.is_deleted)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Master timetable {} not found", id)))
    }

    async fn list_master_timetables(
        &self,
        tenant_id: TenantId,
        filter: &MasterTimetableFilter,
    ) -> RepositoryResult<Vec<MasterTimetable>> {
        let state = self.state.read();
        let mut timetables: Vec<MasterTimetable> = state
            .master_timetables
            .values()
            .filter(|t| t.tenant_id == tenant_id && !t.is_deleted)
            .filter(|t| {
                filter
                    .academic_year
                    .as_ref()
                    .map_or(true, |year| &t.academic_year == year)
            })
            .filter(|t| filter.status.map_or(true, |status| t.status == status))
            .cloned()
            .collect();

        timetables.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(timetables)
    }

    async fn get_periods(
        &self,
        tenant_id: TenantId,
        master_timetable_id: MasterTimetableId,
    ) -> RepositoryResult<Vec<TimetablePeriod>> {
        let state = self.state.read();
        let mut periods: Vec<TimetablePeriod> = state
            .periods
            .values()
            .filter(|p| {
                p.tenant_id == tenant_id
                    && p.master_timetable_id == master_timetable_id
                    && !p.is_deleted
            })
            .cloned()
            .collect();

        periods.sort_by(|a, b| a.period_number.total_cmp(&b.period_number));
        Ok(periods)
    }

    async fn get_period(
        &self,
        tenant_id: TenantId,
        period_id: PeriodId,
    ) -> RepositoryResult<TimetablePeriod> {
        let state = self.state.read();
        state
            .periods
            .get(&period_id)
            .filter(|p| p.tenant_id == tenant_id && !p.is_deleted)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Period {} not found", period_id)))
    }
}

// ==================== Assignment Repository ====================

#[async_trait]
impl AssignmentRepository for LocalRepository {
    async fn store_class_timetable(
        &self,
        timetable: &ClassTimetable,
    ) -> RepositoryResult<ClassTimetable> {
        let mut state = self.state.write();
        ensure_healthy(&state)?;

        if timetable.is_active {
            let duplicate = state.class_timetables.values().any(|c| {
                c.id != timetable.id
                    && c.tenant_id == timetable.tenant_id
                    && c.is_current()
                    && c.class_id == timetable.class_id
                    && c.academic_year == timetable.academic_year
                    && c.term == timetable.term
            });
            if duplicate {
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

        state
            .class_timetables
            .insert(timetable.id, timetable.clone());
        Ok(timetable.clone())
    }

    async fn store_teacher_timetable(
        &self,
        timetable: &TeacherTimetable,
    ) -> RepositoryResult<TeacherTimetable> {
        let mut state = self.state.write();
        ensure_healthy(&state)?;

        if timetable.is_active {
            let duplicate = state.teacher_timetables.values().any(|t| {
                t.id != timetable.id
                    && t.tenant_id == timetable.tenant_id
                    && t.is_current()
                    && t.teacher_id == timetable.teacher_id
                    && t.academic_year == timetable.academic_year
                    && t.term == timetable.term
            });
            if duplicate {
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

        state
            .teacher_timetables
            .insert(timetable.id, timetable.clone());
        Ok(timetable.clone())
    }

    async fn get_class_timetable(
        &self,
        tenant_id: TenantId,
        id: ClassTimetableId,
    ) -> RepositoryResult<ClassTimetable> {
        let state = self.state.read();
        state
            .class_timetables
            .get(&id)
            .filter(|c| c.tenant_id == tenant_id && !c.is_deleted)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Class timetable {} not found", id)))
    }

    async fn get_teacher_timetable(
        &self,
        tenant_id: TenantId,
        id: TeacherTimetableId,
    ) -> RepositoryResult<TeacherTimetable> {
        let state = self.state.read();
        state
            .teacher_timetables
            .get(&id)
            .filter(|t| t.tenant_id == tenant_id && !t.is_deleted)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Teacher timetable {} not found", id))
            })
    }

    async fn find_active_class_binding(
        &self,
        tenant_id: TenantId,
        class_id: ClassId,
        academic_year: &str,
    ) -> RepositoryResult<Option<ClassTimetable>> {
        let state = self.state.read();
        Ok(state
            .class_timetables
            .values()
            .find(|c| {
                c.tenant_id == tenant_id
                    && c.is_current()
                    && c.class_id == class_id
                    && c.academic_year == academic_year
            })
            .cloned())
    }

    async fn find_active_teacher_binding(
        &self,
        tenant_id: TenantId,
        teacher_id: TeacherId,
        academic_year: &str,
    ) -> RepositoryResult<Option<TeacherTimetable>> {
        let state = self.state.read();
        Ok(state
            .teacher_timetables
            .values()
            .find(|t| {
                t.tenant_id == tenant_id
                    && t.is_current()
                    && t.teacher_id == teacher_id
                    && t.academic_year == academic_year
            })
            .cloned())
    }
}

// ==================== Schedule Entry Repository ====================

#[async_trait]
impl ScheduleEntryRepository for LocalRepository {
    async fn place_entry(
        &self,
        entry: &ScheduleEntry,
        policy: PlacementPolicy,
    ) -> RepositoryResult<PlacementOutcome> {
        // One guard across checks, detection, and insert.
        let mut state = self.state.write();
        ensure_healthy(&state)?;

        let period_number = validate_entry_refs(&state, entry, "place_entry")?;

        let mut stored = entry.clone();
        let mut replaced_entry_id = None;
        if let Some(occupant_id) = cell_occupant(&state, entry) {
            match policy {
                PlacementPolicy::Reject => {
                    return Err(RepositoryError::validation_with_context(
                        "An active schedule entry already occupies this class cell",
                        ErrorContext::new("place_entry")
                            .with_entity("schedule_entry")
                            .with_entity_id(occupant_id)
                            .with_details(format!(
                                "day={}, period={}",
                                entry.day_of_week, entry.period_id
                            )),
                    ));
                }
                PlacementPolicy::Replace => {
                    let occupant = &state.entries[&occupant_id];
                    stored.id = occupant_id;
                    stored.created_at = occupant.created_at;
                    stored.updated_at = Utc::now();
                    replaced_entry_id = Some(occupant_id);
                }
            }
        }

        let conflicts = detect_conflicts(&state, &stored, period_number);
        for conflict in &conflicts {
            state.conflicts.insert(conflict.id, conflict.clone());
        }
        state.entries.insert(stored.id, stored.clone());

        Ok(PlacementOutcome {
            entry: stored,
            conflicts,
            replaced_entry_id,
        })
    }

    async fn update_entry_checked(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
        changes: &ScheduleEntryUpdate,
    ) -> RepositoryResult<PlacementOutcome> {
        let mut state = self.state.write();
        ensure_healthy(&state)?;

        let mut updated = state
            .entries
            .get(&entry_id)
            .filter(|e| e.tenant_id == tenant_id && !e.is_deleted)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Schedule entry {} not found", entry_id))
            })?;

        changes.apply_to(&mut updated);

        let period_number = validate_entry_refs(&state, &updated, "update_entry")?;

        let mut conflicts = Vec::new();
        if changes.affects_conflicts() && updated.is_current() {
            if cell_occupant(&state, &updated).is_some() {
                return Err(RepositoryError::validation_with_context(
                    "An active schedule entry already occupies the target class cell",
                    ErrorContext::new("update_entry")
                        .with_entity("schedule_entry")
                        .with_entity_id(entry_id),
                ));
            }
            conflicts = detect_conflicts(&state, &updated, period_number);
            for conflict in &conflicts {
                state.conflicts.insert(conflict.id, conflict.clone());
            }
        }

        state.entries.insert(updated.id, updated.clone());

        Ok(PlacementOutcome {
            entry: updated,
            conflicts,
            replaced_entry_id: None,
        })
    }

    async fn delete_entry(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
        hard: bool,
    ) -> RepositoryResult<ScheduleEntry> {
        let mut state = self.state.write();
        ensure_healthy(&state)?;

        let not_found =
            || RepositoryError::not_found(format!("Schedule entry {} not found", entry_id));

        let tenant_matches = state
            .entries
            .get(&entry_id)
            .map_or(false, |e| e.tenant_id == tenant_id);
        if !tenant_matches {
            return Err(not_found());
        }

        if hard {
            return state.entries.remove(&entry_id).ok_or_else(not_found);
        }

        let entry = state.entries.get_mut(&entry_id).ok_or_else(not_found)?;
        if entry.is_deleted {
            return Err(not_found());
        }
        entry.is_deleted = true;
        entry.is_active = false;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn get_entry(
        &self,
        tenant_id: TenantId,
        entry_id: ScheduleEntryId,
    ) -> RepositoryResult<ScheduleEntry> {
        let state = self.state.read();
        state
            .entries
            .get(&entry_id)
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Schedule entry {} not found", entry_id))
            })
    }

    async fn list_entries_for_class(
        &self,
        tenant_id: TenantId,
        class_timetable_id: ClassTimetableId,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        let state = self.state.read();
        let mut entries: Vec<ScheduleEntry> = state
            .entries
            .values()
            .filter(|e| {
                e.tenant_id == tenant_id
                    && e.is_current()
                    && e.class_timetable_id == class_timetable_id
            })
            .cloned()
            .collect();

        entries.sort_by_key(|e| (e.created_at, e.id));
        Ok(entries)
    }

    async fn list_entries_for_teacher(
        &self,
        tenant_id: TenantId,
        teacher_timetable_id: TeacherTimetableId,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        let state = self.state.read();
        let mut entries: Vec<ScheduleEntry> = state
            .entries
            .values()
            .filter(|e| {
                e.tenant_id == tenant_id
                    && e.is_current()
                    && e.teacher_timetable_id == Some(teacher_timetable_id)
            })
            .cloned()
            .collect();

        entries.sort_by_key(|e| (e.created_at, e.id));
        Ok(entries)
    }
}

// ==================== Conflict Repository ====================

#[async_trait]
impl ConflictRepository for LocalRepository {
    async fn list_conflicts(
        &self,
        tenant_id: TenantId,
        filter: &ConflictFilter,
    ) -> RepositoryResult<Vec<TimetableConflict>> {
        let state = self.state.read();
        let mut conflicts: Vec<TimetableConflict> = state
            .conflicts
            .values()
            .filter(|c| c.tenant_id == tenant_id && !c.is_deleted)
            .filter(|c| !filter.unresolved_only || !c.is_resolved)
            .filter(|c| filter.severity.map_or(true, |severity| c.severity == severity))
            .cloned()
            .collect();

        conflicts.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(conflicts)
    }

    async fn get_conflict(
        &self,
        tenant_id: TenantId,
        id: ConflictId,
    ) -> RepositoryResult<TimetableConflict> {
        let state = self.state.read();
        state
            .conflicts
            .get(&id)
            .filter(|c| c.tenant_id == tenant_id && !c.is_deleted)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Conflict {} not found", id)))
    }

    async fn resolve_conflict(
        &self,
        tenant_id: TenantId,
        id: ConflictId,
        resolved_by: &str,
        resolution_notes: Option<&str>,
    ) -> RepositoryResult<TimetableConflict> {
        let mut state = self.state.write();
        ensure_healthy(&state)?;

        let conflict = state
            .conflicts
            .get_mut(&id)
            .filter(|c| c.tenant_id == tenant_id && !c.is_deleted)
            .ok_or_else(|| RepositoryError::not_found(format!("Conflict {} not found", id)))?;

        if conflict.is_resolved {
            return Err(RepositoryError::validation_with_context(
                format!("Conflict {} is already resolved", id),
                ErrorContext::new("resolve_conflict")
                    .with_entity("conflict")
                    .with_entity_id(id),
            ));
        }

        let now = Utc::now();
        conflict.is_resolved = true;
        conflict.resolved_by = Some(resolved_by.to_string());
        conflict.resolution_notes = resolution_notes.map(str::to_string);
        conflict.resolved_date = Some(now);
        conflict.updated_at = now;
        Ok(conflict.clone())
    }
}

// ==================== Analytics Repository ====================

#[async_trait]
impl AnalyticsRepository for LocalRepository {
    async fn binding_counts(
        &self,
        tenant_id: TenantId,
        master_timetable_id: MasterTimetableId,
    ) -> RepositoryResult<BindingCounts> {
        let state = self.state.read();

        let class_ids: HashSet<ClassTimetableId> = state
            .class_timetables
            .values()
            .filter(|c| {
                c.tenant_id == tenant_id
                    && c.is_current()
                    && c.master_timetable_id == master_timetable_id
            })
            .map(|c| c.id)
            .collect();
        let teachers = state
            .teacher_timetables
            .values()
            .filter(|t| {
                t.tenant_id == tenant_id
                    && t.is_current()
                    && t.master_timetable_id == master_timetable_id
            })
            .count();
        let schedule_entries = state
            .entries
            .values()
            .filter(|e| {
                e.tenant_id == tenant_id
                    && e.is_current()
                    && class_ids.contains(&e.class_timetable_id)
            })
            .count();

        Ok(BindingCounts {
            classes: class_ids.len(),
            teachers,
            schedule_entries,
        })
    }

    async fn fetch_tenant_snapshot(
        &self,
        tenant_id: TenantId,
        academic_year: &str,
    ) -> RepositoryResult<TenantYearSnapshot> {
        let state = self.state.read();

        let master_timetables: Vec<MasterTimetable> = state
            .master_timetables
            .values()
            .filter(|t| {
                t.tenant_id == tenant_id && !t.is_deleted && t.academic_year == academic_year
            })
            .cloned()
            .collect();
        let class_timetables: Vec<ClassTimetable> = state
            .class_timetables
            .values()
            .filter(|c| {
                c.tenant_id == tenant_id && c.is_current() && c.academic_year == academic_year
            })
            .cloned()
            .collect();
        let teacher_timetables: Vec<TeacherTimetable> = state
            .teacher_timetables
            .values()
            .filter(|t| {
                t.tenant_id == tenant_id && t.is_current() && t.academic_year == academic_year
            })
            .cloned()
            .collect();

        let class_ids: HashSet<ClassTimetableId> =
            class_timetables.iter().map(|c| c.id).collect();
        let entries: Vec<ScheduleEntry> = state
            .entries
            .values()
            .filter(|e| {
                e.tenant_id == tenant_id
                    && e.is_current()
                    && class_ids.contains(&e.class_timetable_id)
            })
            .cloned()
            .collect();

        let conflicts: Vec<TimetableConflict> = state
            .conflicts
            .values()
            .filter(|c| c.tenant_id == tenant_id && !c.is_deleted)
            .cloned()
            .collect();

        Ok(TenantYearSnapshot {
            master_timetables,
            class_timetables,
            teacher_timetables,
            entries,
            conflicts,
        })
    }
}
