//! Public API surface for the timetable engine.
//!
//! This file consolidates the typed identifiers and the operation
//! inputs/outputs (DTOs) exposed by the service layer. All types derive
//! Serialize/Deserialize for JSON serialization.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::define_id_type;
use crate::models::{
    ConflictSeverity, DayOfWeek, ScheduleEntry, TimetableConflict, TimetableStatus,
};

// ==================== Identifiers ====================

define_id_type!(TenantId);
define_id_type!(ClassId);
define_id_type!(TeacherId);
define_id_type!(MasterTimetableId);
define_id_type!(PeriodId);
define_id_type!(ClassTimetableId);
define_id_type!(TeacherTimetableId);
define_id_type!(ScheduleEntryId);
define_id_type!(ConflictId);

// ==================== Creation Specs ====================

fn default_total_periods_per_day() -> i32 {
    8
}

fn default_period_duration() -> i32 {
    45
}

fn default_break_duration() -> i32 {
    15
}

fn default_lunch_duration() -> i32 {
    60
}

fn default_working_days() -> Vec<DayOfWeek> {
    DayOfWeek::weekdays()
}

fn default_status() -> TimetableStatus {
    TimetableStatus::Draft
}

fn default_true() -> bool {
    true
}

fn default_max_periods_per_day() -> i32 {
    8
}

fn default_total_periods_per_week() -> i32 {
    40
}

/// Input for creating a master timetable. Grid parameters default to a
/// standard 8-period day (45-minute periods, 15-minute break, one-hour
/// lunch, monday through friday).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMasterTimetableSpec {
    pub tenant_id: TenantId,
    pub timetable_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub academic_year: String,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
    #[serde(default = "default_total_periods_per_day")]
    pub total_periods_per_day: i32,
    pub school_start_time: NaiveTime,
    pub school_end_time: NaiveTime,
    #[serde(default = "default_period_duration")]
    pub period_duration: i32,
    #[serde(default = "default_break_duration")]
    pub break_duration: i32,
    #[serde(default = "default_lunch_duration")]
    pub lunch_duration: i32,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<DayOfWeek>,
    #[serde(default = "default_status")]
    pub status: TimetableStatus,
    #[serde(default)]
    pub is_default: bool,
    /// When false the timetable is created without its period grid.
    #[serde(default = "default_true")]
    pub auto_generate_periods: bool,
}

/// Optional filters for listing master timetables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterTimetableFilter {
    pub academic_year: Option<String>,
    pub status: Option<TimetableStatus>,
}

/// Input for binding a class to a master timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassTimetableSpec {
    pub tenant_id: TenantId,
    pub class_id: ClassId,
    pub master_timetable_id: MasterTimetableId,
    pub academic_year: String,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
}

/// Input for binding a teacher to a master timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeacherTimetableSpec {
    pub tenant_id: TenantId,
    pub teacher_id: TeacherId,
    pub master_timetable_id: MasterTimetableId,
    pub academic_year: String,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default = "default_max_periods_per_day")]
    pub max_periods_per_day: i32,
    #[serde(default = "default_total_periods_per_week")]
    pub total_periods_per_week: i32,
    #[serde(default)]
    pub preferred_periods: Vec<i32>,
    #[serde(default)]
    pub preferred_days: Vec<DayOfWeek>,
}

// ==================== Placement ====================

/// Input for placing one schedule entry into a timetable cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntrySpec {
    pub tenant_id: TenantId,
    pub class_timetable_id: ClassTimetableId,
    #[serde(default)]
    pub teacher_timetable_id: Option<TeacherTimetableId>,
    pub period_id: PeriodId,
    pub day_of_week: DayOfWeek,
    pub subject_name: String,
    #[serde(default)]
    pub subject_code: Option<String>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_substitution: bool,
    #[serde(default = "default_true")]
    pub is_recurring: bool,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

/// What to do when a placement targets an occupied active class cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    /// Fail the placement with a validation error (single placements).
    Reject,
    /// Update the occupant in place, keeping its id (bulk imports).
    Replace,
}

/// Result of one placement: the stored entry plus any conflict records
/// it produced. Conflicts accompany a successful placement; they are
/// never a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementOutcome {
    pub entry: ScheduleEntry,
    pub conflicts: Vec<TimetableConflict>,
    /// Id of the class-cell occupant that was overwritten, when the
    /// `Replace` policy applied. Equal to `entry.id` in that case.
    pub replaced_entry_id: Option<ScheduleEntryId>,
}

/// Field-level changes for an existing entry. `None` means "leave as is";
/// clearing a field to empty is not supported through bulk updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleEntryUpdate {
    pub day_of_week: Option<DayOfWeek>,
    pub period_id: Option<PeriodId>,
    pub teacher_timetable_id: Option<TeacherTimetableId>,
    pub subject_name: Option<String>,
    pub subject_code: Option<String>,
    pub teacher_name: Option<String>,
    pub room_number: Option<String>,
    pub building: Option<String>,
    pub notes: Option<String>,
    pub is_substitution: Option<bool>,
    pub is_active: Option<bool>,
}

impl ScheduleEntryUpdate {
    /// Whether the change set moves the entry to another cell or teacher,
    /// which requires re-running conflict detection.
    pub fn affects_conflicts(&self) -> bool {
        self.day_of_week.is_some()
            || self.period_id.is_some()
            || self.teacher_timetable_id.is_some()
            || self.room_number.is_some()
    }

    /// Apply the set fields to an entry and bump its `updated_at`.
    pub fn apply_to(&self, entry: &mut ScheduleEntry) {
        if let Some(day) = self.day_of_week {
            entry.day_of_week = day;
        }
        if let Some(period_id) = self.period_id {
            entry.period_id = period_id;
        }
        if let Some(teacher_timetable_id) = self.teacher_timetable_id {
            entry.teacher_timetable_id = Some(teacher_timetable_id);
        }
        if let Some(ref subject_name) = self.subject_name {
            entry.subject_name = subject_name.clone();
        }
        if let Some(ref subject_code) = self.subject_code {
            entry.subject_code = Some(subject_code.clone());
        }
        if let Some(ref teacher_name) = self.teacher_name {
            entry.teacher_name = Some(teacher_name.clone());
        }
        if let Some(ref room_number) = self.room_number {
            entry.room_number = Some(room_number.clone());
        }
        if let Some(ref building) = self.building {
            entry.building = Some(building.clone());
        }
        if let Some(ref notes) = self.notes {
            entry.notes = Some(notes.clone());
        }
        if let Some(is_substitution) = self.is_substitution {
            entry.is_substitution = is_substitution;
        }
        if let Some(is_active) = self.is_active {
            entry.is_active = is_active;
        }
        entry.updated_at = chrono::Utc::now();
    }
}

// ==================== Bulk Operations ====================

/// One loosely-typed row of a bulk create request. Required fields are
/// checked per row so one bad row cannot abort the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkEntryRow {
    pub class_timetable_id: Option<ClassTimetableId>,
    pub teacher_timetable_id: Option<TeacherTimetableId>,
    pub period_id: Option<PeriodId>,
    pub day_of_week: Option<DayOfWeek>,
    pub subject_name: Option<String>,
    pub subject_code: Option<String>,
    pub teacher_name: Option<String>,
    pub room_number: Option<String>,
    pub building: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_substitution: bool,
    #[serde(default = "default_true")]
    pub is_recurring: bool,
    pub effective_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

/// One row of a bulk update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkUpdateRow {
    pub schedule_entry_id: Option<ScheduleEntryId>,
    #[serde(default)]
    pub changes: ScheduleEntryUpdate,
}

/// A row-level failure inside a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRowError {
    /// 1-based index into the request rows.
    pub row: usize,
    /// Entity reference for the failed row, where one is known.
    pub reference: Option<String>,
    pub message: String,
}

/// Outcome status of a bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    Completed,
    CompletedWithErrors,
}

/// Per-row accounting for a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResult {
    pub status: BulkStatus,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<BulkRowError>,
    /// Shared provenance id for entries created by this batch (create only).
    pub batch_id: Option<Uuid>,
    /// Conflict records produced across the whole batch.
    pub conflicts_detected: usize,
}

// ==================== Query Views ====================

/// One placed slot in a weekly or daily schedule view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub schedule_entry_id: ScheduleEntryId,
    pub period_number: f64,
    pub period_name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub subject_name: String,
    pub subject_code: Option<String>,
    /// Present in class views.
    pub teacher_name: Option<String>,
    /// Present in teacher views.
    pub class_name: Option<String>,
    pub room_number: Option<String>,
    pub building: Option<String>,
    pub notes: Option<String>,
    pub is_substitution: bool,
}

/// A week keyed by day (monday..sunday, every day present even when empty),
/// each day ordered by period number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub academic_year: String,
    pub days: BTreeMap<DayOfWeek, Vec<ScheduleSlot>>,
}

/// A master timetable listing with usage counts aggregated at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterTimetableSummary {
    pub timetable: crate::models::MasterTimetable,
    pub total_classes: usize,
    pub total_teachers: usize,
    pub total_schedule_entries: usize,
}

/// Filters for listing conflicts. Defaults to unresolved records only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictFilter {
    pub unresolved_only: bool,
    pub severity: Option<ConflictSeverity>,
}

impl Default for ConflictFilter {
    fn default() -> Self {
        Self {
            unresolved_only: true,
            severity: None,
        }
    }
}

// ==================== Analytics ====================

/// Tenant-wide scheduling statistics for one academic year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableAnalytics {
    pub total_master_timetables: usize,
    pub total_class_timetables: usize,
    pub total_teacher_timetables: usize,
    pub total_schedule_entries: usize,
    pub total_conflicts: usize,
    pub unresolved_conflicts: usize,
    pub unique_rooms_used: usize,
    pub unique_subjects: usize,
    pub average_teacher_periods: f64,
    pub max_teacher_periods: usize,
    pub min_teacher_periods: usize,
    /// Percentage of conflicts resolved; 100.0 when there are none.
    pub conflict_resolution_rate: f64,
}

/// Occupancy of one room against the governing grid's capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUtilization {
    pub room_number: String,
    pub academic_year: String,
    pub scheduled_slots: usize,
    /// working days x teaching periods of the governing master timetable.
    pub possible_slots: usize,
    pub utilization_percent: f64,
}

/// A teacher's assigned load against their configured limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherWorkload {
    pub teacher_id: TeacherId,
    pub academic_year: String,
    pub periods_per_day: BTreeMap<DayOfWeek, usize>,
    pub total_periods_assigned: usize,
    pub max_periods_per_day: i32,
    pub total_periods_per_week: i32,
    /// Days whose assigned count exceeds `max_periods_per_day`.
    pub days_over_limit: Vec<DayOfWeek>,
    pub utilization_percent: f64,
}
