//! Timetable entities: the master grid and the class/teacher bindings onto it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{
    ClassId, ClassTimetableId, MasterTimetableId, PeriodId, TeacherId, TeacherTimetableId,
    TenantId,
};
use crate::models::{DayOfWeek, PeriodType, TimetableStatus};

/// The canonical period grid for one (tenant, academic year, term).
///
/// Class and teacher timetables bind to a master timetable by id; the
/// master's generated periods define every placeable cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterTimetable {
    pub id: MasterTimetableId,
    pub tenant_id: TenantId,
    pub timetable_name: String,
    pub description: Option<String>,
    pub academic_year: String,
    pub term: Option<String>,
    pub effective_from: Option<NaiveDate>,
    pub effective_until: Option<NaiveDate>,
    /// Number of regular teaching periods per day (breaks excluded).
    pub total_periods_per_day: i32,
    pub school_start_time: NaiveTime,
    pub school_end_time: NaiveTime,
    /// Minutes per regular period.
    pub period_duration: i32,
    /// Minutes for the morning break; 0 means no break slot.
    pub break_duration: i32,
    /// Minutes for lunch; 0 means no lunch slot.
    pub lunch_duration: i32,
    pub working_days: Vec<DayOfWeek>,
    pub status: TimetableStatus,
    pub is_default: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One slot of a master timetable's daily grid.
///
/// Regular periods carry integer `period_number`; inserted breaks and
/// lunch carry half-integers so ordering by `period_number` yields the
/// in-day order without renumbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetablePeriod {
    pub id: PeriodId,
    pub tenant_id: TenantId,
    pub master_timetable_id: MasterTimetableId,
    pub period_number: f64,
    /// "Period 1" .. "Period N", "Morning Break", "Lunch Break".
    pub period_name: String,
    pub period_type: PeriodType,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    /// True only for slots that can hold schedule entries.
    pub is_teaching_period: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Binding of one class to a master timetable for an academic year/term.
///
/// At most one active binding may exist per (class, academic_year, term).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTimetable {
    pub id: ClassTimetableId,
    pub tenant_id: TenantId,
    pub class_id: ClassId,
    pub master_timetable_id: MasterTimetableId,
    pub academic_year: String,
    pub term: Option<String>,
    /// Denormalized display label, e.g. "Grade 7B".
    pub class_name: Option<String>,
    pub grade_level: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassTimetable {
    /// Whether this binding currently participates in scheduling.
    pub fn is_current(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

/// Binding of one teacher to a master timetable for an academic year/term.
///
/// Load limits and preferences are advisory inputs to workload reporting;
/// they are never enforced at placement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherTimetable {
    pub id: TeacherTimetableId,
    pub tenant_id: TenantId,
    pub teacher_id: TeacherId,
    pub master_timetable_id: MasterTimetableId,
    pub academic_year: String,
    pub term: Option<String>,
    /// Denormalized display label.
    pub teacher_name: Option<String>,
    pub max_periods_per_day: i32,
    pub total_periods_per_week: i32,
    pub preferred_periods: Vec<i32>,
    pub preferred_days: Vec<DayOfWeek>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeacherTimetable {
    /// Whether this binding currently participates in scheduling.
    pub fn is_current(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}
