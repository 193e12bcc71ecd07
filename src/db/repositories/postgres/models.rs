use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{
    class_timetables, master_timetables, periods, schedule_entries, teacher_timetables,
    timetable_conflicts,
};

// Identifiers are generated by the application, so the same struct serves
// both reads and inserts.

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = master_timetables)]
#[allow(dead_code)] // Some fields used only for database operations
pub struct MasterTimetableRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub timetable_name: String,
    pub description: Option<String>,
    pub academic_year: String,
    pub term: Option<String>,
    pub effective_from: Option<NaiveDate>,
    pub effective_until: Option<NaiveDate>,
    pub total_periods_per_day: i32,
    pub school_start_time: NaiveTime,
    pub school_end_time: NaiveTime,
    pub period_duration: i32,
    pub break_duration: i32,
    pub lunch_duration: i32,
    pub working_days: Value,
    pub status: String,
    pub is_default: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = periods)]
#[allow(dead_code)]
pub struct PeriodRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub master_timetable_id: Uuid,
    pub period_number: f64,
    pub period_name: String,
    pub period_type: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub is_teaching_period: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = class_timetables)]
#[allow(dead_code)]
pub struct ClassTimetableRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub class_id: Uuid,
    pub master_timetable_id: Uuid,
    pub academic_year: String,
    pub term: Option<String>,
    pub class_name: Option<String>,
    pub grade_level: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = teacher_timetables)]
#[allow(dead_code)]
pub struct TeacherTimetableRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub teacher_id: Uuid,
    pub master_timetable_id: Uuid,
    pub academic_year: String,
    pub term: Option<String>,
    pub teacher_name: Option<String>,
    pub max_periods_per_day: i32,
    pub total_periods_per_week: i32,
    pub preferred_periods: Value,
    pub preferred_days: Value,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = schedule_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
#[allow(dead_code)] // Some fields used only for database operations
pub struct ScheduleEntryRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub class_timetable_id: Uuid,
    pub teacher_timetable_id: Option<Uuid>,
    pub period_id: Uuid,
    pub day_of_week: String,
    pub subject_name: String,
    pub subject_code: Option<String>,
    pub teacher_name: Option<String>,
    pub room_number: Option<String>,
    pub building: Option<String>,
    pub notes: Option<String>,
    pub is_substitution: bool,
    pub is_recurring: bool,
    pub effective_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub batch_id: Option<Uuid>,
    pub import_source: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = timetable_conflicts)]
#[allow(dead_code)]
pub struct TimetableConflictRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub conflict_type: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    pub schedule_entry_1_id: Option<Uuid>,
    pub schedule_entry_2_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub room_number: Option<String>,
    pub day_of_week: Option<String>,
    pub period_number: Option<f64>,
    pub conflict_data: Option<Value>,
    pub detected_by: String,
    pub is_resolved: bool,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub resolved_date: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
