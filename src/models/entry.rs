//! Placed schedule entries and the conflict records derived from them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::{
    ClassTimetableId, ConflictId, PeriodId, ScheduleEntryId, TeacherId, TeacherTimetableId,
    TenantId,
};
use crate::models::{ConflictSeverity, ConflictType, DayOfWeek};

/// A placed assignment of subject/teacher/room into one (class timetable,
/// day, period) cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: ScheduleEntryId,
    pub tenant_id: TenantId,
    pub class_timetable_id: ClassTimetableId,
    pub teacher_timetable_id: Option<TeacherTimetableId>,
    pub period_id: PeriodId,
    pub day_of_week: DayOfWeek,
    pub subject_name: String,
    pub subject_code: Option<String>,
    /// Display snapshot; authoritative teacher data lives with the binding.
    pub teacher_name: Option<String>,
    pub room_number: Option<String>,
    pub building: Option<String>,
    pub notes: Option<String>,
    pub is_substitution: bool,
    pub is_recurring: bool,
    /// Validity window for non-recurring placements.
    pub effective_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    /// Bulk-import provenance: all rows of one batch share one id.
    pub batch_id: Option<Uuid>,
    pub import_source: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleEntry {
    /// Whether this entry currently occupies its cell.
    pub fn is_current(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    /// The room this entry books, if any. Empty strings count as no room,
    /// matching the room-conflict rule that skips blank assignments.
    pub fn occupied_room(&self) -> Option<&str> {
        self.room_number.as_deref().filter(|r| !r.is_empty())
    }
}

/// A recorded violation of the one-active-entry-per-cell intent for a
/// teacher or room. Advisory: placement succeeds and the conflict is left
/// for an operator to resolve explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableConflict {
    pub id: ConflictId,
    pub tenant_id: TenantId,
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    pub title: String,
    pub description: String,
    /// The previously existing entry of the colliding pair.
    pub schedule_entry_1_id: Option<ScheduleEntryId>,
    /// The newly placed or updated entry of the colliding pair.
    pub schedule_entry_2_id: Option<ScheduleEntryId>,
    pub teacher_id: Option<TeacherId>,
    pub room_number: Option<String>,
    pub day_of_week: Option<DayOfWeek>,
    pub period_number: Option<f64>,
    /// Free-form context (colliding entry ids, subject/class labels).
    pub conflict_data: Option<Value>,
    /// "system" for conflicts created by placement.
    pub detected_by: String,
    pub is_resolved: bool,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub resolved_date: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
