//! Construction of conflict records.
//!
//! Both repository backends detect collisions inside their own atomic
//! placement step and call these builders, so the record content (titles,
//! descriptions, severities, context JSON) is identical regardless of
//! backend.

use chrono::Utc;
use serde_json::json;

use crate::api::ConflictId;
use crate::models::{
    ConflictSeverity, ConflictType, ScheduleEntry, TeacherTimetable, TimetableConflict,
};

/// Build a teacher double-booking record for one colliding pair.
///
/// `existing` is the entry that already occupied the (teacher, day,
/// period) cell; `incoming` is the entry whose placement detected the
/// collision. `class_labels` name the two classes involved, for the
/// operator-facing context data.
pub fn teacher_double_booking(
    existing: &ScheduleEntry,
    incoming: &ScheduleEntry,
    teacher: &TeacherTimetable,
    period_number: f64,
    class_labels: (String, String),
) -> TimetableConflict {
    let teacher_label = teacher
        .teacher_name
        .clone()
        .unwrap_or_else(|| teacher.teacher_id.to_string());
    let now = Utc::now();

    TimetableConflict {
        id: ConflictId::generate(),
        tenant_id: incoming.tenant_id,
        conflict_type: ConflictType::TeacherDoubleBooking,
        severity: ConflictSeverity::High,
        title: "Teacher Double Booking".to_string(),
        description: format!(
            "Teacher {} is scheduled for multiple classes at the same time",
            teacher_label
        ),
        schedule_entry_1_id: Some(existing.id),
        schedule_entry_2_id: Some(incoming.id),
        teacher_id: Some(teacher.teacher_id),
        room_number: None,
        day_of_week: Some(incoming.day_of_week),
        period_number: Some(period_number),
        conflict_data: Some(json!({
            "conflicting_entries": [existing.id, incoming.id],
            "class_names": [class_labels.0, class_labels.1],
        })),
        detected_by: "system".to_string(),
        is_resolved: false,
        resolved_by: None,
        resolution_notes: None,
        resolved_date: None,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

/// Build a room double-booking record for one colliding pair.
pub fn room_conflict(
    existing: &ScheduleEntry,
    incoming: &ScheduleEntry,
    room: &str,
    period_number: f64,
) -> TimetableConflict {
    let now = Utc::now();

    TimetableConflict {
        id: ConflictId::generate(),
        tenant_id: incoming.tenant_id,
        conflict_type: ConflictType::RoomConflict,
        severity: ConflictSeverity::Medium,
        title: "Room Double Booking".to_string(),
        description: format!("Room {} is booked for multiple classes", room),
        schedule_entry_1_id: Some(existing.id),
        schedule_entry_2_id: Some(incoming.id),
        teacher_id: None,
        room_number: Some(room.to_string()),
        day_of_week: Some(incoming.day_of_week),
        period_number: Some(period_number),
        conflict_data: Some(json!({
            "conflicting_entries": [existing.id, incoming.id],
            "subjects": [existing.subject_name, incoming.subject_name],
        })),
        detected_by: "system".to_string(),
        is_resolved: false,
        resolved_by: None,
        resolution_notes: None,
        resolved_date: None,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}
