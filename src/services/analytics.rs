//! Statistics over placed schedule entries.
//!
//! All aggregates are computed from fetched rows rather than stored
//! counters, so the numbers cannot drift from the schedule itself. The
//! repository supplies a [`TenantYearSnapshot`]; everything here is pure.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::api::{RoomUtilization, TeacherWorkload, TimetableAnalytics};
use crate::db::repository::TenantYearSnapshot;
use crate::models::{DayOfWeek, ScheduleEntry, TeacherTimetable};

/// Aggregate tenant-wide statistics for one academic year.
pub fn compute_analytics(snapshot: &TenantYearSnapshot) -> TimetableAnalytics {
    let unique_rooms_used: HashSet<&str> = snapshot
        .entries
        .iter()
        .filter_map(|e| e.occupied_room())
        .collect();
    let unique_subjects: HashSet<&str> = snapshot
        .entries
        .iter()
        .map(|e| e.subject_name.as_str())
        .collect();

    // Loads per teacher binding, including bindings with no entries.
    let mut per_teacher: HashMap<_, usize> = snapshot
        .teacher_timetables
        .iter()
        .map(|t| (t.id, 0usize))
        .collect();
    for entry in &snapshot.entries {
        if let Some(teacher_timetable_id) = entry.teacher_timetable_id {
            if let Some(count) = per_teacher.get_mut(&teacher_timetable_id) {
                *count += 1;
            }
        }
    }
    let (average_teacher_periods, max_teacher_periods, min_teacher_periods) =
        if per_teacher.is_empty() {
            (0.0, 0, 0)
        } else {
            let total: usize = per_teacher.values().sum();
            (
                total as f64 / per_teacher.len() as f64,
                per_teacher.values().copied().max().unwrap_or(0),
                per_teacher.values().copied().min().unwrap_or(0),
            )
        };

    let total_conflicts = snapshot.conflicts.len();
    let resolved = snapshot.conflicts.iter().filter(|c| c.is_resolved).count();
    let conflict_resolution_rate = if total_conflicts == 0 {
        100.0
    } else {
        resolved as f64 / total_conflicts as f64 * 100.0
    };

    TimetableAnalytics {
        total_master_timetables: snapshot.master_timetables.len(),
        total_class_timetables: snapshot.class_timetables.len(),
        total_teacher_timetables: snapshot.teacher_timetables.len(),
        total_schedule_entries: snapshot.entries.len(),
        total_conflicts,
        unresolved_conflicts: total_conflicts - resolved,
        unique_rooms_used: unique_rooms_used.len(),
        unique_subjects: unique_subjects.len(),
        average_teacher_periods,
        max_teacher_periods,
        min_teacher_periods,
        conflict_resolution_rate,
    }
}

/// Occupancy of one room against the slot capacity of the governing
/// grid: `working_days x teaching_periods` possible slots per week.
pub fn compute_room_utilization(
    room_number: &str,
    academic_year: &str,
    entries: &[ScheduleEntry],
    working_days: usize,
    teaching_periods: usize,
) -> RoomUtilization {
    let scheduled_slots = entries
        .iter()
        .filter(|e| e.occupied_room() == Some(room_number))
        .count();
    let possible_slots = working_days * teaching_periods;
    let utilization_percent = if possible_slots == 0 {
        0.0
    } else {
        scheduled_slots as f64 / possible_slots as f64 * 100.0
    };

    RoomUtilization {
        room_number: room_number.to_string(),
        academic_year: academic_year.to_string(),
        scheduled_slots,
        possible_slots,
        utilization_percent,
    }
}

/// A teacher's assigned load for the year against the limits configured
/// on their binding. Every weekday is keyed even when unassigned.
pub fn compute_teacher_workload(
    binding: &TeacherTimetable,
    entries: &[ScheduleEntry],
) -> TeacherWorkload {
    let mut periods_per_day: BTreeMap<DayOfWeek, usize> =
        DayOfWeek::ALL.iter().map(|d| (*d, 0)).collect();
    for entry in entries {
        if entry.teacher_timetable_id == Some(binding.id) {
            *periods_per_day.entry(entry.day_of_week).or_default() += 1;
        }
    }

    let total_periods_assigned: usize = periods_per_day.values().sum();
    let limit = binding.max_periods_per_day.max(0) as usize;
    let days_over_limit: Vec<DayOfWeek> = periods_per_day
        .iter()
        .filter(|(_, count)| **count > limit)
        .map(|(day, _)| *day)
        .collect();
    let utilization_percent = if binding.total_periods_per_week > 0 {
        total_periods_assigned as f64 / binding.total_periods_per_week as f64 * 100.0
    } else {
        0.0
    };

    TeacherWorkload {
        teacher_id: binding.teacher_id,
        academic_year: binding.academic_year.clone(),
        periods_per_day,
        total_periods_assigned,
        max_periods_per_day: binding.max_periods_per_day,
        total_periods_per_week: binding.total_periods_per_week,
        days_over_limit,
        utilization_percent,
    }
}
