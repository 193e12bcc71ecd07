//! Projection of placed entries into weekly and daily schedule views.
//!
//! Pure functions over already-fetched rows: the service layer fetches
//! the binding, grid, and entries, then projects here.

use std::collections::{BTreeMap, HashMap};

use crate::api::{ClassTimetableId, PeriodId, ScheduleSlot, WeeklySchedule};
use crate::models::{DayOfWeek, ScheduleEntry, TimetablePeriod};

fn slot_from_entry(entry: &ScheduleEntry, period: &TimetablePeriod) -> ScheduleSlot {
    ScheduleSlot {
        schedule_entry_id: entry.id,
        period_number: period.period_number,
        period_name: period.period_name.clone(),
        start_time: period.start_time,
        end_time: period.end_time,
        subject_name: entry.subject_name.clone(),
        subject_code: entry.subject_code.clone(),
        teacher_name: None,
        class_name: None,
        room_number: entry.room_number.clone(),
        building: entry.building.clone(),
        notes: entry.notes.clone(),
        is_substitution: entry.is_substitution,
    }
}

fn period_index(periods: &[TimetablePeriod]) -> HashMap<PeriodId, &TimetablePeriod> {
    periods.iter().map(|p| (p.id, p)).collect()
}

fn empty_week() -> BTreeMap<DayOfWeek, Vec<ScheduleSlot>> {
    DayOfWeek::ALL.iter().map(|d| (*d, Vec::new())).collect()
}

fn sort_days(days: &mut BTreeMap<DayOfWeek, Vec<ScheduleSlot>>) {
    for slots in days.values_mut() {
        slots.sort_by(|a, b| a.period_number.total_cmp(&b.period_number));
    }
}

/// Project a class timetable's entries into a week. Slots carry the
/// teacher name snapshot of each entry; every weekday is keyed even when
/// it has no slots.
pub fn project_class_week(
    academic_year: &str,
    periods: &[TimetablePeriod],
    entries: &[ScheduleEntry],
) -> WeeklySchedule {
    let index = period_index(periods);
    let mut days = empty_week();

    for entry in entries {
        if let Some(period) = index.get(&entry.period_id) {
            let mut slot = slot_from_entry(entry, period);
            slot.teacher_name = entry.teacher_name.clone();
            days.entry(entry.day_of_week).or_default().push(slot);
        }
    }

    sort_days(&mut days);
    WeeklySchedule {
        academic_year: academic_year.to_string(),
        days,
    }
}

/// Project a teacher timetable's entries into a week. Slots carry the
/// class label of each entry's class binding.
pub fn project_teacher_week(
    academic_year: &str,
    periods: &[TimetablePeriod],
    entries: &[ScheduleEntry],
    class_labels: &HashMap<ClassTimetableId, String>,
) -> WeeklySchedule {
    let index = period_index(periods);
    let mut days = empty_week();

    for entry in entries {
        if let Some(period) = index.get(&entry.period_id) {
            let mut slot = slot_from_entry(entry, period);
            slot.class_name = class_labels.get(&entry.class_timetable_id).cloned();
            days.entry(entry.day_of_week).or_default().push(slot);
        }
    }

    sort_days(&mut days);
    WeeklySchedule {
        academic_year: academic_year.to_string(),
        days,
    }
}

/// Project one day of a class timetable, ordered by period number.
pub fn project_class_day(
    periods: &[TimetablePeriod],
    entries: &[ScheduleEntry],
    day: DayOfWeek,
) -> Vec<ScheduleSlot> {
    let index = period_index(periods);
    let mut slots: Vec<ScheduleSlot> = entries
        .iter()
        .filter(|e| e.day_of_week == day)
        .filter_map(|e| {
            index.get(&e.period_id).map(|period| {
                let mut slot = slot_from_entry(e, period);
                slot.teacher_name = e.teacher_name.clone();
                slot
            })
        })
        .collect();

    slots.sort_by(|a, b| a.period_number.total_cmp(&b.period_number));
    slots
}
