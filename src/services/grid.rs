//! Period grid generation: derives the daily sequence of periods for a
//! master timetable from the school-day parameters.
//!
//! The grid is contiguous (each slot starts where the previous one ends)
//! and never truncated: a configuration whose grid would run past the end
//! of the school day is rejected outright.

use chrono::{NaiveTime, Timelike};

use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::PeriodType;

/// Regular period index (0-based) after which the morning break is inserted.
const BREAK_AFTER_INDEX: i32 = 2;
/// Regular period index (0-based) after which lunch is inserted.
const LUNCH_AFTER_INDEX: i32 = 5;

/// School-day parameters the grid is derived from. All durations are in
/// minutes.
#[derive(Debug, Clone, Copy)]
pub struct GridConfig {
    pub school_start_time: NaiveTime,
    pub school_end_time: NaiveTime,
    pub total_periods_per_day: i32,
    pub period_duration: i32,
    pub break_duration: i32,
    pub lunch_duration: i32,
}

/// One generated slot, prior to persistence (no ids or tenant scope yet).
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPeriod {
    pub period_number: f64,
    pub period_name: String,
    pub period_type: PeriodType,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub is_teaching_period: bool,
}

fn minutes_of(t: NaiveTime) -> i64 {
    (t.num_seconds_from_midnight() / 60) as i64
}

fn time_from_minutes(m: i64) -> RepositoryResult<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt((m * 60) as u32, 0).ok_or_else(|| {
        RepositoryError::internal(format!("Minute offset {} is outside the day", m))
    })
}

/// Validate the school-day parameters without generating anything.
///
/// Checked at master-timetable creation even when period generation is
/// skipped, so a bad configuration never persists.
pub fn validate_config(config: &GridConfig) -> RepositoryResult<()> {
    if config.total_periods_per_day < 1 {
        return Err(RepositoryError::validation(
            "total_periods_per_day must be at least 1",
        ));
    }
    if config.period_duration < 1 {
        return Err(RepositoryError::validation(
            "period_duration must be at least 1 minute",
        ));
    }
    if config.break_duration < 0 {
        return Err(RepositoryError::validation(
            "break_duration must not be negative",
        ));
    }
    if config.lunch_duration < 0 {
        return Err(RepositoryError::validation(
            "lunch_duration must not be negative",
        ));
    }
    if config.school_end_time <= config.school_start_time {
        return Err(RepositoryError::validation(
            "school_end_time must be after school_start_time",
        ));
    }
    Ok(())
}

/// Generate the daily period grid for a configuration.
///
/// Walks forward from `school_start_time` emitting `total_periods_per_day`
/// regular periods; the morning break follows the third period and lunch
/// follows the sixth, each with a half-integer `period_number` so ordering
/// by number gives the in-day order. A break or lunch duration of zero
/// emits no slot.
///
/// # Errors
/// * `ValidationError` for out-of-range parameters.
/// * `ConfigurationError` when the grid would end after `school_end_time`;
///   the last period is never shortened to fit.
pub fn generate_periods(config: &GridConfig) -> RepositoryResult<Vec<GeneratedPeriod>> {
    validate_config(config)?;

    // Build boundaries in minutes-since-midnight first so an oversized
    // grid is caught by arithmetic rather than by time-of-day wraparound.
    struct Slot {
        number: f64,
        name: String,
        kind: PeriodType,
        start_min: i64,
        end_min: i64,
    }

    let mut slots: Vec<Slot> = Vec::new();
    let mut cursor = minutes_of(config.school_start_time);

    for i in 0..config.total_periods_per_day {
        let number = (i + 1) as f64;
        let start = cursor;
        cursor += config.period_duration as i64;
        slots.push(Slot {
            number,
            name: format!("Period {}", i + 1),
            kind: PeriodType::Regular,
            start_min: start,
            end_min: cursor,
        });

        if i == BREAK_AFTER_INDEX && config.break_duration > 0 {
            let start = cursor;
            cursor += config.break_duration as i64;
            slots.push(Slot {
                number: number + 0.5,
                name: "Morning Break".to_string(),
                kind: PeriodType::Break,
                start_min: start,
                end_min: cursor,
            });
        } else if i == LUNCH_AFTER_INDEX && config.lunch_duration > 0 {
            let start = cursor;
            cursor += config.lunch_duration as i64;
            slots.push(Slot {
                number: number + 0.5,
                name: "Lunch Break".to_string(),
                kind: PeriodType::Lunch,
                start_min: start,
                end_min: cursor,
            });
        }
    }

    let end_of_day = minutes_of(config.school_end_time);
    if cursor > end_of_day {
        return Err(RepositoryError::configuration(format!(
            "Generated grid needs {} minutes but the school day {} to {} has only {}",
            cursor - minutes_of(config.school_start_time),
            config.school_start_time.format("%H:%M"),
            config.school_end_time.format("%H:%M"),
            end_of_day - minutes_of(config.school_start_time),
        )));
    }

    let mut periods = Vec::with_capacity(slots.len());
    for slot in slots {
        periods.push(GeneratedPeriod {
            period_number: slot.number,
            period_name: slot.name,
            period_type: slot.kind,
            start_time: time_from_minutes(slot.start_min)?,
            end_time: time_from_minutes(slot.end_min)?,
            duration_minutes: (slot.end_min - slot.start_min) as i32,
            is_teaching_period: slot.kind == PeriodType::Regular,
        });
    }

    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn standard_day(end: NaiveTime) -> GridConfig {
        GridConfig {
            school_start_time: t(9, 0),
            school_end_time: end,
            total_periods_per_day: 8,
            period_duration: 45,
            break_duration: 15,
            lunch_duration: 60,
        }
    }

    #[test]
    fn test_standard_day_shape() {
        let periods = generate_periods(&standard_day(t(16, 15))).unwrap();

        // 8 regular + break + lunch
        assert_eq!(periods.len(), 10);
        assert_eq!(
            periods.iter().filter(|p| p.is_teaching_period).count(),
            8
        );

        let break_slot = periods
            .iter()
            .find(|p| p.period_type == PeriodType::Break)
            .unwrap();
        assert_eq!(break_slot.period_name, "Morning Break");
        assert_eq!(break_slot.period_number, 3.5);
        assert_eq!(break_slot.start_time, t(11, 15));
        assert_eq!(break_slot.duration_minutes, 15);

        let lunch_slot = periods
            .iter()
            .find(|p| p.period_type == PeriodType::Lunch)
            .unwrap();
        assert_eq!(lunch_slot.period_name, "Lunch Break");
        assert_eq!(lunch_slot.period_number, 6.5);
        assert_eq!(lunch_slot.start_time, t(13, 45));
        assert_eq!(lunch_slot.duration_minutes, 60);

        let last = periods.last().unwrap();
        assert_eq!(last.period_name, "Period 8");
        assert_eq!(last.end_time, t(16, 15));
    }

    #[test]
    fn test_grid_is_contiguous_and_ordered() {
        let periods = generate_periods(&standard_day(t(16, 15))).unwrap();
        for pair in periods.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
            assert!(pair[0].period_number < pair[1].period_number);
        }
    }

    #[test]
    fn test_overshoot_is_rejected_not_truncated() {
        // 8x45 + 15 + 60 = 435 minutes; a 09:00-16:00 day has 420.
        let err = generate_periods(&standard_day(t(16, 0))).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::ConfigurationError { .. }
        ));
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let periods = generate_periods(&standard_day(t(16, 15))).unwrap();
        assert_eq!(periods.last().unwrap().end_time, t(16, 15));
    }

    #[test]
    fn test_zero_break_duration_emits_no_break() {
        let mut config = standard_day(t(16, 0));
        config.break_duration = 0;
        let periods = generate_periods(&config).unwrap();
        assert!(periods.iter().all(|p| p.period_type != PeriodType::Break));
        assert_eq!(periods.len(), 9);
    }

    #[test]
    fn test_short_grid_has_no_break_or_lunch() {
        let config = GridConfig {
            school_start_time: t(9, 0),
            school_end_time: t(11, 0),
            total_periods_per_day: 2,
            period_duration: 45,
            break_duration: 15,
            lunch_duration: 60,
        };
        let periods = generate_periods(&config).unwrap();
        assert_eq!(periods.len(), 2);
        assert!(periods.iter().all(|p| p.is_teaching_period));
    }

    #[test]
    fn test_invalid_inputs_are_validation_errors() {
        let mut config = standard_day(t(16, 15));
        config.total_periods_per_day = 0;
        assert!(matches!(
            generate_periods(&config).unwrap_err(),
            RepositoryError::ValidationError { .. }
        ));

        let mut config = standard_day(t(16, 15));
        config.period_duration = 0;
        assert!(matches!(
            generate_periods(&config).unwrap_err(),
            RepositoryError::ValidationError { .. }
        ));

        let mut config = standard_day(t(16, 15));
        config.break_duration = -5;
        assert!(matches!(
            generate_periods(&config).unwrap_err(),
            RepositoryError::ValidationError { .. }
        ));

        let mut config = standard_day(t(9, 0));
        config.school_end_time = t(8, 0);
        assert!(matches!(
            generate_periods(&config).unwrap_err(),
            RepositoryError::ValidationError { .. }
        ));
    }

    #[test]
    fn test_period_names_are_one_based() {
        let periods = generate_periods(&standard_day(t(16, 15))).unwrap();
        let regular: Vec<&GeneratedPeriod> =
            periods.iter().filter(|p| p.is_teaching_period).collect();
        for (i, p) in regular.iter().enumerate() {
            assert_eq!(p.period_name, format!("Period {}", i + 1));
            assert_eq!(p.period_number, (i + 1) as f64);
        }
    }
}
