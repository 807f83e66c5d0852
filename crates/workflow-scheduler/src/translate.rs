//! Translates a [`ScheduleDetail`] into either a cron expression (stored in
//! the recurring scheduler store) or a flat interval in minutes, following
//! the same per-type rules the original scheduler used.

use std::str::FromStr as _;

use chrono::NaiveDateTime;
use cron::Schedule as CronSchedule;
use workflow_contracts::{FrequencyUnit, ScheduleDetail};

use crate::error::{SchedulerError, SchedulerResult};

/// cron-crate day-of-week names accepted directly; we just filter the
/// three-letter codes the API accepts down to ones that match one of these.
const VALID_DAY_CODES: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Drops any day code that isn't recognized rather than rejecting the whole
/// request — an unrecognized code is dropped silently, not an error.
fn validate_days(days: &[String]) -> SchedulerResult<Vec<String>> {
    let filtered: Vec<String> = days
        .iter()
        .map(|d| d.to_ascii_uppercase())
        .filter(|d| VALID_DAY_CODES.contains(&d.as_str()))
        .collect();
    if filtered.is_empty() {
        return Err(SchedulerError::Validation(
            "at least one recognized day is required".to_string(),
        ));
    }
    Ok(filtered)
}

/// What a [`ScheduleDetail`] materializes to: either a validated cron
/// expression for the recurring store, or a flat `schedule_minutes` interval
/// for `PERIODIC` schedules (which the original never expressed as cron).
pub enum MaterializedSchedule {
    Cron(String),
    IntervalMinutes(i64),
    /// `IMMEDIATE` schedules never get a recurring-store entry.
    None,
}

pub fn materialize(detail: &ScheduleDetail) -> SchedulerResult<MaterializedSchedule> {
    match detail {
        ScheduleDetail::Immediate => Ok(MaterializedSchedule::None),

        ScheduleDetail::Once { run_at } => {
            let parsed = NaiveDateTime::parse_from_str(run_at, "%Y-%m-%d %H:%M")
                .map_err(|e| SchedulerError::Validation(format!("invalid run_at '{run_at}': {e}")))?;
            let expr = format!(
                "0 {} {} {} {} * {}",
                parsed.format("%M"),
                parsed.format("%H"),
                parsed.format("%d"),
                parsed.format("%m"),
                parsed.format("%Y"),
            );
            validate_cron(&expr)?;
            Ok(MaterializedSchedule::Cron(expr))
        }

        ScheduleDetail::WeeklySpecificDays { days } => {
            let days_expr = validate_days(days)?.join(",");
            let expr = format!("0 0 0 * * {days_expr} *");
            validate_cron(&expr)?;
            Ok(MaterializedSchedule::Cron(expr))
        }

        ScheduleDetail::MonthlySpecificDates { dates } => {
            if dates.is_empty() {
                return Err(SchedulerError::Validation(
                    "at least one date is required".to_string(),
                ));
            }
            let dates_expr = dates.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(",");
            let expr = format!("0 0 0 {dates_expr} * * *");
            validate_cron(&expr)?;
            Ok(MaterializedSchedule::Cron(expr))
        }

        ScheduleDetail::Periodic { every, unit } => {
            if *every == 0 {
                return Err(SchedulerError::Validation("interval must be at least 1".to_string()));
            }
            let minutes = *every as i64 * unit.minutes_per_unit();
            Ok(MaterializedSchedule::IntervalMinutes(minutes))
        }
    }
}

fn validate_cron(expr: &str) -> SchedulerResult<()> {
    CronSchedule::from_str(expr)
        .map(|_| ())
        .map_err(|e| SchedulerError::Validation(format!("invalid cron expression '{expr}': {e}")))
}

/// Normalizes a loosely-cased frequency unit string (e.g. `"Hours"`,
/// `"hour(s)"`) the way the original request payloads sent it.
pub fn parse_frequency_unit(raw: &str) -> SchedulerResult<FrequencyUnit> {
    raw.parse()
        .map_err(|_| SchedulerError::Validation(format!("unknown frequency unit '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_schedule_builds_a_valid_cron_expression() {
        let detail = ScheduleDetail::WeeklySpecificDays {
            days: vec!["MON".to_string(), "WED".to_string(), "FRI".to_string()],
        };
        match materialize(&detail).unwrap() {
            MaterializedSchedule::Cron(expr) => assert_eq!(expr, "0 0 0 * * MON,WED,FRI *"),
            _ => panic!("expected a cron expression"),
        }
    }

    #[test]
    fn weekly_schedule_drops_unrecognized_day_codes() {
        let detail = ScheduleDetail::WeeklySpecificDays {
            days: vec!["MON".to_string(), "FUNDAY".to_string()],
        };
        match materialize(&detail).unwrap() {
            MaterializedSchedule::Cron(expr) => assert_eq!(expr, "0 0 0 * * MON *"),
            _ => panic!("expected a cron expression"),
        }
    }

    #[test]
    fn monthly_schedule_builds_a_valid_cron_expression() {
        let detail = ScheduleDetail::MonthlySpecificDates { dates: vec![1, 15] };
        match materialize(&detail).unwrap() {
            MaterializedSchedule::Cron(expr) => assert_eq!(expr, "0 0 0 1,15 * * *"),
            _ => panic!("expected a cron expression"),
        }
    }

    #[test]
    fn once_schedule_pins_year_month_day_hour_minute() {
        let detail = ScheduleDetail::Once {
            run_at: "2026-08-01 14:05".to_string(),
        };
        match materialize(&detail).unwrap() {
            MaterializedSchedule::Cron(expr) => assert_eq!(expr, "0 05 14 01 08 * 2026"),
            _ => panic!("expected a cron expression"),
        }
    }

    #[test]
    fn once_schedule_rejects_an_unparseable_timestamp() {
        let detail = ScheduleDetail::Once {
            run_at: "not-a-date".to_string(),
        };
        assert!(matches!(materialize(&detail), Err(SchedulerError::Validation(_))));
    }

    #[test]
    fn periodic_schedule_flattens_to_minutes() {
        let detail = ScheduleDetail::Periodic {
            every: 2,
            unit: FrequencyUnit::Hours,
        };
        match materialize(&detail).unwrap() {
            MaterializedSchedule::IntervalMinutes(minutes) => assert_eq!(minutes, 120),
            _ => panic!("expected a flat interval"),
        }
    }

    #[test]
    fn immediate_schedule_materializes_to_nothing() {
        assert!(matches!(
            materialize(&ScheduleDetail::Immediate).unwrap(),
            MaterializedSchedule::None
        ));
    }
}
