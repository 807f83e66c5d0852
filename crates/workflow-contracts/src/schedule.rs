//! Task scheduling: one-off, recurring, and immediate dispatch of catalog tasks.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScheduleType {
    Immediate,
    Once,
    WeeklySpecificDays,
    MonthlySpecificDates,
    Periodic,
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScheduleType::Immediate => "IMMEDIATE",
            ScheduleType::Once => "ONCE",
            ScheduleType::WeeklySpecificDays => "WEEKLY_SPECIFIC_DAYS",
            ScheduleType::MonthlySpecificDates => "MONTHLY_SPECIFIC_DATES",
            ScheduleType::Periodic => "PERIODIC",
        };
        f.write_str(s)
    }
}

impl FromStr for ScheduleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IMMEDIATE" => Ok(ScheduleType::Immediate),
            "ONCE" => Ok(ScheduleType::Once),
            "WEEKLY_SPECIFIC_DAYS" => Ok(ScheduleType::WeeklySpecificDays),
            "MONTHLY_SPECIFIC_DATES" => Ok(ScheduleType::MonthlySpecificDates),
            "PERIODIC" => Ok(ScheduleType::Periodic),
            other => Err(format!("unknown schedule type: {other}")),
        }
    }
}

/// Frequency unit for a [`ScheduleType::Periodic`] schedule, normalized from
/// whatever case/plural form the caller sent (e.g. "Hours", "hour(s)").
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FrequencyUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl FrequencyUnit {
    /// Minutes per unit, used to flatten a periodic schedule to `schedule_minutes`.
    pub fn minutes_per_unit(&self) -> i64 {
        match self {
            FrequencyUnit::Minutes => 1,
            FrequencyUnit::Hours => 60,
            FrequencyUnit::Days => 24 * 60,
            FrequencyUnit::Weeks => 7 * 24 * 60,
            FrequencyUnit::Months => 30 * 24 * 60,
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .trim_end_matches("(s)")
            .trim_end_matches('s')
            .to_ascii_uppercase();
        match normalized.as_str() {
            "MINUTE" => Ok(FrequencyUnit::Minutes),
            "HOUR" => Ok(FrequencyUnit::Hours),
            "DAY" => Ok(FrequencyUnit::Days),
            "WEEK" => Ok(FrequencyUnit::Weeks),
            "MONTH" => Ok(FrequencyUnit::Months),
            other => Err(format!("unknown frequency unit: {other}")),
        }
    }
}

/// Type-specific scheduling detail. Exactly one variant's shape is populated
/// depending on the sibling [`ScheduleType`].
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum ScheduleDetail {
    Immediate,
    Once {
        /// Naive local timestamp, as submitted (`%Y-%m-%d %H:%M`).
        run_at: String,
    },
    WeeklySpecificDays {
        /// Three-letter day codes, e.g. `["MON", "WED", "FRI"]`. Always
        /// fires at 00:00 local time; there's no caller-supplied hour/minute.
        days: Vec<String>,
    },
    MonthlySpecificDates {
        /// Days of month, 1-31. Always fires at 00:00 local time.
        dates: Vec<u32>,
    },
    Periodic {
        every: u32,
        unit: FrequencyUnit,
    },
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub schedule_id: Uuid,
    pub task_name: String,
    pub user_schedule_name: String,
    pub schedule_type: ScheduleType,
    pub detail: ScheduleDetail,
    pub parameters: serde_json::Value,
    /// Name of the entry in the recurring scheduler store; absent for
    /// `IMMEDIATE` schedules, which never get one.
    pub store_schedule_name: Option<String>,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSchedule {
    pub task_name: String,
    pub user_schedule_name: String,
    pub schedule_type: ScheduleType,
    pub detail: ScheduleDetail,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateSchedule {
    pub schedule_type: ScheduleType,
    pub detail: ScheduleDetail,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SchedulePage {
    pub items: Vec<Schedule>,
    pub total: i64,
    pub pages: i64,
    pub page: i64,
}
