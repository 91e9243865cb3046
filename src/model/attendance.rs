use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::model::employee::EmployeeId;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BreakKind {
    Smoking,
    Lunch,
}

/// A start/end pair for one kind of break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BreakInterval {
    #[schema(example = "2026-01-05T10:00:00Z")]
    pub start: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-05T10:10:00Z")]
    pub end: Option<DateTime<Utc>>,
}

impl BreakInterval {
    pub fn is_open(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    /// Length in fractional minutes, only when both ends are present.
    pub fn closed_minutes(&self) -> Option<f64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(minutes_between(start, end)),
            _ => None,
        }
    }
}

/// One employee's attendance for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1,
    "date": "2026-01-05",
    "entry_time": "2026-01-05T08:00:00Z",
    "smoking_break": { "start": "2026-01-05T10:00:00Z", "end": "2026-01-05T10:10:00Z" },
    "lunch_break": { "start": "2026-01-05T13:00:00Z", "end": "2026-01-05T13:30:00Z" },
    "exit_time": "2026-01-05T16:00:00Z",
    "total_worked_minutes": 440
}))]
pub struct AttendanceRecord {
    #[schema(value_type = u64)]
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub entry_time: Option<DateTime<Utc>>,
    pub smoking_break: BreakInterval,
    pub lunch_break: BreakInterval,
    pub exit_time: Option<DateTime<Utc>>,
    pub total_worked_minutes: Option<i64>,
}

impl AttendanceRecord {
    pub fn new(employee_id: EmployeeId, date: NaiveDate) -> Self {
        Self {
            employee_id,
            date,
            entry_time: None,
            smoking_break: BreakInterval::default(),
            lunch_break: BreakInterval::default(),
            exit_time: None,
            total_worked_minutes: None,
        }
    }

    pub fn break_interval(&self, kind: BreakKind) -> &BreakInterval {
        match kind {
            BreakKind::Smoking => &self.smoking_break,
            BreakKind::Lunch => &self.lunch_break,
        }
    }

    pub fn break_interval_mut(&mut self, kind: BreakKind) -> &mut BreakInterval {
        match kind {
            BreakKind::Smoking => &mut self.smoking_break,
            BreakKind::Lunch => &mut self.lunch_break,
        }
    }

    pub fn has_exited(&self) -> bool {
        self.exit_time.is_some()
    }
}

/// Worked time split for display, e.g. `7h 20m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(fmt = "{}h {}m", hours, minutes)]
pub struct WorkedDuration {
    pub hours: i64,
    pub minutes: i64,
}

impl From<i64> for WorkedDuration {
    fn from(total_minutes: i64) -> Self {
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }
}

pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn break_kind_parses_from_path_segment() {
        assert_eq!(BreakKind::from_str("smoking").unwrap(), BreakKind::Smoking);
        assert_eq!(BreakKind::from_str("lunch").unwrap(), BreakKind::Lunch);
        assert!(BreakKind::from_str("coffee").is_err());
        assert_eq!(BreakKind::iter().count(), 2);
    }

    #[test]
    fn closed_minutes_requires_both_ends() {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap();
        let mut interval = BreakInterval {
            start: Some(start),
            end: None,
        };
        assert!(interval.is_open());
        assert_eq!(interval.closed_minutes(), None);

        interval.end = Some(start + chrono::Duration::seconds(90));
        assert!(!interval.is_open());
        assert_eq!(interval.closed_minutes(), Some(1.5));
    }

    #[test]
    fn worked_duration_formats_hours_and_minutes() {
        assert_eq!(WorkedDuration::from(440).to_string(), "7h 20m");
        assert_eq!(WorkedDuration::from(59).to_string(), "0h 59m");
    }
}
