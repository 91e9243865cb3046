use chrono::{DateTime, Utc};

use crate::model::attendance::{BreakInterval, minutes_between};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkedTime {
    pub minutes: i64,
    /// Set when the raw figure was negative and got floored to zero.
    pub clamped: bool,
}

/// Exit minus entry, less every closed break, rounded to the nearest
/// minute and floored at zero. Open breaks deduct nothing.
pub fn compute(entry: DateTime<Utc>, exit: DateTime<Utc>, breaks: &[BreakInterval]) -> WorkedTime {
    let mut raw = minutes_between(entry, exit);
    for interval in breaks {
        if let Some(minutes) = interval.closed_minutes() {
            raw -= minutes;
        }
    }

    let rounded = raw.round() as i64;
    if rounded < 0 {
        WorkedTime {
            minutes: 0,
            clamped: true,
        }
    } else {
        WorkedTime {
            minutes: rounded,
            clamped: false,
        }
    }
}
