//! Daily attendance state machine.
//!
//! A record moves `NoEntry -> Entered -> Exited`. While `Entered`, the
//! smoking and lunch breaks each move `NotStarted -> Open -> Closed`
//! independently of one another. Transitions are pure: they take the
//! current record by reference and return the next one.

use chrono::{DateTime, NaiveDate, Utc};
use strum::IntoEnumIterator;
use tracing::{info, warn};

use super::error::AttendanceError;
use super::worked_time;
use crate::model::attendance::{AttendanceRecord, BreakKind};
use crate::model::employee::EmployeeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    NoEntry,
    Entered,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakState {
    NotStarted,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entry,
    BreakStart(BreakKind),
    BreakEnd(BreakKind),
    Exit,
}

pub fn day_state(record: Option<&AttendanceRecord>) -> DayState {
    match record {
        None => DayState::NoEntry,
        Some(r) if r.entry_time.is_none() => DayState::NoEntry,
        Some(r) if r.has_exited() => DayState::Exited,
        Some(_) => DayState::Entered,
    }
}

pub fn break_state(record: &AttendanceRecord, kind: BreakKind) -> BreakState {
    let interval = record.break_interval(kind);
    match (interval.start, interval.end) {
        (None, _) => BreakState::NotStarted,
        (Some(_), None) => BreakState::Open,
        (Some(_), Some(_)) => BreakState::Closed,
    }
}

/// Validates `transition` against `current` and returns the resulting record.
pub fn apply(
    current: Option<&AttendanceRecord>,
    employee_id: EmployeeId,
    date: NaiveDate,
    transition: Transition,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AttendanceError> {
    match transition {
        Transition::Entry => register_entry(current, employee_id, date, now),
        Transition::BreakStart(kind) => start_break(entered(current)?, kind, now),
        Transition::BreakEnd(kind) => end_break(entered(current)?, kind, now),
        Transition::Exit => register_exit(entered(current)?, now),
    }
}

fn entered(current: Option<&AttendanceRecord>) -> Result<&AttendanceRecord, AttendanceError> {
    match (day_state(current), current) {
        (DayState::Entered, Some(record)) => Ok(record),
        (DayState::Exited, _) => Err(AttendanceError::AlreadyExited),
        _ => Err(AttendanceError::NoEntryYet),
    }
}

fn entry_time(record: &AttendanceRecord) -> Result<DateTime<Utc>, AttendanceError> {
    record.entry_time.ok_or(AttendanceError::NoEntryYet)
}

fn register_entry(
    current: Option<&AttendanceRecord>,
    employee_id: EmployeeId,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AttendanceError> {
    if day_state(current) != DayState::NoEntry {
        return Err(AttendanceError::AlreadyRegistered);
    }

    let mut record = current
        .cloned()
        .unwrap_or_else(|| AttendanceRecord::new(employee_id, date));
    record.entry_time = Some(now);
    Ok(record)
}

fn start_break(
    current: &AttendanceRecord,
    kind: BreakKind,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AttendanceError> {
    if break_state(current, kind) != BreakState::NotStarted {
        return Err(AttendanceError::BreakAlreadyStarted(kind));
    }
    if now < entry_time(current)? {
        return Err(AttendanceError::OutOfOrder);
    }

    let mut record = current.clone();
    record.break_interval_mut(kind).start = Some(now);
    Ok(record)
}

fn end_break(
    current: &AttendanceRecord,
    kind: BreakKind,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AttendanceError> {
    let started_at = match (break_state(current, kind), current.break_interval(kind).start) {
        (BreakState::NotStarted, _) | (_, None) => {
            return Err(AttendanceError::BreakNotStarted(kind));
        }
        (BreakState::Closed, _) => return Err(AttendanceError::BreakAlreadyEnded(kind)),
        (BreakState::Open, Some(start)) => start,
    };
    if now < started_at {
        return Err(AttendanceError::OutOfOrder);
    }

    let mut record = current.clone();
    record.break_interval_mut(kind).end = Some(now);
    Ok(record)
}

fn register_exit(
    current: &AttendanceRecord,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AttendanceError> {
    let entry = entry_time(current)?;
    if now < entry {
        return Err(AttendanceError::OutOfOrder);
    }

    for kind in BreakKind::iter().filter(|k| current.break_interval(*k).is_open()) {
        info!(employee_id = current.employee_id, %kind, "Exit with an open break, not deducted");
    }

    let worked = worked_time::compute(entry, now, &[current.smoking_break, current.lunch_break]);
    if worked.clamped {
        warn!(
            employee_id = current.employee_id,
            date = %current.date,
            "Worked time came out negative; stored as zero"
        );
    }

    let mut record = current.clone();
    record.exit_time = Some(now);
    record.total_worked_minutes = Some(worked.minutes);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const EMPLOYEE: EmployeeId = 7;

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn step(
        current: Option<&AttendanceRecord>,
        transition: Transition,
        at: i64,
    ) -> Result<AttendanceRecord, AttendanceError> {
        apply(current, EMPLOYEE, date(), transition, t(at))
    }

    fn entered_at_zero() -> AttendanceRecord {
        step(None, Transition::Entry, 0).unwrap()
    }

    #[test]
    fn entry_creates_record_for_the_day() {
        let record = entered_at_zero();
        assert_eq!(record.employee_id, EMPLOYEE);
        assert_eq!(record.date, date());
        assert_eq!(record.entry_time, Some(t(0)));
        assert_eq!(day_state(Some(&record)), DayState::Entered);
    }

    #[test]
    fn second_entry_is_rejected() {
        let record = entered_at_zero();
        assert_eq!(
            step(Some(&record), Transition::Entry, 5),
            Err(AttendanceError::AlreadyRegistered)
        );
    }

    #[test]
    fn breaks_require_entry() {
        for kind in [BreakKind::Smoking, BreakKind::Lunch] {
            assert_eq!(
                step(None, Transition::BreakStart(kind), 0),
                Err(AttendanceError::NoEntryYet)
            );
            assert_eq!(
                step(None, Transition::BreakEnd(kind), 0),
                Err(AttendanceError::NoEntryYet)
            );
        }
        assert_eq!(step(None, Transition::Exit, 0), Err(AttendanceError::NoEntryYet));
    }

    #[test]
    fn break_sub_machines_are_independent() {
        let record = entered_at_zero();
        let record = step(Some(&record), Transition::BreakStart(BreakKind::Lunch), 60).unwrap();
        let record = step(Some(&record), Transition::BreakStart(BreakKind::Smoking), 70).unwrap();
        let record = step(Some(&record), Transition::BreakEnd(BreakKind::Lunch), 90).unwrap();

        assert_eq!(break_state(&record, BreakKind::Smoking), BreakState::Open);
        assert_eq!(break_state(&record, BreakKind::Lunch), BreakState::Closed);

        let record = step(Some(&record), Transition::BreakEnd(BreakKind::Smoking), 95).unwrap();
        assert_eq!(break_state(&record, BreakKind::Smoking), BreakState::Closed);
    }

    #[test]
    fn repeated_break_transitions_fail() {
        let record = entered_at_zero();
        let record = step(Some(&record), Transition::BreakStart(BreakKind::Smoking), 10).unwrap();
        assert_eq!(
            step(Some(&record), Transition::BreakStart(BreakKind::Smoking), 11),
            Err(AttendanceError::BreakAlreadyStarted(BreakKind::Smoking))
        );

        let record = step(Some(&record), Transition::BreakEnd(BreakKind::Smoking), 20).unwrap();
        assert_eq!(
            step(Some(&record), Transition::BreakEnd(BreakKind::Smoking), 21),
            Err(AttendanceError::BreakAlreadyEnded(BreakKind::Smoking))
        );
        assert_eq!(
            step(Some(&record), Transition::BreakStart(BreakKind::Smoking), 22),
            Err(AttendanceError::BreakAlreadyStarted(BreakKind::Smoking))
        );
    }

    #[test]
    fn end_without_start_is_rejected() {
        let record = entered_at_zero();
        assert_eq!(
            step(Some(&record), Transition::BreakEnd(BreakKind::Smoking), 10),
            Err(AttendanceError::BreakNotStarted(BreakKind::Smoking))
        );
    }

    #[test]
    fn timestamps_before_their_predecessor_are_rejected() {
        let record = step(None, Transition::Entry, 30).unwrap();
        assert_eq!(
            step(Some(&record), Transition::BreakStart(BreakKind::Lunch), 20),
            Err(AttendanceError::OutOfOrder)
        );
        assert_eq!(
            step(Some(&record), Transition::Exit, 10),
            Err(AttendanceError::OutOfOrder)
        );

        let record = step(Some(&record), Transition::BreakStart(BreakKind::Lunch), 60).unwrap();
        assert_eq!(
            step(Some(&record), Transition::BreakEnd(BreakKind::Lunch), 59),
            Err(AttendanceError::OutOfOrder)
        );
    }

    #[test]
    fn exit_computes_worked_minutes_once() {
        let record = entered_at_zero();
        let record = step(Some(&record), Transition::BreakStart(BreakKind::Lunch), 60).unwrap();
        let record = step(Some(&record), Transition::BreakEnd(BreakKind::Lunch), 90).unwrap();
        let record = step(Some(&record), Transition::Exit, 480).unwrap();

        assert_eq!(record.exit_time, Some(t(480)));
        assert_eq!(record.total_worked_minutes, Some(450));
        assert_eq!(day_state(Some(&record)), DayState::Exited);
        assert_eq!(
            step(Some(&record), Transition::Exit, 500),
            Err(AttendanceError::AlreadyExited)
        );
    }

    #[test]
    fn exit_with_open_break_succeeds_and_freezes_the_record() {
        let record = entered_at_zero();
        let record = step(Some(&record), Transition::BreakStart(BreakKind::Smoking), 100).unwrap();
        let record = step(Some(&record), Transition::Exit, 300).unwrap();

        assert_eq!(record.total_worked_minutes, Some(300));
        assert_eq!(
            step(Some(&record), Transition::BreakEnd(BreakKind::Smoking), 310),
            Err(AttendanceError::AlreadyExited)
        );
        assert_eq!(
            step(Some(&record), Transition::BreakStart(BreakKind::Lunch), 310),
            Err(AttendanceError::AlreadyExited)
        );
        assert_eq!(
            step(Some(&record), Transition::Entry, 310),
            Err(AttendanceError::AlreadyRegistered)
        );
    }
}
