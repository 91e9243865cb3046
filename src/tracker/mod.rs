//! Daily attendance tracking: one record per employee per local day.

pub mod clock;
pub mod error;
pub mod state;
pub mod worked_time;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, instrument};

use crate::model::attendance::{AttendanceRecord, BreakKind};
use crate::model::employee::EmployeeId;
use crate::store::{EmployeeDirectory, RecordStore, StoreError};

pub use clock::{Clock, SystemClock};
pub use error::AttendanceError;
use state::Transition;

/// Read-validate-write attempts before a contended key gives up.
const MAX_ATTEMPTS: usize = 8;

#[derive(Clone)]
pub struct DailyAttendanceTracker {
    records: Arc<dyn RecordStore>,
    directory: Arc<dyn EmployeeDirectory>,
    timezone: Tz,
}

impl DailyAttendanceTracker {
    pub fn new(
        records: Arc<dyn RecordStore>,
        directory: Arc<dyn EmployeeDirectory>,
        timezone: Tz,
    ) -> Self {
        Self {
            records,
            directory,
            timezone,
        }
    }

    /// Calendar day `now` falls on in the tracker's timezone.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    pub async fn register_entry(
        &self,
        employee_id: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.transition(employee_id, Transition::Entry, now).await
    }

    pub async fn start_break(
        &self,
        employee_id: EmployeeId,
        kind: BreakKind,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.transition(employee_id, Transition::BreakStart(kind), now)
            .await
    }

    pub async fn end_break(
        &self,
        employee_id: EmployeeId,
        kind: BreakKind,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.transition(employee_id, Transition::BreakEnd(kind), now)
            .await
    }

    pub async fn register_exit(
        &self,
        employee_id: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.transition(employee_id, Transition::Exit, now).await
    }

    pub async fn get_today(
        &self,
        employee_id: EmployeeId,
        today: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceError> {
        Ok(self
            .records
            .get(employee_id, today)
            .await?
            .map(|stored| stored.record))
    }

    async fn ensure_active(&self, employee_id: EmployeeId) -> Result<(), AttendanceError> {
        match self.directory.get(employee_id).await? {
            None => Err(AttendanceError::EmployeeNotFound),
            Some(employee) if !employee.is_active => Err(AttendanceError::EmployeeInactive),
            Some(_) => Ok(()),
        }
    }

    #[instrument(name = "attendance_transition", skip(self), fields(date = tracing::field::Empty))]
    async fn transition(
        &self,
        employee_id: EmployeeId,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.ensure_active(employee_id).await?;

        let date = self.local_date(now);
        tracing::Span::current().record("date", tracing::field::display(date));

        for attempt in 1..=MAX_ATTEMPTS {
            let current = self.records.get(employee_id, date).await?;
            let (record, version) = match &current {
                Some(stored) => (Some(&stored.record), Some(stored.version)),
                None => (None, None),
            };

            let next = state::apply(record, employee_id, date, transition, now)?;

            match self.records.put(&next, version).await {
                Ok(new_version) => {
                    info!(version = new_version, "Attendance updated");
                    return Ok(next);
                }
                Err(StoreError::Conflict) => {
                    debug!(attempt, "Concurrent attendance write, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AttendanceError::StoreUnavailable(format!(
            "gave up after {} conflicting writes",
            MAX_ATTEMPTS
        )))
    }
}
