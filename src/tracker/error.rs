use crate::model::attendance::BreakKind;
use crate::store::StoreError;

/// Rejections produced by the attendance tracker.
///
/// Every variant is recoverable by the caller; only `StoreUnavailable`
/// is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceError {
    #[error("No entry has been registered today")]
    NoEntryYet,

    #[error("Entry already registered today")]
    AlreadyRegistered,

    #[error("Exit already registered today")]
    AlreadyExited,

    #[error("The {0} break has already started")]
    BreakAlreadyStarted(BreakKind),

    #[error("The {0} break has already ended")]
    BreakAlreadyEnded(BreakKind),

    #[error("The {0} break has not started")]
    BreakNotStarted(BreakKind),

    #[error("Timestamp is earlier than the event it must follow")]
    OutOfOrder,

    #[error("Employee not found")]
    EmployeeNotFound,

    #[error("Employee is inactive")]
    EmployeeInactive,

    #[error("Attendance store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AttendanceError {
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<StoreError> for AttendanceError {
    fn from(e: StoreError) -> Self {
        AttendanceError::StoreUnavailable(e.to_string())
    }
}
