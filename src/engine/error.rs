use ulid::Ulid;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ScheduleError {
    /// Malformed input. Never auto-retried.
    InvalidArgument(&'static str),
    /// Referenced job is missing.
    NotFound(Ulid),
    /// The requested window conflicts with an existing appointment.
    /// `held` distinguishes another customer's live hold from a confirmed
    /// booking. Remediation: regenerate slots and reselect.
    SlotUnavailable { conflicting: Ulid, held: bool },
    /// Confirm arrived after the hold lapsed (or the row already
    /// transitioned). Benign; same remediation as `SlotUnavailable`.
    Expired(Ulid),
    /// Transient store failure. Safe to retry with backoff.
    StoreUnavailable(String),
}

impl ScheduleError {
    /// Metric label for the failure class.
    pub fn label(&self) -> &'static str {
        match self {
            ScheduleError::InvalidArgument(_) => "invalid_argument",
            ScheduleError::NotFound(_) => "not_found",
            ScheduleError::SlotUnavailable { .. } => "slot_unavailable",
            ScheduleError::Expired(_) => "expired",
            ScheduleError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// The remediation line a booking UI should show.
    pub fn user_message(&self) -> &'static str {
        match self {
            ScheduleError::SlotUnavailable { .. } | ScheduleError::Expired(_) => {
                "That time is no longer available. Please pick another slot."
            }
            ScheduleError::StoreUnavailable(_) => {
                "Something went wrong on our side. Please try again in a moment."
            }
            ScheduleError::InvalidArgument(_) | ScheduleError::NotFound(_) => {
                "We couldn't process that request."
            }
        }
    }
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            ScheduleError::NotFound(id) => write!(f, "job not found: {id}"),
            ScheduleError::SlotUnavailable { conflicting, held } => {
                if *held {
                    write!(f, "slot is held by another customer ({conflicting})")
                } else {
                    write!(f, "slot is already booked ({conflicting})")
                }
            }
            ScheduleError::Expired(id) => write!(f, "hold expired for appointment {id}"),
            ScheduleError::StoreUnavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<StoreError> for ScheduleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ScheduleError::StoreUnavailable(msg),
            // An exclusion constraint fired: someone else's hold or booking
            // landed first.
            StoreError::Conflict(id) => ScheduleError::SlotUnavailable {
                conflicting: id,
                held: true,
            },
        }
    }
}
