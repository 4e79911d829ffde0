//! The three operational components: slot generation, reservation with
//! time-bounded holds, and advisory travel-time checking.
//!
//! Each operation is a short-lived unit of work; all cross-call
//! coordination happens through the shared
//! [`AvailabilityStore`](crate::store::AvailabilityStore). Nothing here
//! spawns background work: hold expiry is a predicate evaluated at read
//! time, never a timer.

mod advisor;
mod error;
mod reserve;
mod slots;

pub use advisor::TravelTimeAdvisor;
pub use error::ScheduleError;
pub use reserve::ReservationManager;
pub use slots::SlotGenerator;

use crate::limits::{
    MAX_APPOINTMENT_DURATION_MS, MAX_VALID_TIMESTAMP_MS, MIN_VALID_TIMESTAMP_MS,
};
use crate::model::{Ms, Span};

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

pub(crate) fn validate_span(span: &Span) -> Result<(), ScheduleError> {
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(ScheduleError::InvalidArgument("timestamp out of range"));
    }
    if span.duration_ms() > MAX_APPOINTMENT_DURATION_MS {
        return Err(ScheduleError::InvalidArgument("appointment span too wide"));
    }
    Ok(())
}
