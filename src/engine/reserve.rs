use std::sync::Arc;

use tracing::{info, warn};
use ulid::Ulid;

use crate::config::SchedulingConfig;
use crate::limits::MAX_CREATED_BY_LEN;
use crate::model::{Appointment, AppointmentStatus, Ms, Span};
use crate::observability;
use crate::store::{AvailabilityStore, StatusTransition};

use super::{now_ms, validate_span, ScheduleError};

/// Places time-bounded tentative holds and promotes them to confirmed
/// bookings.
///
/// Per-appointment state machine: none → tentative (reserve) → confirmed
/// (confirm). Expiry is never a stored state; a lapsed hold simply stops
/// matching `tentative` for every reader.
pub struct ReservationManager<S> {
    store: Arc<S>,
    config: SchedulingConfig,
}

impl<S: AvailabilityStore> ReservationManager<S> {
    pub fn new(store: Arc<S>, config: SchedulingConfig) -> Self {
        Self { store, config }
    }

    /// Re-validate the window against the job's team scope, then write a
    /// tentative hold expiring after the configured hold duration.
    ///
    /// The conflict check and the insert are not one atomic step. Two
    /// concurrent calls may both pass the check; a store enforcing an
    /// exclusion constraint fails the second insert, otherwise both holds
    /// land and whichever `confirm` runs first wins.
    pub async fn reserve(
        &self,
        job_id: Ulid,
        start: Ms,
        end: Ms,
        created_by: &str,
    ) -> Result<Appointment, ScheduleError> {
        self.config.validate()?;
        if end <= start {
            return Err(ScheduleError::InvalidArgument("end must be after start"));
        }
        let span = Span::new(start, end);
        validate_span(&span)?;
        if created_by.is_empty() || created_by.len() > MAX_CREATED_BY_LEN {
            return Err(ScheduleError::InvalidArgument("created_by must be 1..=128 bytes"));
        }

        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or(ScheduleError::NotFound(job_id))?;

        let now = now_ms();
        let conflicts = self
            .store
            .query_appointments(
                job.team_id,
                &[AppointmentStatus::Confirmed, AppointmentStatus::Tentative],
                span,
                now,
            )
            .await?;
        // Report a confirmed clash in preference to a tentative one: the
        // hold may lapse, the booking will not.
        if let Some(existing) = conflicts
            .iter()
            .find(|appt| appt.status == AppointmentStatus::Confirmed)
            .or_else(|| conflicts.first())
        {
            warn!(%job_id, conflicting = %existing.id, status = existing.status.as_str(), "reserve rejected");
            metrics::counter!(observability::RESERVATIONS_TOTAL, "outcome" => "slot_unavailable")
                .increment(1);
            return Err(ScheduleError::SlotUnavailable {
                conflicting: existing.id,
                held: existing.status == AppointmentStatus::Tentative,
            });
        }

        let appointment = Appointment {
            id: Ulid::new(),
            job_id,
            technician_id: None,
            span,
            status: AppointmentStatus::Tentative,
            hold_expires_at: Some(now + self.config.hold_duration_ms()),
            created_by: created_by.to_string(),
        };
        match self.store.insert_tentative(appointment.clone()).await {
            Ok(_) => {
                info!(
                    appointment = %appointment.id,
                    %job_id,
                    start = span.start,
                    end = span.end,
                    expires_at = ?appointment.hold_expires_at,
                    "hold placed"
                );
                metrics::counter!(observability::RESERVATIONS_TOTAL, "outcome" => "held")
                    .increment(1);
                Ok(appointment)
            }
            Err(err) => {
                let err: ScheduleError = err.into();
                warn!(%job_id, error = %err, "tentative insert rejected");
                metrics::counter!(observability::RESERVATIONS_TOTAL, "outcome" => err.label())
                    .increment(1);
                Err(err)
            }
        }
    }

    /// Promote a live tentative hold to a confirmed booking.
    ///
    /// One conditional write: `status = confirmed, hold cleared` where the
    /// row is still effectively tentative. Zero rows affected (unknown id,
    /// already transitioned, or lapsed hold) fails `Expired`.
    pub async fn confirm(&self, appointment_id: Ulid) -> Result<(), ScheduleError> {
        let rows = self
            .store
            .update_if_status(appointment_id, StatusTransition::confirm(), now_ms())
            .await?;
        if rows == 0 {
            metrics::counter!(observability::CONFIRMATIONS_TOTAL, "outcome" => "expired")
                .increment(1);
            return Err(ScheduleError::Expired(appointment_id));
        }
        info!(appointment = %appointment_id, "booking confirmed");
        metrics::counter!(observability::CONFIRMATIONS_TOTAL, "outcome" => "confirmed")
            .increment(1);
        Ok(())
    }
}
