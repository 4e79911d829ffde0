use std::sync::Arc;

use tracing::debug;
use ulid::Ulid;

use crate::config::SchedulingConfig;
use crate::limits::ADJACENCY_WINDOW_MS;
use crate::model::{
    gap_minutes, Appointment, AppointmentStatus, GeoPoint, Ms, Span, Warning, WarningKind,
};
use crate::observability;
use crate::routing::TravelTimeProvider;
use crate::store::AvailabilityStore;

use super::{now_ms, validate_span, ScheduleError};

const NO_LOCATION_MSG: &str =
    "Travel time could not be calculated for this appointment.";
const NO_CONFLICT_MSG: &str = "No travel-time conflicts detected.";

/// Classifies the gaps around a proposed appointment against estimated
/// drive times. Advisory only: its output is text shown next to the
/// booking form, never a gate.
///
/// Fail-open: a provider failure silently drops that pair's check, and a
/// total provider outage degrades to "no conflicts detected".
pub struct TravelTimeAdvisor<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
    config: SchedulingConfig,
}

impl<S: AvailabilityStore, P: TravelTimeProvider> TravelTimeAdvisor<S, P> {
    pub fn new(store: Arc<S>, provider: Arc<P>, config: SchedulingConfig) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Check the proposed window against the technician's nearest confirmed
    /// appointments on either side.
    ///
    /// Returns at least one warning: real findings, or a single `Ok` entry
    /// when nothing is wrong or nothing could be evaluated.
    pub async fn check_conflicts(
        &self,
        technician_id: Ulid,
        job_id: Ulid,
        proposed_start: Ms,
        proposed_end: Ms,
    ) -> Result<Vec<Warning>, ScheduleError> {
        if proposed_end <= proposed_start {
            return Err(ScheduleError::InvalidArgument("end must be after start"));
        }
        let proposed = Span::new(proposed_start, proposed_end);
        validate_span(&proposed)?;

        let Some(new_point) = self.job_point(job_id).await? else {
            metrics::counter!(observability::TRAVEL_CHECKS_TOTAL, "outcome" => "unresolvable")
                .increment(1);
            return Ok(vec![Warning::ok(NO_LOCATION_MSG)]);
        };

        let now = now_ms();
        let search = Span::new(
            proposed.start - ADJACENCY_WINDOW_MS,
            proposed.end + ADJACENCY_WINDOW_MS,
        );
        let confirmed = self
            .store
            .query_appointments(technician_id, &[AppointmentStatus::Confirmed], search, now)
            .await?;

        // Half-open spans: an appointment ending exactly at the proposal's
        // start lies entirely before it, so <= / >= are the strict bounds.
        let previous = confirmed
            .iter()
            .filter(|appt| appt.span.end <= proposed.start)
            .max_by_key(|appt| appt.span.end);
        let next = confirmed
            .iter()
            .filter(|appt| appt.span.start >= proposed.end)
            .min_by_key(|appt| appt.span.start);

        let mut warnings = Vec::new();

        if let Some(prev) = previous {
            if let Some(prev_point) = self.appointment_point(prev).await? {
                if let Some(warning) = self
                    .assess_leg(
                        prev_point,
                        new_point,
                        prev.span.end,
                        proposed.start,
                        "from the previous appointment",
                    )
                    .await
                {
                    warnings.push(warning);
                }
            }
        }

        if let Some(next) = next {
            if let Some(next_point) = self.appointment_point(next).await? {
                if let Some(warning) = self
                    .assess_leg(
                        new_point,
                        next_point,
                        proposed.end,
                        next.span.start,
                        "to the next appointment",
                    )
                    .await
                {
                    warnings.push(warning);
                }
            }
        }

        if warnings.is_empty() {
            warnings.push(Warning::ok(NO_CONFLICT_MSG));
        }
        let worst = if warnings.iter().any(|w| w.kind == WarningKind::Conflict) {
            "conflict"
        } else if warnings.iter().any(|w| w.kind == WarningKind::Tight) {
            "tight"
        } else {
            "ok"
        };
        metrics::counter!(observability::TRAVEL_CHECKS_TOTAL, "outcome" => worst).increment(1);
        Ok(warnings)
    }

    /// Drive-time verdict for one adjacency pair: departing at `depart_at`,
    /// due at the destination by `arrive_by`. Provider failures absorb to
    /// `None` and the pair simply goes unchecked.
    async fn assess_leg(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        depart_at: Ms,
        arrive_by: Ms,
        direction: &str,
    ) -> Option<Warning> {
        let estimate = match self.provider.estimate(origin, destination, depart_at).await {
            Ok(duration) => duration,
            Err(err) => {
                debug!(error = %err, direction, "travel estimate unavailable, skipping pair");
                metrics::counter!(observability::TRAVEL_PROVIDER_FAILURES_TOTAL).increment(1);
                return None;
            }
        };
        // Drive time rounds up, the gap rounds down: the buffer errs on
        // the side of the technician arriving late.
        let required = estimate.as_secs().div_ceil(60) as i64;
        let available = gap_minutes(depart_at, arrive_by);

        if available < required {
            Some(Warning {
                kind: WarningKind::Conflict,
                message: format!(
                    "Not enough time to drive {direction}: {required} min needed, {available} min available."
                ),
                required_minutes: Some(required),
                available_minutes: Some(available),
            })
        } else if available < required + self.config.tight_buffer_minutes {
            Some(Warning {
                kind: WarningKind::Tight,
                message: format!(
                    "Travel {direction} is tight: {required} min needed, {available} min available."
                ),
                required_minutes: Some(required),
                available_minutes: Some(available),
            })
        } else {
            None
        }
    }

    /// Proposed job → location → coordinates. Any missing link means the
    /// whole check is unevaluable (fail-open, not an error).
    async fn job_point(&self, job_id: Ulid) -> Result<Option<GeoPoint>, ScheduleError> {
        let Some(job) = self.store.get_job(job_id).await? else {
            return Ok(None);
        };
        let Some(location_id) = job.location_id else {
            return Ok(None);
        };
        Ok(self
            .store
            .get_location(location_id)
            .await?
            .and_then(|location| location.point))
    }

    async fn appointment_point(
        &self,
        appointment: &Appointment,
    ) -> Result<Option<GeoPoint>, ScheduleError> {
        self.job_point(appointment.job_id).await
    }
}
