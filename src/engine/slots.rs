use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use ulid::Ulid;

use crate::config::SchedulingConfig;
use crate::limits::MAX_APPOINTMENT_DURATION_MS;
use crate::model::{AppointmentStatus, Span, DAY_MS, MINUTE_MS};
use crate::observability;
use crate::store::AvailabilityStore;

use super::{now_ms, ScheduleError};

/// Produces the ordered set of bookable windows for one scope and day.
///
/// Read-only: never mutates appointment state.
pub struct SlotGenerator<S> {
    store: Arc<S>,
    config: SchedulingConfig,
}

impl<S: AvailabilityStore> SlotGenerator<S> {
    pub fn new(store: Arc<S>, config: SchedulingConfig) -> Self {
        Self { store, config }
    }

    /// Fixed-length candidate windows for `day`, stepped at the configured
    /// interval, that fit the working hours, start no earlier than now, and
    /// overlap no confirmed appointment or live hold.
    ///
    /// Deterministic for a fixed now; a store failure yields no partial
    /// results.
    pub async fn generate(
        &self,
        day: NaiveDate,
        duration_minutes: i64,
        scope_id: Ulid,
    ) -> Result<Vec<Span>, ScheduleError> {
        self.config.validate()?;
        if duration_minutes <= 0 {
            return Err(ScheduleError::InvalidArgument(
                "duration_minutes must be positive",
            ));
        }
        if duration_minutes * MINUTE_MS > MAX_APPOINTMENT_DURATION_MS {
            return Err(ScheduleError::InvalidArgument("duration_minutes too large"));
        }
        if scope_id.is_nil() {
            return Err(ScheduleError::InvalidArgument("scope_id is required"));
        }

        let day_start = day.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        let work_start = day_start + self.config.work_start_ms();
        let work_end = day_start + self.config.work_end_ms();
        let duration_ms = duration_minutes * MINUTE_MS;
        let step = self.config.slot_step_ms();
        let now = now_ms();

        let started = std::time::Instant::now();
        let blocked: Vec<Span> = self
            .store
            .query_appointments(
                scope_id,
                &[AppointmentStatus::Confirmed, AppointmentStatus::Tentative],
                Span::new(day_start, day_start + DAY_MS),
                now,
            )
            .await?
            .into_iter()
            .map(|appt| appt.span)
            .collect();

        let mut slots = Vec::new();
        let mut start = work_start;
        // Candidates ending past work_end are never emitted, so the walk
        // stops as soon as one no longer fits.
        while start + duration_ms <= work_end {
            let candidate = Span::new(start, start + duration_ms);
            // The past-start filter is unconditional: vacuous for future
            // days, it empties past days and enforces the today rule.
            if start >= now && !blocked.iter().any(|b| b.overlaps(&candidate)) {
                slots.push(candidate);
            }
            start += step;
        }

        metrics::histogram!(observability::SLOT_GENERATION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        metrics::histogram!(observability::SLOTS_PER_QUERY).record(slots.len() as f64);
        debug!(
            %scope_id,
            %day,
            duration_minutes,
            blocked = blocked.len(),
            emitted = slots.len(),
            "generated candidate slots"
        );
        Ok(slots)
    }
}
