use serde::{Deserialize, Serialize};

use crate::engine::ScheduleError;
use crate::model::{Ms, HOUR_MS, MINUTE_MS};

/// Scheduling knobs, passed explicitly to each component at construction.
///
/// Working hours are whole hours on the business's clock; days handed to
/// the slot generator are interpreted on that same clock (UTC here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub slot_interval_minutes: i64,
    pub hold_duration_minutes: i64,
    pub tight_buffer_minutes: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            work_start_hour: 8,
            work_end_hour: 18,
            slot_interval_minutes: 30,
            hold_duration_minutes: 10,
            tight_buffer_minutes: 15,
        }
    }
}

impl SchedulingConfig {
    #[must_use]
    pub fn with_work_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.work_start_hour = start_hour;
        self.work_end_hour = end_hour;
        self
    }

    #[must_use]
    pub fn with_slot_interval_minutes(mut self, minutes: i64) -> Self {
        self.slot_interval_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_hold_duration_minutes(mut self, minutes: i64) -> Self {
        self.hold_duration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_tight_buffer_minutes(mut self, minutes: i64) -> Self {
        self.tight_buffer_minutes = minutes;
        self
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.work_end_hour > 24 {
            return Err(ScheduleError::InvalidArgument("work_end_hour past 24"));
        }
        if self.work_start_hour >= self.work_end_hour {
            return Err(ScheduleError::InvalidArgument(
                "work_start_hour must precede work_end_hour",
            ));
        }
        if self.slot_interval_minutes <= 0 {
            return Err(ScheduleError::InvalidArgument(
                "slot_interval_minutes must be positive",
            ));
        }
        if self.hold_duration_minutes <= 0 {
            return Err(ScheduleError::InvalidArgument(
                "hold_duration_minutes must be positive",
            ));
        }
        if self.tight_buffer_minutes < 0 {
            return Err(ScheduleError::InvalidArgument(
                "tight_buffer_minutes must not be negative",
            ));
        }
        Ok(())
    }

    pub fn work_start_ms(&self) -> Ms {
        Ms::from(self.work_start_hour) * HOUR_MS
    }

    pub fn work_end_ms(&self) -> Ms {
        Ms::from(self.work_end_hour) * HOUR_MS
    }

    pub fn slot_step_ms(&self) -> Ms {
        self.slot_interval_minutes * MINUTE_MS
    }

    pub fn hold_duration_ms(&self) -> Ms {
        self.hold_duration_minutes * MINUTE_MS
    }
}
