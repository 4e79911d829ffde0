use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const HOUR_MS: Ms = 3_600_000;
pub const DAY_MS: Ms = 86_400_000;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    #[allow(dead_code)]
    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }
}

/// Whole minutes between two instants, rounded down. Negative gaps clamp to 0.
pub fn gap_minutes(from: Ms, to: Ms) -> i64 {
    ((to - from).max(0)) / MINUTE_MS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Tentative,
    Confirmed,
    Completed,
    Canceled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tentative => "tentative",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::NoShow => "no_show",
        }
    }
}

/// A scheduled (or provisionally held) visit for a job.
///
/// `hold_expires_at` is meaningful only while the status is `Tentative`.
/// A tentative appointment past its expiry is logically dead: it no longer
/// blocks anything, even before a janitor physically removes the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Ulid,
    pub job_id: Ulid,
    /// Unassigned until dispatch picks a technician.
    pub technician_id: Option<Ulid>,
    pub span: Span,
    pub status: AppointmentStatus,
    pub hold_expires_at: Option<Ms>,
    pub created_by: String,
}

impl Appointment {
    /// Does this appointment block overlapping slots at `now`?
    ///
    /// Confirmed always blocks. Tentative blocks only while its hold is
    /// alive. Completed/canceled/no-show never block.
    pub fn blocks(&self, now: Ms) -> bool {
        match self.status {
            AppointmentStatus::Confirmed => true,
            AppointmentStatus::Tentative => self.hold_expires_at.is_some_and(|exp| exp > now),
            _ => false,
        }
    }

    pub fn is_expired_hold(&self, now: Ms) -> bool {
        self.status == AppointmentStatus::Tentative
            && self.hold_expires_at.is_none_or(|exp| exp <= now)
    }
}

/// A unit of field work to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Ulid,
    pub team_id: Ulid,
    pub location_id: Option<Ulid>,
    pub estimated_duration_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where a job happens. A missing point means travel time is unavailable
/// for appointments at this location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLocation {
    pub id: Ulid,
    pub customer_id: Ulid,
    pub team_id: Ulid,
    pub point: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Conflict,
    Tight,
    Ok,
}

/// Advisory output of the travel-time check. Never blocks a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub required_minutes: Option<i64>,
    pub available_minutes: Option<i64>,
}

impl Warning {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Ok,
            message: message.into(),
            required_minutes: None,
            available_minutes: None,
        }
    }
}
