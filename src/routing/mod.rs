//! Travel-time lookup behind a single-method collaborator, so any routing
//! backend can be substituted without touching conflict logic.

mod osrm;

pub use osrm::{OsrmConfig, OsrmTravelTimeProvider, Route, RouteResponse};

use std::time::Duration;

use async_trait::async_trait;

use crate::model::{GeoPoint, Ms};

#[derive(Debug, Clone, PartialEq)]
pub enum TravelTimeError {
    Timeout { url: String, timeout_secs: u64 },
    Http { url: String, status: u16 },
    Network { url: String, message: String },
    Service { code: String, message: String },
    Parse { message: String },
    NoRoute,
}

impl std::fmt::Display for TravelTimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelTimeError::Timeout { url, timeout_secs } => {
                write!(f, "routing request to {url} timed out after {timeout_secs}s")
            }
            TravelTimeError::Http { url, status } => {
                write!(f, "routing request to {url} failed with HTTP {status}")
            }
            TravelTimeError::Network { url, message } => {
                write!(f, "routing request to {url} failed: {message}")
            }
            TravelTimeError::Service { code, message } => {
                write!(f, "routing service error {code}: {message}")
            }
            TravelTimeError::Parse { message } => {
                write!(f, "unparseable routing response: {message}")
            }
            TravelTimeError::NoRoute => write!(f, "no route between the given points"),
        }
    }
}

impl std::error::Error for TravelTimeError {}

/// Estimate drive time between two points, departing at `depart_at`.
///
/// Backends without traffic awareness may ignore `depart_at` and return a
/// free-flow estimate.
#[async_trait]
pub trait TravelTimeProvider: Send + Sync {
    async fn estimate(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        depart_at: Ms,
    ) -> Result<Duration, TravelTimeError>;
}
