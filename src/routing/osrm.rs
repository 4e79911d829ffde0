//! OSRM-backed travel-time provider using the Route API.
//!
//! OSRM returns free-flow estimates, so the `depart_at` hint from the trait
//! is accepted but unused. See
//! <http://project-osrm.org/docs/v5.24.0/api/#route-service>.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{GeoPoint, Ms};

use super::{TravelTimeError, TravelTimeProvider};

const DEFAULT_USER_AGENT: &str = concat!("fieldbook/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL for the OSRM service (e.g. `"http://localhost:5000"`).
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl OsrmConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// OSRM Route API response. `code` is `"Ok"` on success; anything else
/// carries an optional error message.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    pub code: String,
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub struct Route {
    /// Fastest-route duration in seconds.
    pub duration: f64,
}

impl RouteResponse {
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

pub struct OsrmTravelTimeProvider {
    client: Client,
    config: OsrmConfig,
}

impl OsrmTravelTimeProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_config(OsrmConfig::new(base_url))
    }

    pub fn with_config(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// `{base_url}/route/v1/driving/{lon},{lat};{lon},{lat}` — OSRM takes
    /// longitude first.
    fn route_url(&self, origin: GeoPoint, destination: GeoPoint) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=false",
            self.config.base_url.trim_end_matches('/'),
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude,
        )
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TravelTimeError {
        if error.is_timeout() {
            return TravelTimeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return TravelTimeError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            };
        }
        TravelTimeError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    fn convert_response(&self, response: RouteResponse) -> Result<Duration, TravelTimeError> {
        if !response.is_ok() {
            if response.code == "NoRoute" {
                return Err(TravelTimeError::NoRoute);
            }
            return Err(TravelTimeError::Service {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }
        let route = response.routes.first().ok_or(TravelTimeError::NoRoute)?;
        // Reject garbage before Duration::from_secs_f64 can panic on it.
        if !route.duration.is_finite() || route.duration < 0.0 {
            return Err(TravelTimeError::Parse {
                message: format!("invalid route duration: {}", route.duration),
            });
        }
        Ok(Duration::from_secs_f64(route.duration))
    }
}

#[async_trait]
impl TravelTimeProvider for OsrmTravelTimeProvider {
    async fn estimate(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        _depart_at: Ms,
    ) -> Result<Duration, TravelTimeError> {
        let url = self.route_url(origin, destination);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let parsed: RouteResponse =
            response
                .json()
                .await
                .map_err(|err| TravelTimeError::Parse {
                    message: err.to_string(),
                })?;

        self.convert_response(parsed)
    }
}
