//! OpenWeatherMap current-conditions client.
//!
//! One blocking GET per call, no retries, no caching. The caller only ever
//! sees a well-formed `TemperatureRecord` or a typed `ApiError`.
//!
//! API documentation: https://openweathermap.org/current

use crate::structs::TemperatureRecord;
use chrono::DateTime;
use log::debug;
use serde::Deserialize;

const OWM_BASE_URL: &str = "https://api.openweathermap.org";

/// City used by `ApiSession::validate` to probe whether a key is accepted.
const KEY_PROBE_CITY: &str = "Moscow";

// ============================================================================
// API Response Structures
// ============================================================================

/// Current weather response from OpenWeatherMap (the fields we consume).
#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub name: String,
    /// Observation time, unix seconds UTC
    pub dt: i64,
    pub main: MainConditions,
}

#[derive(Debug, Deserialize)]
pub struct MainConditions {
    pub temp: f64,
}

// ============================================================================
// Error type
// ============================================================================

/// Errors that can arise when fetching current conditions.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The API rejected the key (HTTP 401).
    #[error("API key rejected")]
    InvalidKey,
    /// The requested city is unknown to the API (HTTP 404).
    #[error("City not found: {0}")]
    CityNotFound(String),
    /// Too many requests for the key's quota (HTTP 429).
    #[error("Rate limited by the weather API")]
    RateLimited,
    /// Transport failure or an unexpected HTTP status.
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    /// HTTP 200 but the body did not match the expected shape.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetch the current temperature for a city.
///
/// # Parameters
/// - `client`: HTTP client
/// - `city`: city name as understood by OpenWeatherMap (e.g., "Paris")
/// - `api_key`: OpenWeatherMap API key
///
/// # Returns
/// A live `TemperatureRecord` with the season derived from the observation
/// timestamp, or a typed error for every non-200 outcome.
pub fn fetch_current(
    client: &reqwest::blocking::Client,
    city: &str,
    api_key: &str,
) -> Result<TemperatureRecord, ApiError> {
    fetch_current_at(client, OWM_BASE_URL, city, api_key)
}

/// Same as `fetch_current` but against an explicit base URL.
pub fn fetch_current_at(
    client: &reqwest::blocking::Client,
    base_url: &str,
    city: &str,
    api_key: &str,
) -> Result<TemperatureRecord, ApiError> {
    let url = format!("{}/data/2.5/weather", base_url);

    let response = client
        .get(&url)
        .query(&[("q", city), ("appid", api_key), ("units", "metric")])
        .send()
        .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(map_status(status, city));
    }

    let body: CurrentWeatherResponse = response
        .json()
        .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

    record_from_response(body)
}

/// Maps a non-200 status to its typed error.
fn map_status(status: u16, city: &str) -> ApiError {
    match status {
        401 => ApiError::InvalidKey,
        404 => ApiError::CityNotFound(city.to_string()),
        429 => ApiError::RateLimited,
        other => ApiError::NetworkFailure(format!("HTTP {}", other)),
    }
}

/// Builds a live record from a decoded response body.
fn record_from_response(body: CurrentWeatherResponse) -> Result<TemperatureRecord, ApiError> {
    let date = DateTime::from_timestamp(body.dt, 0)
        .ok_or_else(|| ApiError::MalformedResponse(format!("dt out of range: {}", body.dt)))?
        .date_naive();
    Ok(TemperatureRecord::new(body.name, date, body.main.temp))
}

// ============================================================================
// Session
// ============================================================================

/// One interactive session's API state: the key and whether the last probe
/// accepted it. Passed explicitly to whoever needs the live reading rather
/// than living in process-global state.
pub struct ApiSession {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    validated: bool,
}

impl ApiSession {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: OWM_BASE_URL.to_string(),
            api_key,
            validated: false,
        }
    }

    /// Probes the API with a fixed city and records whether the key was
    /// accepted. A rejected key yields `Ok(false)`, not an error; transport
    /// failures still surface as `NetworkFailure`.
    pub fn validate(&mut self) -> Result<bool, ApiError> {
        let result = fetch_current_at(&self.client, &self.base_url, KEY_PROBE_CITY, &self.api_key);
        self.validated = match result {
            Ok(_) => true,
            Err(ApiError::InvalidKey) => false,
            // the probe city is fixed, so any other failure is not the key's fault
            Err(e) => {
                debug!("Key probe failed without verdict: {}", e);
                return Err(e);
            }
        };
        Ok(self.validated)
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Fetches the current temperature for `city` with this session's key.
    pub fn current(&self, city: &str) -> Result<TemperatureRecord, ApiError> {
        fetch_current_at(&self.client, &self.base_url, city, &self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::Season;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(401, "Paris"), ApiError::InvalidKey);
        assert_eq!(
            map_status(404, "Atlantis"),
            ApiError::CityNotFound("Atlantis".to_string())
        );
        assert_eq!(map_status(429, "Paris"), ApiError::RateLimited);
        assert_eq!(
            map_status(500, "Paris"),
            ApiError::NetworkFailure("HTTP 500".to_string())
        );
    }

    #[test]
    fn test_record_from_response_derives_season() {
        let body: CurrentWeatherResponse = serde_json::from_str(
            r#"{"name": "Paris", "dt": 1704067200, "main": {"temp": 4.2}}"#,
        )
        .unwrap();
        let record = record_from_response(body).unwrap();
        assert_eq!(record.city, "Paris");
        assert_eq!(record.temperature, 4.2);
        // 1704067200 = 2024-01-01T00:00:00Z
        assert_eq!(record.season, Season::Winter);
    }

    #[test]
    fn test_extra_response_fields_are_ignored() {
        let body: std::result::Result<CurrentWeatherResponse, _> = serde_json::from_str(
            r#"{"name": "Paris", "dt": 1704067200, "main": {"temp": 4.2, "humidity": 87}, "wind": {"speed": 3.1}}"#,
        );
        assert!(body.is_ok());
    }

    #[test]
    fn test_out_of_range_timestamp_is_malformed() {
        let body = CurrentWeatherResponse {
            name: "Paris".to_string(),
            dt: i64::MAX,
            main: MainConditions { temp: 4.2 },
        };
        assert!(matches!(
            record_from_response(body),
            Err(ApiError::MalformedResponse(_))
        ));
    }
}
