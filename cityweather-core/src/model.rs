use serde::{Deserialize, Serialize};

/// Flat snapshot of one successful current-weather response.
///
/// Built only by [`crate::projector::project`]; every numeric field is the
/// upstream value unchanged (metric units: °C, %, hPa, m/s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location: String,
    pub country: String,
    pub summary: String,
    pub detail: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub cloudiness_pct: f64,
    /// Shift from UTC at the location, in seconds. Negative west of Greenwich.
    pub utc_offset_secs: i64,
    /// Unix seconds.
    pub sunrise: i64,
    /// Unix seconds.
    pub sunset: i64,
}
