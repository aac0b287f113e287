//! Turns a raw OpenWeather payload into a [`WeatherReading`] and formats the
//! two clock fields shown on the card.
//!
//! The two clocks deliberately disagree about time zones: `Time` is the
//! location's wall clock, while sunrise and sunset are shown on the viewer's
//! own clock with no location correction.

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Timelike, Utc};
use serde::Deserialize;

use crate::{error::SchemaError, model::WeatherReading};

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: f64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
    // Fetched, never displayed.
    grnd_level: Option<f64>,
    sea_level: Option<f64>,
    temp_max: Option<f64>,
    temp_min: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

/// The live API sends a list of conditions; a bare object is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwConditions {
    One(OwWeather),
    Many(Vec<OwWeather>),
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct OwWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    clouds: OwClouds,
    main: OwMain,
    name: String,
    sys: OwSys,
    timezone: i64,
    weather: OwConditions,
    wind: OwWind,
}

/// Validate `raw` against the current-weather schema and flatten it.
///
/// Nothing is defaulted: a missing or mistyped displayed field is an error,
/// so a malformed payload never yields a partial reading.
pub fn project(raw: &serde_json::Value) -> Result<WeatherReading, SchemaError> {
    let parsed = OwCurrentResponse::deserialize(raw)?;

    let condition = match parsed.weather {
        OwConditions::One(w) => w,
        OwConditions::Many(list) => list.into_iter().next().ok_or(SchemaError::NoConditions)?,
    };

    check_timestamp("sys.sunrise", parsed.sys.sunrise)?;
    check_timestamp("sys.sunset", parsed.sys.sunset)?;
    check_utc_offset(parsed.timezone)?;

    Ok(WeatherReading {
        location: parsed.name,
        country: parsed.sys.country,
        summary: condition.main,
        detail: condition.description,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        wind_speed_mps: parsed.wind.speed,
        cloudiness_pct: parsed.clouds.all,
        utc_offset_secs: parsed.timezone,
        sunrise: parsed.sys.sunrise,
        sunset: parsed.sys.sunset,
    })
}

fn check_timestamp(field: &'static str, unix_secs: i64) -> Result<(), SchemaError> {
    DateTime::<Utc>::from_timestamp(unix_secs, 0)
        .map(|_| ())
        .ok_or(SchemaError::TimestampOutOfRange { field, value: unix_secs })
}

/// A UTC offset must be strictly less than a day either way.
fn check_utc_offset(secs: i64) -> Result<(), SchemaError> {
    i32::try_from(secs)
        .ok()
        .and_then(FixedOffset::east_opt)
        .map(|_| ())
        .ok_or(SchemaError::TimestampOutOfRange { field: "timezone", value: secs })
}

/// Wall-clock `HH:MM` at a location `utc_offset_secs` away from UTC.
///
/// `now` carries the viewer's zone. The viewer's offset is turned into
/// "minutes west of UTC", added to the current instant to get a fake UTC
/// instant, the location offset is added on top, and the hour and minute
/// are then read back in the viewer's zone. When the viewer's offset is the
/// same at both instants this is the location's wall clock; across a
/// viewer-side DST change it is off by the DST delta.
pub fn local_time<Tz: TimeZone>(
    now: &DateTime<Tz>,
    utc_offset_secs: i64,
) -> Result<String, SchemaError> {
    let out_of_range = || SchemaError::TimestampOutOfRange {
        field: "timezone",
        value: utc_offset_secs,
    };

    let minutes_west = -i64::from(now.offset().fix().local_minus_utc()) / 60;
    let utc_ms = now.timestamp_millis() + minutes_west * 60_000;
    let shifted_ms = utc_offset_secs
        .checked_mul(1000)
        .and_then(|offset_ms| utc_ms.checked_add(offset_ms))
        .ok_or_else(out_of_range)?;

    let shifted = DateTime::<Utc>::from_timestamp_millis(shifted_ms)
        .ok_or_else(out_of_range)?
        .with_timezone(&now.timezone());

    Ok(format!("{:02}:{:02}", shifted.hour(), shifted.minute()))
}

/// `HH:MM:SS` of a Unix timestamp on the viewer's clock.
pub fn viewer_clock<Tz: TimeZone>(
    field: &'static str,
    unix_secs: i64,
    viewer: &Tz,
) -> Result<String, SchemaError> {
    let at = DateTime::<Utc>::from_timestamp(unix_secs, 0)
        .ok_or(SchemaError::TimestampOutOfRange { field, value: unix_secs })?
        .with_timezone(viewer);

    Ok(format!("{:02}:{:02}:{:02}", at.hour(), at.minute(), at.second()))
}
