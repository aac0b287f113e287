use chrono::{DateTime, TimeZone};
use cityweather_core::{SchemaError, WeatherReading, local_time, viewer_clock};

/// Plain-text weather card.
///
/// `Time` is the location's wall clock; `Sunrise` and `Sunset` are on the
/// viewer's clock taken from `now`.
pub fn render_card<Tz: TimeZone>(
    reading: &WeatherReading,
    now: &DateTime<Tz>,
) -> Result<String, SchemaError> {
    let viewer = now.timezone();
    let time = local_time(now, reading.utc_offset_secs)?;
    let sunrise = viewer_clock("sys.sunrise", reading.sunrise, &viewer)?;
    let sunset = viewer_clock("sys.sunset", reading.sunset, &viewer)?;

    Ok(format!(
        "{location}, {country}\n\
         {summary}\n\
         {detail}\n\
         \n\
         Temp: {temp}°C\n\
         Feels like: {feels}°C\n\
         Humidity: {humidity}%\n\
         Pressure: {pressure} hPa\n\
         Wind: {wind} m/s\n\
         Cloudiness: {clouds}%\n\
         Time: {time}\n\
         Sunrise: {sunrise}\n\
         Sunset: {sunset}",
        location = reading.location,
        country = reading.country,
        summary = reading.summary,
        detail = reading.detail,
        temp = reading.temperature_c,
        feels = reading.feels_like_c,
        humidity = reading.humidity_pct,
        pressure = reading.pressure_hpa,
        wind = reading.wind_speed_mps,
        clouds = reading.cloudiness_pct,
    ))
}
