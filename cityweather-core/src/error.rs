use thiserror::Error;

/// The submitted city name was empty or whitespace-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Please enter a city name")]
pub struct ValidationError;

/// The upstream request did not produce a JSON payload.
///
/// Connection failures and non-success statuses are treated the same way by
/// the controller; the status is only kept for the log line.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build OpenWeather request URL from `{endpoint}`")]
    Url {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to send request to OpenWeather")]
    Request(#[source] reqwest::Error),

    #[error("OpenWeather request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("OpenWeather response body is not valid JSON")]
    Decode(#[source] serde_json::Error),
}

/// The payload arrived but cannot be turned into a reading.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed weather payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("weather payload has an empty `weather` list")]
    NoConditions,

    #[error("`{field}` value {value} is outside the representable time range")]
    TimestampOutOfRange { field: &'static str, value: i64 },
}

/// Failure of a submitted fetch after validation passed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
