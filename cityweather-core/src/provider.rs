use crate::{config::ClientConfig, error::TransportError, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of raw current-weather payloads, keyed by a city name.
///
/// Implementations return the decoded JSON body as-is; turning it into a
/// reading is the projector's job.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str) -> Result<serde_json::Value, TransportError>;
}

/// Construct the upstream provider from resolved client settings.
pub fn provider_from_config(config: &ClientConfig) -> Arc<dyn WeatherProvider> {
    Arc::new(OpenWeatherProvider::new(config.clone()))
}
