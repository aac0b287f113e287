use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use url::Url;

use crate::{config::ClientConfig, error::TransportError};

use super::WeatherProvider;

#[derive(Clone)]
pub struct OpenWeatherProvider {
    config: ClientConfig,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// `<endpoint>?units=metric&q=<city>&appid=<key>`, with the city percent-encoded.
    pub fn request_url(&self, city: &str) -> Result<Url, TransportError> {
        Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("units", "metric"),
                ("q", city),
                ("appid", self.config.api_key.as_str()),
            ],
        )
        .map_err(|source| TransportError::Url {
            endpoint: self.config.endpoint.clone(),
            source,
        })
    }
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("endpoint", &self.config.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, city: &str) -> Result<serde_json::Value, TransportError> {
        let url = self.request_url(city)?;
        tracing::debug!(endpoint = %self.config.endpoint, %city, "requesting current weather");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = res.status();
        let body = res.text().await.map_err(TransportError::Request)?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(TransportError::Decode)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(endpoint: &str) -> OpenWeatherProvider {
        OpenWeatherProvider::new(ClientConfig {
            api_key: "SECRET".into(),
            endpoint: endpoint.into(),
        })
    }

    #[test]
    fn request_url_has_units_query_and_key_in_order() {
        let url = provider(crate::config::DEFAULT_ENDPOINT)
            .request_url("London")
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.openweathermap.org/data/2.5/weather?units=metric&q=London&appid=SECRET"
        );
    }

    #[test]
    fn request_url_encodes_city_without_trimming() {
        let url = provider("http://localhost/weather")
            .request_url(" São Paulo&x=1")
            .unwrap();

        let q: Vec<_> = url.query_pairs().filter(|(k, _)| k == "q").collect();
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].1, " São Paulo&x=1");
        assert!(!url.as_str().contains("&x=1"));
    }

    #[test]
    fn request_url_rejects_bad_endpoint() {
        let err = provider("not a url").request_url("London").unwrap_err();
        assert!(matches!(err, TransportError::Url { .. }));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let debug = format!("{:?}", provider("http://localhost/weather"));
        assert!(!debug.contains("SECRET"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
