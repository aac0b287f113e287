use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Current-weather endpoint used when the config file does not override it.
pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Environment variable consulted at run time and captured at build time.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Key baked into the binary when `OPENWEATHER_API_KEY` was set during the build.
const BUILD_TIME_API_KEY: Option<&str> = option_env!("OPENWEATHER_API_KEY");

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// endpoint = "https://api.openweathermap.org/data/2.5/weather"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Everything the upstream client needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub endpoint: String,
}

impl Config {
    /// Load config from the platform location, or an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Resolve the client settings, reading the API key fallbacks from the
    /// process environment and the build.
    pub fn client_config(&self) -> ClientConfig {
        self.client_config_with(std::env::var(API_KEY_ENV).ok(), BUILD_TIME_API_KEY)
    }

    /// Key precedence: config file, then `runtime_key`, then `build_key`.
    /// A missing key is not an error; the request goes out with an empty
    /// `appid` and fails upstream.
    pub fn client_config_with(
        &self,
        runtime_key: Option<String>,
        build_key: Option<&str>,
    ) -> ClientConfig {
        let api_key = non_blank(self.api_key.clone())
            .or_else(|| non_blank(runtime_key))
            .or_else(|| non_blank(build_key.map(str::to_owned)));

        let api_key = api_key.unwrap_or_else(|| {
            tracing::warn!(
                "no OpenWeather API key configured; requests will be rejected upstream.\n\
                 Hint: run `cityweather configure` or set {API_KEY_ENV}."
            );
            String::new()
        });

        let endpoint = non_blank(self.endpoint.clone()).unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());

        ClientConfig { api_key, endpoint }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_key_takes_precedence() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let client = cfg.client_config_with(Some("ENV_KEY".into()), Some("BUILD_KEY"));
        assert_eq!(client.api_key, "FILE_KEY");
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn runtime_env_beats_build_time_key() {
        let cfg = Config::default();

        let client = cfg.client_config_with(Some("ENV_KEY".into()), Some("BUILD_KEY"));
        assert_eq!(client.api_key, "ENV_KEY");

        let client = cfg.client_config_with(None, Some("BUILD_KEY"));
        assert_eq!(client.api_key, "BUILD_KEY");
    }

    #[test]
    fn missing_key_is_not_an_error() {
        let cfg = Config { api_key: Some("   ".into()), endpoint: None };

        let client = cfg.client_config_with(None, None);
        assert_eq!(client.api_key, "");
    }

    #[test]
    fn endpoint_override_is_used() {
        let cfg = Config { api_key: None, endpoint: Some("http://127.0.0.1:9/weather".into()) };

        let client = cfg.client_config_with(Some("K".into()), None);
        assert_eq!(client.endpoint, "http://127.0.0.1:9/weather");
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_key_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("SAVED_KEY".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("SAVED_KEY"));
        assert_eq!(loaded.endpoint, None);
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
