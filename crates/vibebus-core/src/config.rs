//! Configuration management for Vibebus
//!
//! Handles loading the TOML configuration file, applying environment
//! overrides and resolving API keys.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Built-in defaults
pub mod defaults {
    use chrono_tz::Tz;

    pub const MODEL: &str = "openai/gpt-4o";
    pub const MODEL_ENV: &str = "DEFAULT_MODEL";
    pub const LLM_BASE_URL: &str = "https://openrouter.ai/api/v1/";
    pub const LLM_API_KEY_ENV: &str = "OPENROUTER_API_KEY";
    pub const LLM_TIMEOUT_SECS: u64 = 120;

    pub const WEATHER_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
    pub const LATITUDE: f64 = 60.1850;
    pub const LONGITUDE: f64 = 25.0317;

    pub const TRANSIT_BASE_URL: &str = "https://api.digitransit.fi/routing/v2/hsl/gtfs/v1";
    pub const TRANSIT_API_KEY_ENV: &str = "DIGITRANSIT_API_KEY";
    pub const DEFAULT_STOP_ID: &str = "HSL:1434183";
    /// Departure lookahead window
    pub const TIME_RANGE_SECS: u32 = 3600;

    pub const MAX_MESSAGES: usize = 20;
    pub const HTTP_TIMEOUT_SECS: u64 = 10;

    /// Every rendered time is in this zone
    pub const TIMEZONE: Tz = chrono_tz::Europe::Helsinki;
    pub const LOCATION_NAME: &str = "Helsinki";
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub transit: TransitConfig,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Apply environment overrides using the given lookup.
    ///
    /// Only the model name is taken from the environment here; API keys are
    /// resolved lazily through [`LlmConfig::api_key`] and
    /// [`TransitConfig::api_key`].
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(defaults::MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.llm.model = model;
        }
    }

    /// Check values that would otherwise fail much later at first use
    pub fn validate(&self) -> Result<()> {
        for (label, raw) in [
            ("llm.base_url", self.llm.base_url.as_str()),
            ("weather.base_url", self.weather.base_url.as_str()),
            ("transit.base_url", self.transit.base_url.as_str()),
        ] {
            url::Url::parse(raw)
                .map_err(|e| Error::Config(format!("{} is not a valid URL ({}): {}", label, raw, e)))?;
        }

        if self.session.max_messages < 2 {
            return Err(Error::Config(format!(
                "session.max_messages must be at least 2, got {}",
                self.session.max_messages
            )));
        }
        if self.http.timeout_secs == 0 || self.llm.timeout_secs == 0 {
            return Err(Error::Config("timeouts must be greater than zero".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::Config("llm.model must not be empty".to_string()));
        }
        Ok(())
    }
}

/// LLM endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model to use
    pub model: String,
    /// OpenAI-compatible endpoint
    pub base_url: String,
    /// API key (can be loaded from env)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name for API key
    pub api_key_env: String,
    /// Timeout for a single completion request
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: defaults::MODEL.to_string(),
            base_url: defaults::LLM_BASE_URL.to_string(),
            api_key: None,
            api_key_env: defaults::LLM_API_KEY_ENV.to_string(),
            timeout_secs: defaults::LLM_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    /// Get the API key, checking environment variable if not set directly
    pub fn api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), &self.api_key_env)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Forecast location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::WEATHER_BASE_URL.to_string(),
            latitude: defaults::LATITUDE,
            longitude: defaults::LONGITUDE,
        }
    }
}

/// Digitransit routing API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_key_env: String,
    /// Stop used when the model asks for departures without a stop id
    pub default_stop_id: String,
    pub time_range_secs: u32,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::TRANSIT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: defaults::TRANSIT_API_KEY_ENV.to_string(),
            default_stop_id: defaults::DEFAULT_STOP_ID.to_string(),
            time_range_secs: defaults::TIME_RANGE_SECS,
        }
    }
}

impl TransitConfig {
    pub fn api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Per-session conversation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Retention limit for the message log, system message included
    pub max_messages: usize,
    /// Replaces the built-in system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_messages: defaults::MAX_MESSAGES,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::HTTP_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn resolve_key(direct: Option<&str>, env_var: &str) -> Option<String> {
    if let Some(key) = direct.filter(|k| !k.trim().is_empty()) {
        return Some(key.to_string());
    }
    std::env::var(env_var).ok().filter(|k| !k.trim().is_empty())
}

/// Configuration manager for loading configuration
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// Create a config manager with a specific path
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn with_path(config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Config::default()
        };

        Ok(Self { config_path, config })
    }

    /// Get the default config path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("vibebus").join("config.toml"))
    }

    /// Load configuration from a file
    fn load_from_path(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the config file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Consume the manager, keeping the loaded configuration
    pub fn into_config(self) -> Config {
        self.config
    }
}
