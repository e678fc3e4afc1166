//! Weather tool - current conditions and today's range from Open-Meteo

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::WeatherConfig;
use crate::error::ToolError;
use crate::tools::{Tool, ToolKind, ToolResult};

const SERVICE: &str = "Weather";

/// Forecast for the configured fixed location
pub struct Weather {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl Weather {
    pub fn new(client: reqwest::Client, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", format!("{:.4}", self.config.latitude)),
            ("longitude", format!("{:.4}", self.config.longitude)),
            (
                "current",
                "temperature_2m,wind_speed_10m,precipitation,weather_code".to_string(),
            ),
            (
                "daily",
                "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum".to_string(),
            ),
            ("forecast_days", "1".to_string()),
        ]
    }
}

#[async_trait]
impl Tool for Weather {
    fn kind(&self) -> ToolKind {
        ToolKind::Weather
    }

    fn description(&self) -> &str {
        "Get the current weather and today's temperature range for the user's location. \
         Call this when the user asks about the weather here or right now."
    }

    async fn execute(&self, _params: Value) -> ToolResult {
        debug!(
            latitude = self.config.latitude,
            longitude = self.config.longitude,
            "Fetching forecast"
        );

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&self.query())
            .send()
            .await
            .map_err(|e| ToolError::transport(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::transport(
                SERVICE,
                format!(
                    "HTTP error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::transport(SERVICE, format!("invalid response body: {}", e)))
    }
}
