//! Tool registry factory
//!
//! Builds the standard set of four tools from configuration. All network
//! tools share one HTTP client so the transport timeout is set in one place.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, TransitConfig, WeatherConfig};
use crate::error::{Error, Result};
use crate::tools::{CurrentTime, DigitransitClient, NextDepartures, StopsByName, ToolRegistry, Weather};

/// Builder for the standard tool registry
pub struct ToolRegistryBuilder {
    weather: WeatherConfig,
    transit: TransitConfig,
    http_timeout: Duration,
    http_client: Option<reqwest::Client>,
    /// `Some` overrides the key resolved from the transit config
    transit_api_key: Option<Option<String>>,
}

impl ToolRegistryBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            weather: config.weather.clone(),
            transit: config.transit.clone(),
            http_timeout: config.http.timeout(),
            http_client: None,
            transit_api_key: None,
        }
    }

    /// Share an existing HTTP client instead of building one
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use this transit key instead of resolving it; `None` runs keyless
    pub fn with_transit_api_key(mut self, api_key: Option<String>) -> Self {
        self.transit_api_key = Some(api_key);
        self
    }

    pub fn build(self) -> Result<ToolRegistry> {
        let http = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(self.http_timeout)
                .build()
                .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?,
        };

        let transit = Arc::new(match self.transit_api_key {
            Some(key) => DigitransitClient::with_api_key(http.clone(), self.transit, key),
            None => DigitransitClient::new(http.clone(), self.transit),
        });
        if !transit.has_api_key() {
            tracing::warn!(
                env = %transit.config().api_key_env,
                "No transit API key; stop search and departures will report it missing"
            );
        }

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Weather::new(http, self.weather)));
        registry.register(Arc::new(CurrentTime::new()));
        registry.register(Arc::new(StopsByName::new(transit.clone())));
        registry.register(Arc::new(NextDepartures::new(transit)));
        Ok(registry)
    }
}

/// Create the standard registry with every tool enabled
pub fn create_standard_tool_registry(config: &Config) -> Result<ToolRegistry> {
    ToolRegistryBuilder::new(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolKind;

    #[test]
    fn test_standard_registry_has_all_tools() {
        let registry = ToolRegistryBuilder::new(&Config::default())
            .with_transit_api_key(None)
            .build()
            .unwrap();

        assert_eq!(registry.len(), ToolKind::ALL.len());
        for kind in ToolKind::ALL {
            assert!(registry.get_kind(kind).is_some(), "missing {}", kind);
        }
    }

    #[test]
    fn test_definitions_are_sorted_by_name() {
        let registry = ToolRegistryBuilder::new(&Config::default())
            .with_transit_api_key(Some("test-key".into()))
            .build()
            .unwrap();
        let names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "get_current_time",
                "get_next_departures",
                "get_stops_by_name",
                "get_weather"
            ]
        );
    }
}
