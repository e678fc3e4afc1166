//! Transit tools backed by the Digitransit routing GraphQL API
//!
//! Both tools share one [`DigitransitClient`], which owns the subscription
//! key check. Without a key no request is ever sent.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::TransitConfig;
use crate::error::ToolError;
use crate::tools::{str_param, ParamType, ParameterSpec, Tool, ToolKind, ToolResult};

const SERVICE: &str = "Bus";
const SUBSCRIPTION_HEADER: &str = "digitransit-subscription-key";

const STOPS_QUERY: &str = r#"
query SearchStops($name: String!) {
    stops(name: $name) {
        gtfsId
        name
        code
        lat
        lon
    }
}
"#;

const DEPARTURES_QUERY: &str = r#"
query GetStopDepartures($stopId: String!, $timeRange: Int!) {
    stop(id: $stopId) {
        name
        stoptimesWithoutPatterns(timeRange: $timeRange) {
            scheduledArrival
            realtimeArrival
            arrivalDelay
            scheduledDeparture
            realtimeDeparture
            departureDelay
            realtime
            realtimeState
            serviceDay
            headsign
            trip {
                route {
                    shortName
                }
            }
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Thin GraphQL transport for the routing API
pub struct DigitransitClient {
    http: reqwest::Client,
    config: TransitConfig,
    api_key: Option<String>,
}

impl DigitransitClient {
    /// Resolve the subscription key from config or environment now
    pub fn new(http: reqwest::Client, config: TransitConfig) -> Self {
        let api_key = config.api_key();
        Self::with_api_key(http, config, api_key)
    }

    pub fn with_api_key(http: reqwest::Client, config: TransitConfig, api_key: Option<String>) -> Self {
        Self {
            http,
            config,
            api_key,
        }
    }

    pub fn config(&self) -> &TransitConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run a query and return the whole response body
    pub async fn query(&self, query: &str, variables: Value) -> ToolResult {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!(env = %self.config.api_key_env, "Transit request skipped, no subscription key");
            return Err(ToolError::MissingCredential(self.config.api_key_env.clone()));
        };

        let response = self
            .http
            .post(&self.config.base_url)
            .header(SUBSCRIPTION_HEADER, api_key)
            .json(&json!({ "query": query, "variables": variables }))
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

        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::transport(SERVICE, format!("invalid response body: {}", e)))?;

        check_graphql_errors(&body)?;
        Ok(body)
    }
}

/// GraphQL reports failures in-band with a 200 status
fn check_graphql_errors(body: &Value) -> Result<(), ToolError> {
    let errors = match body.get("errors") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(list)) if list.is_empty() => return Ok(()),
        Some(errors) => errors,
    };
    // An errors member we cannot read is still a failure
    let Ok(errors) = serde_json::from_value::<Vec<GraphQlError>>(errors.clone()) else {
        return Err(ToolError::transport(SERVICE, errors.to_string()));
    };
    let joined = errors
        .into_iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ");
    Err(ToolError::transport(SERVICE, joined))
}

/// Free-text stop search
pub struct StopsByName {
    client: Arc<DigitransitClient>,
}

impl StopsByName {
    pub fn new(client: Arc<DigitransitClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for StopsByName {
    fn kind(&self) -> ToolKind {
        ToolKind::StopsByName
    }

    fn description(&self) -> &str {
        "Search public transport stops by name. Returns matching stops with their ids. \
         Call this when the user names a stop and you need its id for departures."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required(
            "name",
            ParamType::String,
            "Full or partial stop name, e.g. \"Herttoniemi\"",
        )]
    }

    async fn execute(&self, params: Value) -> ToolResult {
        let name = str_param(&params, "name")
            .ok_or_else(|| ToolError::InvalidParams("name is required".into()))?;

        debug!(name, "Searching stops");
        self.client.query(STOPS_QUERY, json!({ "name": name })).await
    }
}

/// Departures from a single stop within the lookahead window
pub struct NextDepartures {
    client: Arc<DigitransitClient>,
}

impl NextDepartures {
    pub fn new(client: Arc<DigitransitClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for NextDepartures {
    fn kind(&self) -> ToolKind {
        ToolKind::NextDepartures
    }

    fn description(&self) -> &str {
        "Get the next departures from a stop during the coming hour. \
         Without a stop_id the user's home stop is used."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::optional(
            "stop_id",
            ParamType::String,
            "Stop gtfsId such as \"HSL:1434183\"; omit for the default stop",
        )]
    }

    async fn execute(&self, params: Value) -> ToolResult {
        let config = self.client.config();
        let stop_id = str_param(&params, "stop_id").unwrap_or(config.default_stop_id.as_str());

        debug!(stop_id, time_range = config.time_range_secs, "Fetching departures");
        let mut body = self
            .client
            .query(
                DEPARTURES_QUERY,
                json!({ "stopId": stop_id, "timeRange": config.time_range_secs }),
            )
            .await?;

        // The stop name may be missing upstream; keep the id for display
        if let Some(obj) = body.as_object_mut() {
            obj.insert("stopId".to_string(), Value::String(stop_id.to_string()));
        }
        Ok(body)
    }
}
