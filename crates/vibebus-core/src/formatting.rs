//! Formatting of tool results for display and for reinjection into the model
//!
//! Everything here is a pure function of its inputs. Upstream payloads are
//! read through typed serde views; a payload of the wrong shape becomes an
//! apology naming the parse failure instead of an error.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;

use crate::config::defaults;
use crate::error::ToolError;
use crate::session::{SelectionUpdate, StopCandidate};
use crate::tools::{ToolKind, ToolResult};

/// Departures shown per reply
pub const MAX_DEPARTURES: usize = 5;

const REALTIME_GLYPH: &str = "🟢";
const SCHEDULED_GLYPH: &str = "🔵";

/// Display text plus the effect on the pending stop selection
#[derive(Debug, Clone, PartialEq)]
pub struct Formatted {
    pub text: String,
    pub selection: SelectionUpdate,
}

impl Formatted {
    fn text(text: String) -> Self {
        Self {
            text,
            selection: SelectionUpdate::Keep,
        }
    }
}

/// Format the result of one tool invocation
///
/// `arguments` are the decoded call arguments; they supply display fallbacks
/// such as the searched name.
pub fn format_tool_result(tool_name: &str, arguments: &Value, result: &ToolResult) -> Formatted {
    let Ok(kind) = tool_name.parse::<ToolKind>() else {
        return Formatted::text(format_unknown_tool(tool_name, result));
    };

    match kind {
        ToolKind::Weather => Formatted::text(format_weather(result)),
        ToolKind::CurrentTime => Formatted::text(format_time(result)),
        ToolKind::NextDepartures => {
            let stop_id = arguments.get("stop_id").and_then(Value::as_str);
            Formatted::text(format_departures(result, stop_id))
        }
        ToolKind::StopsByName => {
            let query = arguments.get("name").and_then(Value::as_str).unwrap_or_default();
            format_stops(result, query)
        }
    }
}

fn apology(what: &str, err: &ToolError) -> String {
    format!("Sorry, I couldn't {}: {}", what, err)
}

fn parse_failure(what: &str, err: &serde_json::Error) -> String {
    format!("Sorry, I couldn't parse the {} data properly: {}", what, err)
}

fn num_or_na(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

fn text_or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

// ============================================================================
// Weather
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct WeatherPayload {
    #[serde(default)]
    current: Option<CurrentWeather>,
    #[serde(default)]
    daily: Option<DailyWeather>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentWeather {
    temperature_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    precipitation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyWeather {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
}

pub fn format_weather(result: &ToolResult) -> String {
    let payload = match result {
        Ok(payload) => payload,
        Err(e) => return apology("get the weather information", e),
    };
    let weather = match WeatherPayload::deserialize(payload) {
        Ok(w) => w,
        Err(e) => return parse_failure("weather", &e),
    };

    let current = weather.current.unwrap_or_default();
    let mut out = format!(
        "🌤️ Current Weather in {}:\nTemperature: {}°C\nWind Speed: {} m/s\nPrecipitation: {} mm",
        defaults::LOCATION_NAME,
        num_or_na(current.temperature_2m),
        num_or_na(current.wind_speed_10m),
        num_or_na(current.precipitation),
    );

    if let Some(daily) = weather.daily.filter(|d| !d.temperature_2m_max.is_empty()) {
        let max = daily.temperature_2m_max.first().copied().flatten();
        let min = daily.temperature_2m_min.first().copied().flatten();
        out.push_str(&format!("\nToday's Range: {}°C - {}°C", num_or_na(min), num_or_na(max)));
    }
    out
}

// ============================================================================
// Current time
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct TimePayload {
    current_time: Option<String>,
    current_date: Option<String>,
    weekday: Option<String>,
    timezone: Option<String>,
}

pub fn format_time(result: &ToolResult) -> String {
    let payload = match result {
        Ok(payload) => payload,
        Err(e) => return apology("get the current time", e),
    };
    let time = match TimePayload::deserialize(payload) {
        Ok(t) => t,
        Err(e) => return parse_failure("time", &e),
    };

    format!(
        "🕐 Current Time in {}:\nTime: {}\nDate: {}\nDay: {}\nTimezone: {}",
        defaults::LOCATION_NAME,
        text_or_na(time.current_time.as_deref()),
        text_or_na(time.current_date.as_deref()),
        text_or_na(time.weekday.as_deref()),
        text_or_na(time.timezone.as_deref()),
    )
}

// ============================================================================
// Departures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeparturesPayload {
    #[serde(default)]
    stop_id: Option<String>,
    #[serde(default)]
    data: Option<DeparturesData>,
}

#[derive(Debug, Deserialize)]
struct DeparturesData {
    #[serde(default)]
    stop: Option<StopDepartures>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopDepartures {
    name: Option<String>,
    #[serde(default)]
    stoptimes_without_patterns: Vec<StopTime>,
}

/// One departure record as returned by the routing API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTime {
    #[serde(default)]
    pub scheduled_departure: Option<i64>,
    #[serde(default)]
    pub realtime_departure: Option<i64>,
    #[serde(default)]
    pub realtime: Option<bool>,
    #[serde(default)]
    pub service_day: Option<i64>,
    #[serde(default)]
    pub headsign: Option<String>,
    #[serde(default)]
    pub trip: Option<Trip>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trip {
    #[serde(default)]
    pub route: Option<Route>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default)]
    pub short_name: Option<String>,
}

impl StopTime {
    /// Seconds after service-day midnight, realtime preferred
    pub fn departure_offset(&self) -> i64 {
        self.realtime_departure.or(self.scheduled_departure).unwrap_or(0)
    }

    /// `HH:MM` of the departure in the given zone
    pub fn local_time(&self, timezone: Tz) -> String {
        self.service_day
            .unwrap_or(0)
            .checked_add(self.departure_offset())
            .and_then(|instant| DateTime::from_timestamp(instant, 0))
            .map(|utc| utc.with_timezone(&timezone).format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    }

    fn route_name(&self) -> &str {
        self.trip
            .as_ref()
            .and_then(|t| t.route.as_ref())
            .and_then(|r| r.short_name.as_deref())
            .unwrap_or("N/A")
    }

    fn line(&self, timezone: Tz) -> String {
        let glyph = if self.realtime.unwrap_or(false) {
            REALTIME_GLYPH
        } else {
            SCHEDULED_GLYPH
        };
        format!(
            "{} Bus {} → {} at {}",
            glyph,
            self.route_name(),
            self.headsign.as_deref().unwrap_or("Unknown destination"),
            self.local_time(timezone),
        )
    }
}

pub fn format_departures(result: &ToolResult, stop_id: Option<&str>) -> String {
    let payload = match result {
        Ok(payload) => payload,
        Err(e) => return apology("get the bus departure information", e),
    };
    let parsed = match DeparturesPayload::deserialize(payload) {
        Ok(p) => p,
        Err(e) => return parse_failure("bus departure", &e),
    };

    let stop = parsed.data.and_then(|d| d.stop);
    let stop_name = stop
        .as_ref()
        .and_then(|s| s.name.clone())
        .unwrap_or_else(|| {
            let id = parsed.stop_id.as_deref().or(stop_id).unwrap_or("unknown");
            format!("Stop {}", id)
        });

    let mut departures = stop.map(|s| s.stoptimes_without_patterns).unwrap_or_default();
    if departures.is_empty() {
        return format!("🚌 No upcoming departures found for {}", stop_name);
    }

    departures.sort_by_key(StopTime::departure_offset);
    let lines: Vec<String> = departures
        .iter()
        .take(MAX_DEPARTURES)
        .map(|d| d.line(defaults::TIMEZONE))
        .collect();

    format!("🚌 Next Departures from {}:\n\n{}", stop_name, lines.join("\n"))
}

// ============================================================================
// Stop search
// ============================================================================

#[derive(Debug, Deserialize)]
struct StopsPayload {
    #[serde(default)]
    data: Option<StopsData>,
}

#[derive(Debug, Deserialize)]
struct StopsData {
    #[serde(default)]
    stops: Option<Vec<StopCandidate>>,
}

fn stop_label(stop: &StopCandidate) -> String {
    match stop.code.as_deref() {
        Some(code) if !code.is_empty() => format!("{} {}", stop.name, code),
        _ => stop.name.clone(),
    }
}

fn stop_detail(stop: &StopCandidate) -> String {
    let mut out = match stop.code.as_deref() {
        Some(code) if !code.is_empty() => format!("🚏 {} ({})", stop.name, code),
        _ => format!("🚏 {}", stop.name),
    };
    out.push_str(&format!("\nStop ID: {}", stop.id));
    if let (Some(lat), Some(lon)) = (stop.lat, stop.lon) {
        out.push_str(&format!("\nLocation: {:.4}, {:.4}", lat, lon));
    }
    out
}

/// Format a stop search; more than one match publishes the candidates
pub fn format_stops(result: &ToolResult, query: &str) -> Formatted {
    let payload = match result {
        Ok(payload) => payload,
        Err(e) => return Formatted::text(apology("search for stops", e)),
    };
    let parsed = match StopsPayload::deserialize(payload) {
        Ok(p) => p,
        Err(e) => return Formatted::text(parse_failure("stop search", &e)),
    };

    let stops = parsed.data.and_then(|d| d.stops).unwrap_or_default();
    match stops.as_slice() {
        [] => Formatted {
            text: format!("🚏 No stops found matching '{}'", query),
            selection: SelectionUpdate::Clear,
        },
        [only] => Formatted {
            text: stop_detail(only),
            selection: SelectionUpdate::Clear,
        },
        many => {
            let lines: Vec<String> = many
                .iter()
                .enumerate()
                .map(|(i, s)| format!("{}. {} (id: {})", i + 1, stop_label(s), s.id))
                .collect();
            Formatted {
                text: format!(
                    "🚏 Found {} stops matching '{}':\n{}\n\nReply with a number to see departures from that stop.",
                    many.len(),
                    query,
                    lines.join("\n")
                ),
                selection: SelectionUpdate::Replace(many.to_vec()),
            }
        }
    }
}

// ============================================================================
// Fallback
// ============================================================================

pub fn format_unknown_tool(tool_name: &str, result: &ToolResult) -> String {
    match result {
        Ok(payload) => payload.to_string(),
        Err(e) => apology(&format!("run {}", tool_name), e),
    }
}
