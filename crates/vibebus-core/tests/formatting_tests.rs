//! Formatter tests
//!
//! Formatters are pure, so every case here runs on canned payloads.

use serde_json::{json, Value};
use vibebus_core::error::ToolError;
use vibebus_core::formatting::{
    format_departures, format_stops, format_time, format_tool_result, format_weather,
};
use vibebus_core::session::SelectionUpdate;
use vibebus_core::tools::ToolResult;

fn stoptime(offset: i64, realtime: bool, route: &str, headsign: &str) -> Value {
    let mut st = json!({
        "scheduledDeparture": offset,
        "realtime": realtime,
        "serviceDay": 1641859200,
        "headsign": headsign,
        "trip": {"route": {"shortName": route}}
    });
    if realtime {
        st["realtimeDeparture"] = json!(offset);
    }
    st
}

fn departures_payload(name: Option<&str>, stoptimes: Vec<Value>) -> ToolResult {
    Ok(json!({"stopId": "HSL:1434183", "data": {"stop": {
        "name": name,
        "stoptimesWithoutPatterns": stoptimes
    }}}))
}

mod weather_tests {
    use super::*;

    #[test]
    fn test_error_apology_is_exact() {
        let result: ToolResult = Err(ToolError::transport("Weather", "timeout"));
        assert_eq!(
            format_weather(&result),
            "Sorry, I couldn't get the weather information: Weather API error: timeout"
        );
    }

    #[test]
    fn test_full_payload() {
        let result: ToolResult = Ok(json!({
            "current": {"temperature_2m": 5.2, "wind_speed_10m": 3.1, "precipitation": 0.4},
            "daily": {"temperature_2m_max": [7.0], "temperature_2m_min": [1.5]}
        }));
        let text = format_weather(&result);
        assert_eq!(
            text,
            "🌤️ Current Weather in Helsinki:\nTemperature: 5.2°C\nWind Speed: 3.1 m/s\nPrecipitation: 0.4 mm\nToday's Range: 1.5°C - 7°C"
        );
    }

    #[test]
    fn test_missing_fields_render_na() {
        let text = format_weather(&Ok(json!({"current": {}})));
        assert!(text.contains("Temperature: N/A°C"));
        assert!(text.contains("Wind Speed: N/A m/s"));
        assert!(!text.contains("Today's Range"));
    }

    #[test]
    fn test_malformed_payload_is_apologetic() {
        let text = format_weather(&Ok(json!({"current": "sunny"})));
        assert!(text.starts_with("Sorry, I couldn't parse the weather data properly:"));
    }
}

mod time_tests {
    use super::*;

    #[test]
    fn test_full_payload() {
        let result: ToolResult = Ok(json!({
            "current_time": "14:35:22",
            "current_date": "2025-01-09",
            "weekday": "Thursday",
            "timezone": "Europe/Helsinki"
        }));
        assert_eq!(
            format_time(&result),
            "🕐 Current Time in Helsinki:\nTime: 14:35:22\nDate: 2025-01-09\nDay: Thursday\nTimezone: Europe/Helsinki"
        );
    }

    #[test]
    fn test_missing_fields_render_na() {
        let text = format_time(&Ok(json!({"current_time": "08:00:00"})));
        assert!(text.contains("Time: 08:00:00"));
        assert!(text.contains("Date: N/A"));
        assert!(text.contains("Day: N/A"));
        assert!(text.contains("Timezone: N/A"));
    }

    #[test]
    fn test_error() {
        let result: ToolResult = Err(ToolError::InvalidParams("boom".into()));
        assert_eq!(
            format_time(&result),
            "Sorry, I couldn't get the current time: Invalid parameters: boom"
        );
    }
}

mod departures_tests {
    use super::*;

    #[test]
    fn test_realtime_line() {
        let result = departures_payload(
            Some("Kalasatama"),
            vec![stoptime(54000, true, "55", "Central Station")],
        );
        let text = format_departures(&result, None);
        assert!(text.starts_with("🚌 Next Departures from Kalasatama:"));
        // 1641859200 + 54000 = 2022-01-11 15:00 UTC = 17:00 in Helsinki
        assert!(text.contains("🟢 Bus 55 → Central Station at 17:00"), "got {}", text);
    }

    #[test]
    fn test_realtime_offset_wins_over_schedule() {
        let result = departures_payload(
            Some("Kalasatama"),
            vec![json!({
                "scheduledDeparture": 54000,
                "realtimeDeparture": 54600,
                "realtime": true,
                "serviceDay": 1641859200,
                "headsign": "Kamppi",
                "trip": {"route": {"shortName": "58"}}
            })],
        );
        assert!(format_departures(&result, None).contains("at 17:10"));
    }

    #[test]
    fn test_sorted_and_truncated_to_five() {
        let stoptimes = (0..7)
            .rev()
            .map(|i| stoptime(50000 + i * 600, i % 2 == 0, &format!("{}", 70 + i), "Somewhere"))
            .collect();
        let text = format_departures(&departures_payload(Some("Stop"), stoptimes), None);
        let lines: Vec<&str> = text.lines().filter(|l| l.contains(" Bus ")).collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("Bus 70 "));
        assert!(lines[0].starts_with("🟢"));
        assert!(lines[1].starts_with("🔵"));
        assert!(lines[4].contains("Bus 74 "));
    }

    #[test]
    fn test_empty_uses_stop_name() {
        let text = format_departures(&departures_payload(Some("Kalasatama"), vec![]), None);
        assert_eq!(text, "🚌 No upcoming departures found for Kalasatama");
    }

    #[test]
    fn test_missing_stop_falls_back_to_id() {
        let result: ToolResult = Ok(json!({"data": {"stop": null}}));
        let text = format_departures(&result, Some("HSL:9999"));
        assert_eq!(text, "🚌 No upcoming departures found for Stop HSL:9999");
    }

    #[test]
    fn test_error() {
        let result: ToolResult = Err(ToolError::MissingCredential("DIGITRANSIT_API_KEY".into()));
        assert_eq!(
            format_departures(&result, None),
            "Sorry, I couldn't get the bus departure information: DIGITRANSIT_API_KEY not found in environment variables"
        );
    }
}

mod stops_tests {
    use super::*;

    fn stops(list: Value) -> ToolResult {
        Ok(json!({"data": {"stops": list}}))
    }

    #[test]
    fn test_two_matches_numbered_and_published() {
        let result = stops(json!([
            {"gtfsId": "HSL:1234", "name": "Herttoniemi", "code": "H1234", "lat": 60.19, "lon": 25.03},
            {"gtfsId": "HSL:5678", "name": "Herttoniemi asema", "code": "H5678", "lat": 60.20, "lon": 25.04}
        ]));
        let formatted = format_stops(&result, "Herttoniemi");

        let numbered: Vec<&str> = formatted
            .text
            .lines()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
            .collect();
        assert_eq!(
            numbered,
            vec![
                "1. Herttoniemi H1234 (id: HSL:1234)",
                "2. Herttoniemi asema H5678 (id: HSL:5678)"
            ]
        );

        match formatted.selection {
            SelectionUpdate::Replace(candidates) => {
                let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["HSL:1234", "HSL:5678"]);
            }
            other => panic!("expected Replace, got {:?}", other),
        }
    }

    #[test]
    fn test_single_match_detail_view() {
        let result = stops(json!([
            {"gtfsId": "HSL:1434183", "name": "Kalasatama", "code": "H0201", "lat": 60.1871, "lon": 24.9771}
        ]));
        let formatted = format_stops(&result, "Kalasatama");
        assert_eq!(
            formatted.text,
            "🚏 Kalasatama (H0201)\nStop ID: HSL:1434183\nLocation: 60.1871, 24.9771"
        );
        assert_eq!(formatted.selection, SelectionUpdate::Clear);
    }

    #[test]
    fn test_no_matches() {
        let formatted = format_stops(&stops(json!([])), "Atlantis");
        assert_eq!(formatted.text, "🚏 No stops found matching 'Atlantis'");
        assert_eq!(formatted.selection, SelectionUpdate::Clear);
    }

    #[test]
    fn test_error_keeps_selection() {
        let result: ToolResult = Err(ToolError::transport("Bus", "HTTP error: 503 Service Unavailable"));
        let formatted = format_stops(&result, "Kamppi");
        assert_eq!(
            formatted.text,
            "Sorry, I couldn't search for stops: Bus API error: HTTP error: 503 Service Unavailable"
        );
        assert_eq!(formatted.selection, SelectionUpdate::Keep);
    }
}

mod dispatch_tests {
    use super::*;

    #[test]
    fn test_formatting_is_pure_and_idempotent() {
        let cases: Vec<(&str, Value, ToolResult)> = vec![
            ("get_weather", json!({}), Ok(json!({"current": {"temperature_2m": 1.0}}))),
            ("get_current_time", json!({}), Ok(json!({"current_time": "10:00:00"}))),
            (
                "get_next_departures",
                json!({"stop_id": "HSL:1"}),
                departures_payload(None, vec![stoptime(3600, false, "1", "A")]),
            ),
            (
                "get_stops_by_name",
                json!({"name": "X"}),
                Ok(json!({"data": {"stops": [
                    {"gtfsId": "HSL:1", "name": "X"}, {"gtfsId": "HSL:2", "name": "X 2"}
                ]}})),
            ),
            ("get_weather", json!({}), Err(ToolError::transport("Weather", "timeout"))),
        ];

        for (name, args, result) in cases {
            let before = result.clone();
            let first = format_tool_result(name, &args, &result);
            let second = format_tool_result(name, &args, &result);
            assert_eq!(first, second, "{} not idempotent", name);
            assert_eq!(result, before, "{} mutated its input", name);
        }
    }

    #[test]
    fn test_unnamed_stop_uses_argument_id() {
        let result: ToolResult = Ok(json!({"data": {"stop": {"name": null, "stoptimesWithoutPatterns": []}}}));
        let formatted = format_tool_result("get_next_departures", &json!({"stop_id": "HSL:42"}), &result);
        assert_eq!(formatted.text, "🚌 No upcoming departures found for Stop HSL:42");
    }

    #[test]
    fn test_unknown_tool_error() {
        let result: ToolResult = Err(ToolError::UnknownTool("get_lottery".into()));
        let formatted = format_tool_result("get_lottery", &json!({}), &result);
        assert_eq!(formatted.text, "Sorry, I couldn't run get_lottery: Unknown tool: get_lottery");
        assert_eq!(formatted.selection, SelectionUpdate::Keep);
    }
}
