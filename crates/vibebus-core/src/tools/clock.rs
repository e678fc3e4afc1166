//! Clock tool - wall-clock time in the fixed local timezone

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};

use crate::config::defaults;
use crate::tools::{Tool, ToolKind, ToolResult};

pub struct CurrentTime {
    timezone: Tz,
}

impl CurrentTime {
    pub fn new() -> Self {
        Self {
            timezone: defaults::TIMEZONE,
        }
    }
}

impl Default for CurrentTime {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload for a given instant; evaluated fresh on every call
pub fn time_payload(now: DateTime<Utc>, timezone: Tz) -> Value {
    let local = now.with_timezone(&timezone);
    json!({
        "current_time": local.format("%H:%M:%S").to_string(),
        "current_date": local.format("%Y-%m-%d").to_string(),
        "weekday": local.format("%A").to_string(),
        "timezone": timezone.name(),
    })
}

#[async_trait]
impl Tool for CurrentTime {
    fn kind(&self) -> ToolKind {
        ToolKind::CurrentTime
    }

    fn description(&self) -> &str {
        "Get the current local time, date and weekday. Call this when the user asks what time or day it is."
    }

    async fn execute(&self, _params: Value) -> ToolResult {
        Ok(time_payload(Utc::now(), self.timezone))
    }
}
