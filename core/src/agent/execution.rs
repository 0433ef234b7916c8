//! Bot execution result structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one bot execution
///
/// `response` is present exactly when `success` is true and `error` exactly
/// when it is false; the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotResponse {
    /// Identifier of the bot that produced this result
    pub bot_id: u32,

    /// Whether the execution was successful
    pub success: bool,

    /// Response payload
    pub response: Option<String>,

    /// Wall-clock seconds from the first attempt's start
    pub response_time: f64,

    /// Human-readable failure summary
    pub error: Option<String>,

    /// Completion time
    pub timestamp: DateTime<Utc>,
}

impl BotResponse {
    /// Create a successful execution result
    pub fn success(bot_id: u32, response: String, response_time: f64) -> Self {
        Self {
            bot_id,
            success: true,
            response: Some(response),
            response_time,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a failed execution result
    pub fn failure(bot_id: u32, error: String, response_time: f64) -> Self {
        Self {
            bot_id,
            success: false,
            response: None,
            response_time,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }

    /// Payload or error text, whichever is present
    pub fn summary(&self) -> &str {
        self.response
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_keep_fields_exclusive() {
        let ok = BotResponse::success(7, "4".to_string(), 0.25);
        assert!(ok.success);
        assert_eq!(ok.response.as_deref(), Some("4"));
        assert!(ok.error.is_none());
        assert_eq!(ok.summary(), "4");

        let failed = BotResponse::failure(7, "Timeout after 5s".to_string(), 5.0);
        assert!(!failed.success);
        assert!(failed.response.is_none());
        assert_eq!(failed.error.as_deref(), Some("Timeout after 5s"));
        assert_eq!(failed.summary(), "Timeout after 5s");
    }

    #[test]
    fn test_serializes_for_reports() {
        let value = serde_json::to_value(BotResponse::success(1, "ok".to_string(), 1.5)).unwrap();
        assert_eq!(value["bot_id"], 1);
        assert_eq!(value["success"], true);
        assert_eq!(value["response"], "ok");
        assert!(value["error"].is_null());
        assert!(value["timestamp"].is_string());
    }
}
