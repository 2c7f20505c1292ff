//! Domain models for a booking and its travel segments.
//!
//! Field names on the wire follow the upstream JSON payload (camelCase);
//! the Rust side uses descriptive snake_case names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One booking as returned by a fetch source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(rename = "shipReference")]
    pub ship_reference: String,
    #[serde(rename = "shipToken")]
    pub ship_token: String,
    #[serde(rename = "canIssueTicketChecking")]
    pub can_issue_ticket_checking: bool,
    /// Numeric string, epoch seconds
    #[serde(rename = "expiryTime")]
    pub expiry_timestamp: String,
    #[serde(rename = "duration")]
    pub duration_minutes: i64,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl BookingRecord {
    /// Format the duration as hours and minutes, e.g. "2h 40m".
    pub fn duration_display(&self) -> String {
        let hours = self.duration_minutes / 60;
        let minutes = self.duration_minutes % 60;
        format!("{}h {}m", hours, minutes)
    }

    /// Parse the expiry timestamp. None if it is not a valid epoch-seconds string.
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.expiry_timestamp.trim().parse().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: i64,
    #[serde(rename = "originAndDestinationPair")]
    pub route: OriginDestinationPair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginDestinationPair {
    pub origin: Location,
    #[serde(rename = "originCity")]
    pub origin_city: String,
    pub destination: Location,
    #[serde(rename = "destinationCity")]
    pub destination_city: String,
}

impl OriginDestinationPair {
    /// Single-line route description, e.g. "Shanghai (SHA) → Beijing (PEK)".
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) → {} ({})",
            self.origin_city, self.origin.code, self.destination_city, self.destination.code
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub code: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "shipReference": "ABCDEF",
        "shipToken": "AAAABBBCCCCDDD",
        "canIssueTicketChecking": false,
        "expiryTime": "1722409261",
        "duration": 2430,
        "segments": [
            {
                "id": 1,
                "originAndDestinationPair": {
                    "destination": {"code": "BBB", "displayName": "BBB DisplayName", "url": "www.ship.com"},
                    "destinationCity": "AAA",
                    "origin": {"code": "AAA", "displayName": "AAA DisplayName", "url": "www.ship.com"},
                    "originCity": "BBB"
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_upstream_payload() {
        let record: BookingRecord = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(record.ship_reference, "ABCDEF");
        assert_eq!(record.duration_minutes, 2430);
        assert_eq!(record.segments.len(), 1);
        assert_eq!(record.segments[0].route.origin.code, "AAA");
        assert_eq!(record.segments[0].route.destination_city, "AAA");
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let record: BookingRecord = serde_json::from_str(SAMPLE).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["shipReference"], "ABCDEF");
        assert_eq!(value["expiryTime"], "1722409261");
        assert!(value["segments"][0]["originAndDestinationPair"].is_object());
    }

    #[test]
    fn test_duration_display() {
        let mut record: BookingRecord = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(record.duration_display(), "40h 30m");
        record.duration_minutes = 45;
        assert_eq!(record.duration_display(), "0h 45m");
    }

    #[test]
    fn test_expiry_time() {
        let mut record: BookingRecord = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(record.expiry_time().map(|t| t.timestamp()), Some(1722409261));
        record.expiry_timestamp = "soon".to_string();
        assert!(record.expiry_time().is_none());
    }

    #[test]
    fn test_route_summary() {
        let record: BookingRecord = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(record.segments[0].route.summary(), "BBB (AAA) → AAA (BBB)");
    }
}
