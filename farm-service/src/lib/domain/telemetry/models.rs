use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::domain::telemetry::errors::TelemetryError;

/// ThingSpeak channels expose at most eight data slots, `field1`..`field8`.
pub const FIELD_SLOTS: RangeInclusive<u8> = 1..=8;

/// Channel id and read key for one farmer's ThingSpeak channel.
#[derive(Clone, PartialEq, Eq)]
pub struct TelemetryCredentials {
    pub channel_id: String,
    pub api_key: String,
}

impl TelemetryCredentials {
    /// Both parts must be present and non-empty.
    pub fn new(channel_id: Option<&str>, api_key: Option<&str>) -> Option<Self> {
        match (channel_id, api_key) {
            (Some(channel_id), Some(api_key)) if !channel_id.is_empty() && !api_key.is_empty() => {
                Some(Self {
                    channel_id: channel_id.to_string(),
                    api_key: api_key.to_string(),
                })
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for TelemetryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryCredentials")
            .field("channel_id", &self.channel_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Latest reading keyed by the field names the channel itself declares.
///
/// Values are passed through as ThingSpeak returned them (usually strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SensorReading(BTreeMap<String, Value>);

impl SensorReading {
    /// Map the numbered slots of `latest` through the names declared in `channel`.
    ///
    /// A slot is kept only if the channel names it (non-empty string) and the
    /// entry holds a non-null value for it. Everything else is dropped silently.
    pub fn from_slots(channel: &Map<String, Value>, latest: &Map<String, Value>) -> Self {
        let mut reading = BTreeMap::new();

        for slot in FIELD_SLOTS {
            let key = format!("field{slot}");

            let name = match channel.get(&key) {
                Some(Value::String(name)) if !name.is_empty() => name,
                _ => continue,
            };

            match latest.get(&key) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    reading.insert(name.clone(), value.clone());
                }
            }
        }

        Self(reading)
    }

    pub fn get(&self, field_name: &str) -> Option<&Value> {
        self.0.get(field_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of `GET /channels/{id}/feeds.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelFeed {
    pub channel: Option<Map<String, Value>>,
    pub feeds: Option<Vec<Map<String, Value>>>,
}

impl ChannelFeed {
    /// Resolve the first feed entry into a [`SensorReading`].
    ///
    /// # Errors
    /// * `NoDataAvailable` - Descriptor or feed entry missing
    pub fn into_reading(self) -> Result<SensorReading, TelemetryError> {
        let latest = self
            .feeds
            .and_then(|feeds| feeds.into_iter().next())
            .ok_or_else(|| TelemetryError::NoDataAvailable("feed has no entries".to_string()))?;

        let channel = self.channel.ok_or_else(|| {
            TelemetryError::NoDataAvailable("response has no channel descriptor".to_string())
        })?;

        Ok(SensorReading::from_slots(&channel, &latest))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_only_declared_non_null_slots_are_kept() {
        let channel = object(json!({"field1": "temperature", "field3": "humidity"}));
        let latest = object(json!({"field1": 23.5, "field2": 10, "field3": null}));

        let reading = SensorReading::from_slots(&channel, &latest);

        assert_eq!(reading.len(), 1);
        assert_eq!(reading.get("temperature"), Some(&json!(23.5)));
        assert_eq!(serde_json::to_value(&reading).unwrap(), json!({"temperature": 23.5}));
    }

    #[test]
    fn test_empty_declared_name_is_ignored() {
        let channel = object(json!({"field1": "", "field2": "soil_moisture"}));
        let latest = object(json!({"field1": "1", "field2": "41"}));

        let reading = SensorReading::from_slots(&channel, &latest);

        assert_eq!(serde_json::to_value(&reading).unwrap(), json!({"soil_moisture": "41"}));
    }

    #[test]
    fn test_slots_beyond_eight_are_not_read() {
        let channel = object(json!({"field8": "rain", "field9": "wind"}));
        let latest = object(json!({"field8": "0.2", "field9": "12"}));

        let reading = SensorReading::from_slots(&channel, &latest);

        assert_eq!(reading.len(), 1);
        assert!(reading.get("wind").is_none());
    }

    #[test]
    fn test_falsy_but_present_values_are_kept() {
        let channel = object(json!({"field1": "pump_on", "field2": "level"}));
        let latest = object(json!({"field1": false, "field2": 0}));

        let reading = SensorReading::from_slots(&channel, &latest);

        assert_eq!(reading.get("pump_on"), Some(&json!(false)));
        assert_eq!(reading.get("level"), Some(&json!(0)));
    }

    #[test]
    fn test_feed_with_entry_maps_first_entry() {
        let feed: ChannelFeed = serde_json::from_value(json!({
            "channel": {"id": 12345, "name": "Greenhouse", "field1": "temperature"},
            "feeds": [
                {"created_at": "2024-06-01T10:00:00Z", "entry_id": 9, "field1": "24.1"}
            ]
        }))
        .unwrap();

        let reading = feed.into_reading().unwrap();
        assert_eq!(reading.get("temperature"), Some(&json!("24.1")));
    }

    #[test]
    fn test_feed_without_entries_has_no_data() {
        let feed: ChannelFeed = serde_json::from_value(json!({
            "channel": {"field1": "temperature"},
            "feeds": []
        }))
        .unwrap();

        assert!(matches!(
            feed.into_reading(),
            Err(TelemetryError::NoDataAvailable(_))
        ));
    }

    #[test]
    fn test_feed_without_channel_has_no_data() {
        let feed: ChannelFeed = serde_json::from_value(json!({
            "feeds": [{"field1": "24.1"}]
        }))
        .unwrap();

        assert!(matches!(
            feed.into_reading(),
            Err(TelemetryError::NoDataAvailable(_))
        ));
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let credentials = TelemetryCredentials::new(Some("12345"), Some("SECRETKEY")).unwrap();
        assert!(!format!("{credentials:?}").contains("SECRETKEY"));
    }
}
