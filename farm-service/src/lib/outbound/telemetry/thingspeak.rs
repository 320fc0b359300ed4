use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Url;

use crate::config::TelemetryConfig;
use crate::domain::telemetry::errors::TelemetryError;
use crate::domain::telemetry::models::ChannelFeed;
use crate::domain::telemetry::models::SensorReading;
use crate::domain::telemetry::models::TelemetryCredentials;
use crate::domain::telemetry::ports::TelemetryGateway;

/// ThingSpeak read API client.
///
/// Every fetch is a single `GET /channels/{id}/feeds.json?api_key=..&results=1`
/// bounded by the client-wide timeout. No caching, no retries.
#[derive(Debug, Clone)]
pub struct ThingSpeakClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ThingSpeakClient {
    pub fn new(config: &TelemetryConfig) -> Result<Self, anyhow::Error> {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, anyhow::Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Telemetry base URL cannot be a base: {}", base_url));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, base_url })
    }

    fn feed_url(&self, channel_id: &str) -> Result<Url, TelemetryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TelemetryError::ChannelUnreachable("invalid base URL".to_string()))?
            .pop_if_empty()
            .extend(["channels", channel_id, "feeds.json"]);
        Ok(url)
    }
}

fn unreachable(e: reqwest::Error) -> TelemetryError {
    if e.is_timeout() {
        TelemetryError::ChannelUnreachable(format!("request timed out: {e}"))
    } else {
        TelemetryError::ChannelUnreachable(e.to_string())
    }
}

#[async_trait]
impl TelemetryGateway for ThingSpeakClient {
    async fn fetch_latest(
        &self,
        credentials: &TelemetryCredentials,
    ) -> Result<SensorReading, TelemetryError> {
        let url = self.feed_url(&credentials.channel_id)?;
        tracing::debug!(channel_id = %credentials.channel_id, "Fetching latest Thingspeak entry");

        let response = self
            .http
            .get(url)
            .query(&[("api_key", credentials.api_key.as_str()), ("results", "1")])
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::ChannelUnreachable(format!(
                "Thingspeak answered with status {status}"
            )));
        }

        let body = response.bytes().await.map_err(unreachable)?;
        let feed: ChannelFeed = serde_json::from_slice(&body).map_err(|e| {
            TelemetryError::NoDataAvailable(format!("feed body could not be decoded: {e}"))
        })?;

        feed.into_reading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_url_appends_channel_path() {
        let client =
            ThingSpeakClient::with_timeout("https://api.thingspeak.com", Duration::from_secs(1))
                .unwrap();

        let url = client.feed_url("12345").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.thingspeak.com/channels/12345/feeds.json"
        );
    }

    #[test]
    fn test_feed_url_escapes_channel_id() {
        let client =
            ThingSpeakClient::with_timeout("http://localhost:8080/proxy/", Duration::from_secs(1))
                .unwrap();

        let url = client.feed_url("12/../admin").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/proxy/channels/12%2F..%2Fadmin/feeds.json"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result =
            ThingSpeakClient::with_timeout("mailto:ops@farm.example", Duration::from_secs(1));
        assert!(result.is_err());
    }
}
