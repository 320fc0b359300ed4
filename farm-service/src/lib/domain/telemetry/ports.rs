use async_trait::async_trait;

use crate::domain::telemetry::errors::TelemetryError;
use crate::domain::telemetry::models::SensorReading;
use crate::domain::telemetry::models::TelemetryCredentials;

/// Remote source of channel telemetry.
#[async_trait]
pub trait TelemetryGateway: Send + Sync + 'static {
    /// Fetch the single most recent entry of a channel and map it by field name.
    ///
    /// # Errors
    /// * `ChannelUnreachable` - Request failed, timed out or was rejected upstream
    /// * `NoDataAvailable` - Channel has no descriptor or no entries
    async fn fetch_latest(
        &self,
        credentials: &TelemetryCredentials,
    ) -> Result<SensorReading, TelemetryError>;
}
