use thiserror::Error;

/// Failures of the remote telemetry fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelemetryError {
    /// Transport failure, timeout or non-success status from the channel feed
    #[error("Telemetry channel unreachable: {0}")]
    ChannelUnreachable(String),

    /// The feed answered but holds no channel descriptor or entry
    #[error("No telemetry data available: {0}")]
    NoDataAvailable(String),
}
