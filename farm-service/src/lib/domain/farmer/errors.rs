use thiserror::Error;

use crate::domain::farmer::models::FarmerProfile;

/// Error for FarmerId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FarmerIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be empty")]
    Empty,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all farmer-related operations.
///
/// The telemetry variants carry the already-resolved profile so callers can
/// show the account alongside the failure.
#[derive(Debug, Clone, Error)]
pub enum FarmerError {
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{0}")]
    Validation(String),

    #[error("Username or email already registered")]
    DuplicateIdentity(String),

    #[error("Invalid username or email")]
    UnknownIdentifier,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Farmer not found: {0}")]
    NotFound(String),

    #[error("Thingspeak credentials missing for this user")]
    TelemetryNotConfigured(FarmerProfile),

    #[error("No Thingspeak data available")]
    NoTelemetryData(FarmerProfile),

    #[error("Unable to fetch Thingspeak data: {reason}")]
    TelemetryUnavailable {
        farmer: FarmerProfile,
        reason: String,
    },

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
