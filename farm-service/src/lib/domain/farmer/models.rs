use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::farmer::errors::EmailError;
use crate::domain::farmer::errors::FarmerIdError;
use crate::domain::farmer::errors::UsernameError;
use crate::domain::telemetry::models::SensorReading;
use crate::domain::telemetry::models::TelemetryCredentials;

/// Farmer aggregate entity.
///
/// Holds secrets (`password_hash`, `telemetry_api_key`); anything leaving the
/// service goes through [`Farmer::profile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Farmer {
    pub id: FarmerId,
    pub username: Username,
    pub email: EmailAddress,
    pub name: Option<String>,
    pub password_hash: String,
    pub telemetry_channel: Option<String>,
    pub telemetry_api_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Farmer {
    /// Sanitized projection with the password hash and API key removed.
    pub fn profile(&self) -> FarmerProfile {
        FarmerProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            telemetry_channel: self.telemetry_channel.clone(),
            created_at: self.created_at,
        }
    }

    /// ThingSpeak credentials, if both the channel id and the key are set.
    pub fn telemetry_credentials(&self) -> Option<TelemetryCredentials> {
        TelemetryCredentials::new(
            self.telemetry_channel.as_deref(),
            self.telemetry_api_key.as_deref(),
        )
    }
}

/// Client-safe view of a farmer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmerProfile {
    pub id: FarmerId,
    pub username: Username,
    pub email: EmailAddress,
    pub name: Option<String>,
    pub telemetry_channel: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Farmer unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FarmerId(pub Uuid);

impl FarmerId {
    /// Generate a new random farmer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a farmer ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, FarmerIdError> {
        Uuid::parse_str(s)
            .map(FarmerId)
            .map_err(|e| FarmerIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for FarmerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FarmerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Any non-blank text up to 255 characters; no character set is imposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 255;

    /// Create a new username. Any non-blank text up to the column width is accepted.
    ///
    /// # Errors
    /// * `Empty` - Username is empty or only whitespace
    /// * `TooLong` - Username longer than 255 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        if username.trim().is_empty() {
            return Err(UsernameError::Empty);
        }

        let length = username.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to register a new farmer with domain types
#[derive(Debug)]
pub struct RegisterFarmerCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub name: Option<String>,
    /// Plain text password, hashed by the service before persistence
    pub password: String,
    pub telemetry_channel: Option<String>,
    pub telemetry_api_key: Option<String>,
}

impl RegisterFarmerCommand {
    pub fn new(username: Username, email: EmailAddress, password: String) -> Self {
        Self {
            username,
            email,
            name: None,
            password,
            telemetry_channel: None,
            telemetry_api_key: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_telemetry(mut self, channel: Option<String>, api_key: Option<String>) -> Self {
        self.telemetry_channel = channel;
        self.telemetry_api_key = api_key;
        self
    }
}

/// How a farmer identifies themselves at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    /// Matched against both the username and the email columns
    Single(String),
    /// Matches a farmer with this username or this email
    Either { username: String, email: String },
}

impl LoginIdentifier {
    /// Build an identifier from the optional login fields; empty strings count as absent.
    pub fn from_parts(username: Option<String>, email: Option<String>) -> Option<Self> {
        let username = present(username);
        let email = present(email);

        match (username, email) {
            (Some(username), Some(email)) => Some(Self::Either { username, email }),
            (Some(identifier), None) | (None, Some(identifier)) => Some(Self::Single(identifier)),
            (None, None) => None,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Command to authenticate a farmer
#[derive(Debug)]
pub struct LoginCommand {
    pub identifier: LoginIdentifier,
    pub password: String,
}

/// Issued session plus the farmer it belongs to.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub token: String,
    pub farmer: Farmer,
}

/// Latest telemetry for a farmer's channel.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmerSensorData {
    pub farmer: FarmerProfile,
    pub reading: SensorReading,
}
