use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;
use chrono::Utc;

use crate::domain::farmer::errors::FarmerError;
use crate::domain::farmer::models::AuthenticatedSession;
use crate::domain::farmer::models::Farmer;
use crate::domain::farmer::models::FarmerId;
use crate::domain::farmer::models::FarmerSensorData;
use crate::domain::farmer::models::LoginCommand;
use crate::domain::farmer::models::LoginIdentifier;
use crate::domain::farmer::models::RegisterFarmerCommand;
use crate::domain::farmer::ports::FarmerRepository;
use crate::domain::farmer::ports::FarmerServicePort;
use crate::domain::telemetry::errors::TelemetryError;
use crate::domain::telemetry::ports::TelemetryGateway;

/// Domain service implementation for farmer operations.
///
/// Concrete implementation of FarmerServicePort with dependency injection.
pub struct FarmerService<FR, TG>
where
    FR: FarmerRepository,
    TG: TelemetryGateway,
{
    repository: Arc<FR>,
    telemetry: Arc<TG>,
    authenticator: Arc<Authenticator>,
    token_expiration_hours: i64,
}

impl<FR, TG> FarmerService<FR, TG>
where
    FR: FarmerRepository,
    TG: TelemetryGateway,
{
    /// Create a new farmer service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Farmer persistence implementation
    /// * `telemetry` - ThingSpeak (or other) telemetry source
    /// * `authenticator` - Password hashing and token signing
    /// * `token_expiration_hours` - Lifetime of issued session tokens
    pub fn new(
        repository: Arc<FR>,
        telemetry: Arc<TG>,
        authenticator: Arc<Authenticator>,
        token_expiration_hours: i64,
    ) -> Self {
        Self {
            repository,
            telemetry,
            authenticator,
            token_expiration_hours,
        }
    }

    async fn find_for_login(
        &self,
        identifier: &LoginIdentifier,
    ) -> Result<Option<Farmer>, FarmerError> {
        match identifier {
            LoginIdentifier::Single(identifier) => {
                self.repository.find_by_identifier(identifier).await
            }
            LoginIdentifier::Either { username, email } => {
                self.repository
                    .find_by_username_or_email(username, email)
                    .await
            }
        }
    }
}

#[async_trait]
impl<FR, TG> FarmerServicePort for FarmerService<FR, TG>
where
    FR: FarmerRepository,
    TG: TelemetryGateway,
{
    async fn register(&self, command: RegisterFarmerCommand) -> Result<Farmer, FarmerError> {
        if command.password.is_empty() {
            return Err(FarmerError::Validation("Password must not be empty".to_string()));
        }

        // Early answer only; the store's unique constraints are authoritative.
        if let Some(existing) = self
            .repository
            .find_by_username_or_email(command.username.as_str(), command.email.as_str())
            .await?
        {
            tracing::warn!(
                username = %command.username,
                existing_farmer_id = %existing.id,
                "Registration rejected: username or email already registered"
            );
            return Err(FarmerError::DuplicateIdentity(
                command.username.as_str().to_string(),
            ));
        }

        let password_hash = self
            .authenticator
            .hash_password(&command.password)
            .map_err(|e| FarmerError::Password(e.to_string()))?;

        let farmer = Farmer {
            id: FarmerId::new(),
            username: command.username,
            email: command.email,
            name: command.name,
            password_hash,
            telemetry_channel: command.telemetry_channel,
            telemetry_api_key: command.telemetry_api_key,
            created_at: Utc::now(),
        };

        let created = self.repository.create(farmer).await?;
        tracing::info!(farmer_id = %created.id, username = %created.username, "Farmer registered");

        Ok(created)
    }

    async fn authenticate(
        &self,
        command: LoginCommand,
    ) -> Result<AuthenticatedSession, FarmerError> {
        let farmer = self
            .find_for_login(&command.identifier)
            .await?
            .ok_or(FarmerError::UnknownIdentifier)?;

        let claims = Claims::for_user(
            farmer.id,
            farmer.username.as_str().to_string(),
            self.token_expiration_hours,
        );

        let result = self
            .authenticator
            .authenticate(&command.password, &farmer.password_hash, &claims)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => FarmerError::InvalidPassword,
                AuthenticationError::PasswordError(err) => FarmerError::Password(err.to_string()),
                AuthenticationError::JwtError(err) => FarmerError::Token(err.to_string()),
            })?;

        tracing::info!(farmer_id = %farmer.id, "Farmer logged in");

        Ok(AuthenticatedSession {
            token: result.access_token,
            farmer,
        })
    }

    async fn get_farmer(&self, id: &FarmerId) -> Result<Farmer, FarmerError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(FarmerError::NotFound(id.to_string()))
    }

    async fn fetch_sensor_data(&self, id: &FarmerId) -> Result<FarmerSensorData, FarmerError> {
        let farmer = self.get_farmer(id).await?;
        let profile = farmer.profile();

        let Some(credentials) = farmer.telemetry_credentials() else {
            return Err(FarmerError::TelemetryNotConfigured(profile));
        };

        match self.telemetry.fetch_latest(&credentials).await {
            Ok(reading) => Ok(FarmerSensorData {
                farmer: profile,
                reading,
            }),
            Err(TelemetryError::ChannelUnreachable(reason)) => {
                tracing::error!(
                    farmer_id = %id,
                    channel_id = %credentials.channel_id,
                    error = %reason,
                    "Thingspeak fetch failed"
                );
                Err(FarmerError::TelemetryUnavailable {
                    farmer: profile,
                    reason,
                })
            }
            Err(TelemetryError::NoDataAvailable(reason)) => {
                tracing::warn!(
                    farmer_id = %id,
                    channel_id = %credentials.channel_id,
                    reason = %reason,
                    "Thingspeak returned no data"
                );
                Err(FarmerError::NoTelemetryData(profile))
            }
        }
    }
}
