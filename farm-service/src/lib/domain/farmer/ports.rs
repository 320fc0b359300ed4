use async_trait::async_trait;

use crate::domain::farmer::errors::FarmerError;
use crate::domain::farmer::models::AuthenticatedSession;
use crate::domain::farmer::models::Farmer;
use crate::domain::farmer::models::FarmerId;
use crate::domain::farmer::models::FarmerSensorData;
use crate::domain::farmer::models::LoginCommand;
use crate::domain::farmer::models::RegisterFarmerCommand;

/// Port for farmer domain service operations.
#[async_trait]
pub trait FarmerServicePort: Send + Sync + 'static {
    /// Register a new farmer.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Username or email is already registered
    /// * `Validation` - Password is empty
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterFarmerCommand) -> Result<Farmer, FarmerError>;

    /// Verify a farmer's password and issue a session token.
    ///
    /// # Errors
    /// * `UnknownIdentifier` - No farmer matches the username or email
    /// * `InvalidPassword` - Password does not match
    /// * `Password` / `Token` - Stored hash unreadable or token could not be signed
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, command: LoginCommand)
        -> Result<AuthenticatedSession, FarmerError>;

    /// Retrieve farmer by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Farmer does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_farmer(&self, id: &FarmerId) -> Result<Farmer, FarmerError>;

    /// Fetch the latest reading of the farmer's ThingSpeak channel.
    ///
    /// Never writes to the farmer record.
    ///
    /// # Errors
    /// * `NotFound` - Farmer does not exist
    /// * `TelemetryNotConfigured` - Channel id or API key missing; nothing is fetched
    /// * `TelemetryUnavailable` - Channel could not be reached
    /// * `NoTelemetryData` - Channel returned no entry
    /// * `DatabaseError` - Database operation failed
    async fn fetch_sensor_data(&self, id: &FarmerId) -> Result<FarmerSensorData, FarmerError>;
}

/// Persistence operations for the farmer aggregate.
///
/// Implementations must enforce username and email uniqueness themselves;
/// the service's pre-check only exists to give an early answer.
#[async_trait]
pub trait FarmerRepository: Send + Sync + 'static {
    /// Persist new farmer to storage.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Username or email is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, farmer: Farmer) -> Result<Farmer, FarmerError>;

    /// Retrieve farmer by identifier.
    async fn find_by_id(&self, id: &FarmerId) -> Result<Option<Farmer>, FarmerError>;

    /// Retrieve the farmer whose username or email equals `identifier`.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Farmer>, FarmerError>;

    /// Retrieve a farmer holding either the given username or the given email.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Farmer>, FarmerError>;

    /// Number of registered farmers.
    async fn count(&self) -> Result<u64, FarmerError>;
}
