use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::farmer::models::EmailAddress;
use crate::domain::farmer::models::Farmer;
use crate::domain::farmer::models::FarmerId;
use crate::domain::farmer::models::Username;
use crate::domain::farmer::ports::FarmerRepository;
use crate::farmer::errors::FarmerError;

const SELECT_FARMER: &str = r#"
    SELECT id, username, email, name, password_hash,
           thingspeak_channel, thingspeak_api_key, created_at
    FROM farmers
"#;

pub struct PostgresFarmerRepository {
    pool: PgPool,
}

impl PostgresFarmerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FarmerRow {
    id: Uuid,
    username: String,
    email: String,
    name: Option<String>,
    password_hash: String,
    thingspeak_channel: Option<String>,
    thingspeak_api_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<FarmerRow> for Farmer {
    type Error = FarmerError;

    fn try_from(row: FarmerRow) -> Result<Self, Self::Error> {
        Ok(Farmer {
            id: FarmerId(row.id),
            username: Username::new(row.username)?,
            email: EmailAddress::new(row.email)?,
            name: row.name,
            password_hash: row.password_hash,
            telemetry_channel: row.thingspeak_channel,
            telemetry_api_key: row.thingspeak_api_key,
            created_at: row.created_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> FarmerError {
    FarmerError::DatabaseError(e.to_string())
}

#[async_trait]
impl FarmerRepository for PostgresFarmerRepository {
    async fn create(&self, farmer: Farmer) -> Result<Farmer, FarmerError> {
        sqlx::query(
            r#"
            INSERT INTO farmers (id, username, email, name, password_hash,
                                 thingspeak_channel, thingspeak_api_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(farmer.id.0)
        .bind(farmer.username.as_str())
        .bind(farmer.email.as_str())
        .bind(farmer.name.as_deref())
        .bind(&farmer.password_hash)
        .bind(farmer.telemetry_channel.as_deref())
        .bind(farmer.telemetry_api_key.as_deref())
        .bind(farmer.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return match db_err.constraint() {
                        Some("farmers_email_key") => {
                            FarmerError::DuplicateIdentity(farmer.email.as_str().to_string())
                        }
                        _ => FarmerError::DuplicateIdentity(farmer.username.as_str().to_string()),
                    };
                }
            }
            database_error(e)
        })?;

        Ok(farmer)
    }

    async fn find_by_id(&self, id: &FarmerId) -> Result<Option<Farmer>, FarmerError> {
        let sql = format!("{SELECT_FARMER} WHERE id = $1");
        let row = sqlx::query_as::<_, FarmerRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(Farmer::try_from).transpose()
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Farmer>, FarmerError> {
        let sql = format!("{SELECT_FARMER} WHERE username = $1 OR email = $1 LIMIT 1");
        let row = sqlx::query_as::<_, FarmerRow>(&sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(Farmer::try_from).transpose()
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Farmer>, FarmerError> {
        let sql = format!("{SELECT_FARMER} WHERE username = $1 OR email = $2 LIMIT 1");
        let row = sqlx::query_as::<_, FarmerRow>(&sql)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(Farmer::try_from).transpose()
    }

    async fn count(&self) -> Result<u64, FarmerError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM farmers")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(count.max(0) as u64)
    }
}
