use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::farmer::models::FarmerProfile;
use crate::farmer::errors::FarmerError;

pub mod get_farmer_data;
pub mod health;
pub mod login;
pub mod signup;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    /// Failure that still returns the farmer the request resolved to
    WithFarmer {
        status: StatusCode,
        message: String,
        farmer: FarmerData,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody::new("Server error".to_string()),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiErrorBody::new(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiErrorBody::new(msg)),
            ApiError::WithFarmer {
                status,
                message,
                farmer,
            } => (
                status,
                ApiErrorBody {
                    error: message,
                    farmer: Some(farmer),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FarmerError> for ApiError {
    fn from(err: FarmerError) -> Self {
        match err {
            FarmerError::InvalidUsername(_)
            | FarmerError::InvalidEmail(_)
            | FarmerError::Validation(_)
            | FarmerError::DuplicateIdentity(_)
            | FarmerError::UnknownIdentifier
            | FarmerError::InvalidPassword => ApiError::BadRequest(err.to_string()),
            FarmerError::NotFound(_) => ApiError::NotFound("Farmer not found".to_string()),
            FarmerError::TelemetryNotConfigured(ref farmer) => ApiError::WithFarmer {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
                farmer: farmer.into(),
            },
            FarmerError::NoTelemetryData(ref farmer) => ApiError::WithFarmer {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
                farmer: farmer.into(),
            },
            FarmerError::TelemetryUnavailable { ref farmer, .. } => ApiError::WithFarmer {
                status: StatusCode::BAD_GATEWAY,
                message: "Unable to fetch Thingspeak data".to_string(),
                farmer: farmer.into(),
            },
            FarmerError::Password(_) | FarmerError::Token(_) | FarmerError::DatabaseError(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer: Option<FarmerData>,
}

impl ApiErrorBody {
    pub fn new(error: String) -> Self {
        Self {
            error,
            farmer: None,
        }
    }
}

/// Farmer as exposed over HTTP; never carries the password hash or API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub thingspeak_channel: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&FarmerProfile> for FarmerData {
    fn from(farmer: &FarmerProfile) -> Self {
        Self {
            id: farmer.id.to_string(),
            username: farmer.username.as_str().to_string(),
            email: farmer.email.as_str().to_string(),
            name: farmer.name.clone(),
            thingspeak_channel: farmer.telemetry_channel.clone(),
            created_at: farmer.created_at,
        }
    }
}

/// `{ "message": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponseData {
    pub message: String,
}
