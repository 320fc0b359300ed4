use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::MessageResponseData;
use crate::domain::farmer::models::EmailAddress;
use crate::domain::farmer::models::RegisterFarmerCommand;
use crate::domain::farmer::models::Username;
use crate::farmer::errors::EmailError;
use crate::farmer::errors::UsernameError;
use crate::inbound::http::router::AppState;

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .farmer_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageResponseData {
                    message: "Farmer registered successfully!".to_string(),
                },
            )
        })
}

/// HTTP request body for registering a farmer (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    username: Option<String>,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    thingspeak_channel: Option<String>,
    thingspeak_api_key: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum ParseSignupRequestError {
    #[error("Provide username, email and password")]
    MissingFields,

    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl SignupRequest {
    fn try_into_command(self) -> Result<RegisterFarmerCommand, ParseSignupRequestError> {
        let (Some(username), Some(email), Some(password)) = (
            present(self.username),
            present(self.email),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(ParseSignupRequestError::MissingFields);
        };

        let username = Username::new(username)?;
        let email = EmailAddress::new(email)?;

        Ok(RegisterFarmerCommand::new(username, email, password)
            .with_name(present(self.name))
            .with_telemetry(
                present(self.thingspeak_channel),
                present(self.thingspeak_api_key),
            ))
    }
}

impl From<ParseSignupRequestError> for ApiError {
    fn from(err: ParseSignupRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
