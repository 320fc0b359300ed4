use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::FarmerData;
use crate::domain::farmer::models::LoginCommand;
use crate::domain::farmer::models::LoginIdentifier;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = payload?;

    let command = body
        .into_command()
        .ok_or_else(|| ApiError::BadRequest("Provide username/email and password".to_string()))?;

    let session = state.farmer_service.authenticate(command).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            message: "Login successful".to_string(),
            token: session.token,
            farmer: (&session.farmer.profile()).into(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl LoginRequestBody {
    fn into_command(self) -> Option<LoginCommand> {
        let password = self.password.filter(|p| !p.is_empty())?;
        let identifier = LoginIdentifier::from_parts(self.username, self.email)?;

        Some(LoginCommand {
            identifier,
            password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub message: String,
    pub token: String,
    pub farmer: FarmerData,
}
