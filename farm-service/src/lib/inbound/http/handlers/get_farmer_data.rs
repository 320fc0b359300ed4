use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::FarmerData;
use crate::domain::telemetry::models::SensorReading;
use crate::inbound::http::middleware::AuthenticatedFarmer;
use crate::inbound::http::router::AppState;

/// Latest ThingSpeak reading for the authenticated farmer.
pub async fn get_farmer_data(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedFarmer>,
) -> Result<ApiSuccess<FarmerDataResponseData>, ApiError> {
    state
        .farmer_service
        .fetch_sensor_data(&authenticated.farmer_id)
        .await
        .map_err(ApiError::from)
        .map(|data| {
            ApiSuccess::new(
                StatusCode::OK,
                FarmerDataResponseData {
                    farmer: (&data.farmer).into(),
                    sensor_data: data.reading,
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerDataResponseData {
    pub farmer: FarmerData,
    pub sensor_data: SensorReading,
}
