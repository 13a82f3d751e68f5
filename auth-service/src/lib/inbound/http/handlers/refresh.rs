use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairResponseData;
use crate::domain::identity::models::RefreshCommand;
use crate::domain::identity::ports::AuthServicePort;
use crate::identity::errors::AuthError;
use crate::inbound::http::router::AppState;

pub async fn refresh<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<RefreshRequest>,
) -> Result<ApiSuccess<TokenPairResponseData>, ApiError> {
    let command = RefreshCommand::new(body.refresh_token).map_err(AuthError::from)?;

    state
        .auth_service
        .refresh(command)
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, pair.into()))
}

/// HTTP request body for token refresh (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    refresh_token: String,
}
