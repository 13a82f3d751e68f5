use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedPrincipal;

const ADMIN_AUTHORITY: &str = "ROLE_ADMIN";

/// Greets any caller holding a valid access token.
pub async fn demo(
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> ApiSuccess<DemoResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        DemoResponseData {
            message: format!("Hello! You are authenticated as: {}", principal.subject),
        },
    )
}

/// Greets callers holding `ROLE_ADMIN`; everyone else gets 403.
pub async fn demo_admin(
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> Result<ApiSuccess<DemoResponseData>, ApiError> {
    if !principal.has_authority(ADMIN_AUTHORITY) {
        tracing::warn!(subject = %principal.subject, "Admin access denied");
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        DemoResponseData {
            message: format!("Hello admin! You are authenticated as: {}", principal.subject),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoResponseData {
    pub message: String,
}
