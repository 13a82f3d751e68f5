use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extension type to store the authenticated caller in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
    /// Normalized authorities from the access token
    pub authorities: Vec<String>,
}

impl AuthenticatedPrincipal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// Middleware that validates bearer tokens and adds the principal to request extensions
pub async fn authenticate<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let claims = state.tokens.validate(token).map_err(|e| {
        tracing::warn!(reason = %e, "Bearer token rejected");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    // A token that validated carries a non-blank subject
    let subject = claims.subject().map(str::to_string).ok_or_else(|| {
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let authorities = state.tokens.extract_authorities(token).map_err(|e| {
        tracing::warn!(reason = %e, "Failed to extract authorities");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedPrincipal {
        subject,
        authorities,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    match auth_str.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request(header: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/api/demo");
        if let Some(value) = header {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let req = request(Some("Bearer a.b.c"));
        assert_eq!(extract_token_from_header(&req).unwrap(), "a.b.c");
    }

    #[test]
    fn test_extract_rejects_missing_or_malformed_header() {
        assert!(extract_token_from_header(&request(None)).is_err());
        assert!(extract_token_from_header(&request(Some("Basic dXNlcjpwdw=="))).is_err());
        assert!(extract_token_from_header(&request(Some("Bearer "))).is_err());
    }

    #[test]
    fn test_has_authority() {
        let principal = AuthenticatedPrincipal {
            subject: "a@x.com".to_string(),
            authorities: vec!["ROLE_USER".to_string(), "ROLE_profile:read".to_string()],
        };
        assert!(principal.has_authority("ROLE_USER"));
        assert!(!principal.has_authority("ROLE_ADMIN"));
    }
}
