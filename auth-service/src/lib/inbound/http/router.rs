use std::sync::Arc;
use std::time::Duration;

use auth::TokenManager;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::demo::demo;
use super::handlers::demo::demo_admin;
use super::handlers::login::login;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::identity::ports::AuthServicePort;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
    pub tokens: Arc<TokenManager>,
}

// Derived Clone would require S: Clone
impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

pub fn create_router<S: AuthServicePort>(auth_service: Arc<S>, tokens: Arc<TokenManager>) -> Router {
    let state = AppState {
        auth_service,
        tokens,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/refresh", post(refresh::<S>));

    let protected_routes = Router::new()
        .route("/api/demo", get(demo))
        .route("/api/demo/admin", get(demo_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use auth::Principal;
    use auth::SigningKey;
    use auth::TokenClass;
    use auth::TokenPolicy;
    use axum::http::header;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::identity::models::AuthSettings;
    use crate::domain::identity::service::AuthService;
    use crate::outbound::credentials::PasswordCredentialVerifier;
    use crate::outbound::repositories::InMemoryIdentityStore;

    fn tokens() -> Arc<TokenManager> {
        Arc::new(TokenManager::new(
            Arc::new(SigningKey::from_bytes(b"test-secret-key-for-jwt-signing-at-least-32-bytes").unwrap()),
            TokenPolicy::from_millis(60_000, 3_600_000).unwrap(),
        ))
    }

    fn app(tokens: Arc<TokenManager>) -> Router {
        let store = Arc::new(InMemoryIdentityStore::with_default_roles());
        let verifier = Arc::new(PasswordCredentialVerifier::new(Arc::clone(&store)));
        let service = Arc::new(AuthService::new(
            store,
            verifier,
            Arc::clone(&tokens),
            AuthSettings::default(),
        ));
        create_router(service, tokens)
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_demo_requires_bearer_token() {
        let response = app(tokens())
            .oneshot(get_with_token("/api/demo", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["status_code"], 401);
        assert!(body["data"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_demo_with_access_token() {
        let tokens = tokens();
        let token = tokens
            .issue(&Principal::new("a@x.com", ["USER"]), TokenClass::Access)
            .unwrap();

        let response = app(Arc::clone(&tokens))
            .oneshot(get_with_token("/api/demo", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["data"]["message"],
            "Hello! You are authenticated as: a@x.com"
        );
    }

    #[tokio::test]
    async fn test_demo_admin_authority_check() {
        let tokens = tokens();
        let user = tokens
            .issue(&Principal::new("a@x.com", ["USER"]), TokenClass::Access)
            .unwrap();
        let admin = tokens
            .issue(&Principal::new("b@x.com", ["ADMIN"]), TokenClass::Access)
            .unwrap();

        let response = app(Arc::clone(&tokens))
            .oneshot(get_with_token("/api/demo/admin", Some(&user)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app(Arc::clone(&tokens))
            .oneshot(get_with_token("/api/demo/admin", Some(&admin)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_demo_rejects_foreign_token() {
        let foreign = TokenManager::new(
            Arc::new(SigningKey::from_bytes(&[7u8; 32]).unwrap()),
            TokenPolicy::from_millis(60_000, 3_600_000).unwrap(),
        )
        .issue(&Principal::new("a@x.com", ["ADMIN"]), TokenClass::Access)
        .unwrap();

        let response = app(tokens())
            .oneshot(get_with_token("/api/demo", Some(&foreign)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
