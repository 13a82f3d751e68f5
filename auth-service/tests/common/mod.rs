use std::sync::Arc;

use auth::TokenManager;
use auth_service::config::JwtConfig;
use auth_service::domain::identity::models::AuthSettings;
use auth_service::domain::identity::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::credentials::PasswordCredentialVerifier;
use auth_service::outbound::repositories::InMemoryIdentityStore;

/// Base64 of "test-secret-key-for-jwt-signing-at-least-32-bytes"
pub const TEST_SECRET: &str = "dGVzdC1zZWNyZXQta2V5LWZvci1qd3Qtc2lnbmluZy1hdC1sZWFzdC0zMi1ieXRlcw==";

/// Test application that spawns a real server on the in-memory store
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryIdentityStore>,
    pub tokens: Arc<TokenManager>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(AuthSettings::default()).await
    }

    pub async fn spawn_with(settings: AuthSettings) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let jwt = JwtConfig {
            secret: Some(TEST_SECRET.to_string()),
            access_token_expiration_ms: 900_000,
            refresh_token_expiration_ms: 604_800_000,
        };
        let tokens = Arc::new(jwt.token_manager().expect("Failed to build token manager"));

        let store = Arc::new(InMemoryIdentityStore::with_default_roles());
        let verifier = Arc::new(PasswordCredentialVerifier::new(Arc::clone(&store)));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store),
            verifier,
            Arc::clone(&tokens),
            settings,
        ));

        let router = create_router(auth_service, Arc::clone(&tokens));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            store,
            tokens,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an identity and return the response body
    pub async fn register(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/register")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }
}
