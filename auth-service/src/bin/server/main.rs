use std::sync::Arc;

use auth::TokenManager;
use auth_service::config::Config;
use auth_service::domain::identity::models::AuthSettings;
use auth_service::domain::identity::ports::IdentityStore;
use auth_service::domain::identity::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::credentials::PasswordCredentialVerifier;
use auth_service::outbound::repositories::InMemoryIdentityStore;
use auth_service::outbound::repositories::PostgresIdentityStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        database = config.database.url.is_some(),
        access_token_expiration_ms = config.jwt.access_token_expiration_ms,
        refresh_token_expiration_ms = config.jwt.refresh_token_expiration_ms,
        default_role = %config.auth.default_role,
        refresh_authorities = ?config.auth.refresh_authorities,
        "Configuration loaded"
    );

    // Key and policy failures abort before the listener is bound
    let tokens = Arc::new(config.jwt.token_manager()?);
    let settings = AuthSettings::from(&config.auth);

    match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let store = Arc::new(PostgresIdentityStore::new(pg_pool));
            serve(&config, store, tokens, settings).await
        }
        None => {
            tracing::warn!("No database.url configured, identities are kept in memory");
            let store = Arc::new(InMemoryIdentityStore::with_default_roles());
            serve(&config, store, tokens, settings).await
        }
    }
}

async fn serve<IS: IdentityStore>(
    config: &Config,
    store: Arc<IS>,
    tokens: Arc<TokenManager>,
    settings: AuthSettings,
) -> Result<(), anyhow::Error> {
    let verifier = Arc::new(PasswordCredentialVerifier::new(Arc::clone(&store)));
    let auth_service = Arc::new(AuthService::new(
        store,
        verifier,
        Arc::clone(&tokens),
        settings,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, tokens);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}
