use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pressroom_api::config::ServerConfig;
use pressroom_api::generator::HttpDraftGenerator;
use pressroom_api::router::build_app_router;
use pressroom_api::state::AppState;
use pressroom_core::crypto::CredentialCipher;
use pressroom_pipeline::indexing::IndexingNotifier;
use pressroom_pipeline::publisher::Publisher;
use pressroom_pipeline::sweep::SweepConfig;
use pressroom_social::linkedin::LinkedInClient;
use pressroom_social::oauth::OAuthConfig;
use pressroom_social::publisher::SocialPublisher;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pressroom_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = pressroom_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    pressroom_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    pressroom_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Pipeline components ---
    let credential_key =
        std::env::var("CREDENTIAL_KEY").expect("CREDENTIAL_KEY must be set");
    let social = Arc::new(SocialPublisher::new(
        LinkedInClient::new(None),
        CredentialCipher::new(&credential_key),
        OAuthConfig::from_env(),
    ));
    let publisher = Arc::new(Publisher::new(
        config.site_base_url.clone(),
        IndexingNotifier::from_env(),
    ));
    let generator = Arc::new(HttpDraftGenerator::from_env());
    let sweep_config = Arc::new(SweepConfig::from_env());

    // --- Router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        publisher,
        social,
        generator,
        sweep_config,
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
