use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pressroom_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = pressroom_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    pressroom_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection established");

    let credential_key = std::env::var("CREDENTIAL_KEY").expect("CREDENTIAL_KEY must be set");
    let site_base_url =
        std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());

    let social = SocialPublisher::new(
        LinkedInClient::new(None),
        CredentialCipher::new(&credential_key),
        OAuthConfig::from_env(),
    );
    let publisher = Publisher::new(site_base_url, IndexingNotifier::from_env());

    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();

    let worker = tokio::spawn(pressroom_worker::run(
        pool,
        publisher,
        social,
        SweepConfig::from_env(),
        pressroom_worker::interval_from_env(),
        loop_cancel,
    ));

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c");
    tracing::info!("Shutdown signal received");
    cancel.cancel();
    worker.await.expect("Worker task panicked");
}
