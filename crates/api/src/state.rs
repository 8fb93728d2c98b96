use std::sync::Arc;

use pressroom_pipeline::publisher::Publisher;
use pressroom_pipeline::sweep::SweepConfig;
use pressroom_social::publisher::SocialPublisher;

use crate::config::ServerConfig;
use crate::generator::DraftGenerator;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pressroom_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Publication executor for the owned site.
    pub publisher: Arc<Publisher>,
    /// LinkedIn connection and delivery.
    pub social: Arc<SocialPublisher>,
    /// External AI drafting collaborator.
    pub generator: Arc<dyn DraftGenerator>,
    /// Sweep tuning used by the sweep endpoint.
    pub sweep_config: Arc<SweepConfig>,
}
