//! In-process periodic invoker for the sweep.
//!
//! Deployments with an external cron hitting `POST /schedule/sweep` do
//! not need this binary; it exists for environments without one. Each
//! tick runs a single sweep -- the sweep itself is never self-scheduling.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use pressroom_pipeline::publisher::Publisher;
use pressroom_pipeline::sweep::{run_sweep, SweepConfig};
use pressroom_social::publisher::SocialPublisher;

/// Default tick cadence.
const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Load the tick cadence from `SWEEP_INTERVAL_SECS`.
pub fn interval_from_env() -> Duration {
    let secs = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_INTERVAL_SECS);
    Duration::from_secs(secs)
}

/// Run the sweep loop until `cancel` is triggered.
///
/// A failing tick is logged and the loop keeps going; a missed tick just
/// means due jobs execute on the next one.
pub async fn run(
    pool: PgPool,
    publisher: Publisher,
    social: SocialPublisher,
    config: SweepConfig,
    tick: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = tick.as_secs(),
        budget_secs = config.budget_secs,
        "Sweep worker started"
    );

    let mut interval = tokio::time::interval(tick);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Sweep worker stopping");
                break;
            }
            _ = interval.tick() => {
                match run_sweep(&pool, &publisher, &social, &config).await {
                    Ok(report) => {
                        if report.executed > 0 || report.requeued > 0 {
                            tracing::info!(
                                executed = report.executed,
                                succeeded = report.succeeded,
                                failed = report.failed,
                                requeued = report.requeued,
                                "Sweep tick done"
                            );
                        } else {
                            tracing::debug!("Sweep tick: nothing due");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Sweep tick failed");
                    }
                }
            }
        }
    }
}
