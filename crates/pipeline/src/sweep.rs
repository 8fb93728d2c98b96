//! The periodic sweep: claims due scheduled jobs and executes them.
//!
//! The sweep itself is not self-scheduling — an external periodic invoker
//! (the worker binary, or a cron hitting the sweep endpoint) calls
//! [`run_sweep`] on a fixed cadence. Within one invocation, jobs are
//! claimed one at a time through an atomic conditional update, executed
//! with per-job error isolation, and resolved individually, so one bad
//! job never aborts the rest.

use std::time::Instant;

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use pressroom_db::models::schedule::ScheduledJob;
use pressroom_db::repositories::{ScheduleRepo, TopicRepo};
use pressroom_social::publisher::SocialPublisher;

use crate::error::PipelineResult;
use crate::publisher::Publisher;

/// Target channel: publish the article to the owned site.
pub const TARGET_ARTICLE: &str = "article";

/// Target channel: deliver the LinkedIn post.
pub const TARGET_LINKEDIN: &str = "linkedin";

/// Sweep tuning knobs.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Hard wall-clock budget. Jobs not started before it elapses stay
    /// pending for the next invocation (the invoking environment kills
    /// the process shortly after, e.g. at 60s).
    pub budget_secs: u64,
    /// Claims older than this are considered abandoned (process crash
    /// mid-job) and requeued; topics stuck in a transient status this
    /// long are reverted to their stable state.
    pub claim_timeout_secs: i64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            budget_secs: 55,
            claim_timeout_secs: 300,
        }
    }
}

impl SweepConfig {
    /// Load overrides from `SWEEP_BUDGET_SECS` / `SWEEP_CLAIM_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            budget_secs: std::env::var("SWEEP_BUDGET_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.budget_secs),
            claim_timeout_secs: std::env::var("SWEEP_CLAIM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.claim_timeout_secs),
        }
    }
}

/// Aggregate result of one sweep invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Stale claims returned to pending before this sweep's claim loop.
    pub requeued: u64,
    /// Topics recovered from a stuck transient status.
    pub reverted_topics: u64,
    pub executed: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Due jobs left unstarted because the wall-clock budget ran out.
    pub skipped: i64,
}

/// Run one sweep over the scheduled-job queue.
pub async fn run_sweep(
    pool: &PgPool,
    publisher: &Publisher,
    social: &SocialPublisher,
    config: &SweepConfig,
) -> PipelineResult<SweepReport> {
    let started = Instant::now();
    let now = Utc::now();
    let stale_cutoff = now - Duration::seconds(config.claim_timeout_secs);

    let mut report = SweepReport {
        requeued: ScheduleRepo::requeue_stale(pool, stale_cutoff).await?,
        reverted_topics: TopicRepo::revert_stale_transients(pool, stale_cutoff).await?,
        ..Default::default()
    };

    loop {
        if started.elapsed().as_secs() >= config.budget_secs {
            report.skipped = ScheduleRepo::count_due(pool, now).await?;
            tracing::warn!(
                skipped = report.skipped,
                "Sweep budget exhausted; leaving due jobs for the next tick"
            );
            break;
        }

        let Some(job) = ScheduleRepo::claim_next_due(pool, now).await? else {
            break;
        };
        report.executed += 1;

        match execute_job(pool, publisher, social, &job).await {
            Ok(()) => {
                ScheduleRepo::mark_completed(pool, job.id).await?;
                report.succeeded += 1;
                tracing::info!(job_id = job.id, content_id = job.content_id, "Scheduled job executed");
            }
            Err(error) => {
                ScheduleRepo::mark_failed(pool, job.id, &error).await?;
                report.failed += 1;
                tracing::error!(job_id = job.id, content_id = job.content_id, error = %error, "Scheduled job failed");
            }
        }
    }

    tracing::info!(
        executed = report.executed,
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        requeued = report.requeued,
        "Sweep complete"
    );
    Ok(report)
}

/// Execute one claimed job across its target channels.
///
/// Errors are stringified here — the job row's `last_error` is the record
/// of what went wrong, and a failure in one job must not surface as a
/// sweep-level error.
async fn execute_job(
    pool: &PgPool,
    publisher: &Publisher,
    social: &SocialPublisher,
    job: &ScheduledJob,
) -> Result<(), String> {
    for target in job.targets.0.iter() {
        match target.as_str() {
            TARGET_ARTICLE => {
                publisher
                    .publish_article(pool, job.content_id)
                    .await
                    .map_err(|e| format!("article: {e}"))?;
            }
            TARGET_LINKEDIN => {
                let language = linkedin_language(pool, job.content_id).await?;
                let result = publisher
                    .publish_social_post(pool, social, job.content_id, &language, job.requested_by)
                    .await
                    .map_err(|e| format!("linkedin: {e}"))?;
                // The post is committed locally either way, but a bounced
                // delivery still needs a visible manual retry.
                if let Some(warning) = result.warning {
                    return Err(format!("linkedin: {warning}"));
                }
            }
            other => return Err(format!("unknown target channel: {other}")),
        }
    }
    Ok(())
}

/// Pick the language to post for a scheduled LinkedIn delivery: English
/// when a body exists for it, otherwise Arabic.
async fn linkedin_language(pool: &PgPool, topic_id: i64) -> Result<String, String> {
    let topic = TopicRepo::find_by_id(pool, topic_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("topic {topic_id} not found"))?;
    let linkedin = topic.artifacts().linkedin.unwrap_or_default();
    if linkedin.post_body_en.is_some() {
        Ok("en".to_string())
    } else {
        Ok("ar".to_string())
    }
}
