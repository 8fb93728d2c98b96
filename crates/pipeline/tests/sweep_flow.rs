//! Integration tests for the sweep: due-time gating, exactly-once
//! execution, cancellation, per-job isolation, and the wall-clock budget.

use chrono::{Duration, Utc};
use pressroom_core::crypto::CredentialCipher;
use pressroom_core::pipeline::TopicStatus;
use pressroom_core::types::DbId;
use pressroom_db::models::content::CreateContentDraft;
use pressroom_db::models::schedule::CreateSchedule;
use pressroom_db::models::status::{ContentType, ScheduleStatus};
use pressroom_db::models::topic::CreateTopic;
use pressroom_db::repositories::{ContentRepo, ScheduleRepo, TopicRepo};
use pressroom_pipeline::indexing::IndexingNotifier;
use pressroom_pipeline::publisher::Publisher;
use pressroom_pipeline::sweep::{run_sweep, SweepConfig, TARGET_ARTICLE, TARGET_LINKEDIN};
use pressroom_social::linkedin::LinkedInClient;
use pressroom_social::oauth::OAuthConfig;
use pressroom_social::publisher::SocialPublisher;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn publisher() -> Publisher {
    Publisher::new(
        "https://example.com".to_string(),
        IndexingNotifier::new(None),
    )
}

fn offline_social() -> SocialPublisher {
    SocialPublisher::new(
        LinkedInClient::with_base_urls(
            "http://127.0.0.1:1".to_string(),
            "http://127.0.0.1:1".to_string(),
            2,
        ),
        CredentialCipher::new("test-key"),
        OAuthConfig {
            client_id: "test".into(),
            client_secret: "test".into(),
            redirect_uri: "http://localhost/callback".into(),
        },
    )
}

fn config() -> SweepConfig {
    SweepConfig::default()
}

/// Create a topic that is ready for an article publish.
async fn seed_publishable_topic(pool: &PgPool) -> DbId {
    let topic = TopicRepo::create(
        pool,
        &CreateTopic {
            title: "Scheduled Article".to_string(),
            description: None,
            source_id: None,
            keywords: None,
            priority: None,
        },
    )
    .await
    .unwrap();

    use TopicStatus::*;
    let mut current = Pending;
    for next in [PromptReady, PromptApproved, ArticleGenerating, ArticleReady, ArticleApproved] {
        TopicRepo::transition(pool, topic.id, current, next, &topic.artifacts())
            .await
            .unwrap()
            .unwrap();
        current = next;
    }

    for (language, body) in [("en", "The english body."), ("ar", "النص العربي")] {
        ContentRepo::upsert(
            pool,
            &CreateContentDraft {
                topic_id: topic.id,
                content_type_id: ContentType::Article.id(),
                language: language.to_string(),
                title: "Scheduled Article".to_string(),
                body: body.to_string(),
            },
        )
        .await
        .unwrap();
    }

    topic.id
}

async fn schedule(pool: &PgPool, content_id: DbId, run_at: chrono::DateTime<Utc>, target: &str) -> DbId {
    ScheduleRepo::create(
        pool,
        &CreateSchedule {
            content_id,
            run_at,
            targets: vec![target.to_string()],
            requested_by: 42,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Due-time gating and exactly-once execution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn future_job_is_not_executed(pool: PgPool) {
    let topic_id = seed_publishable_topic(&pool).await;
    let job_id = schedule(&pool, topic_id, Utc::now() + Duration::hours(1), TARGET_ARTICLE).await;

    let report = run_sweep(&pool, &publisher(), &offline_social(), &config())
        .await
        .unwrap();

    assert_eq!(report.executed, 0);
    let job = ScheduleRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status_id, ScheduleStatus::Pending.id());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn due_article_job_executes_exactly_once(pool: PgPool) {
    let topic_id = seed_publishable_topic(&pool).await;
    let job_id = schedule(&pool, topic_id, Utc::now() - Duration::minutes(1), TARGET_ARTICLE).await;

    let report = run_sweep(&pool, &publisher(), &offline_social(), &config())
        .await
        .unwrap();
    assert_eq!(report.executed, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);

    let topic = TopicRepo::find_by_id(&pool, topic_id).await.unwrap().unwrap();
    assert_eq!(topic.status().unwrap(), TopicStatus::Published);
    let job = ScheduleRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status_id, ScheduleStatus::Completed.id());

    // A second sweep finds nothing to do.
    let again = run_sweep(&pool, &publisher(), &offline_social(), &config())
        .await
        .unwrap();
    assert_eq!(again.executed, 0);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn schedule_then_cancel_never_executes(pool: PgPool) {
    let topic_id = seed_publishable_topic(&pool).await;
    let job_id = schedule(&pool, topic_id, Utc::now() - Duration::minutes(1), TARGET_ARTICLE).await;

    ScheduleRepo::cancel_pending(&pool, topic_id).await.unwrap();

    let report = run_sweep(&pool, &publisher(), &offline_social(), &config())
        .await
        .unwrap();
    assert_eq!(report.executed, 0);

    let job = ScheduleRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status_id, ScheduleStatus::Cancelled.id());
    let topic = TopicRepo::find_by_id(&pool, topic_id).await.unwrap().unwrap();
    assert_eq!(topic.status().unwrap(), TopicStatus::ArticleApproved);
}

// ---------------------------------------------------------------------------
// Per-job isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn one_failing_job_does_not_abort_the_rest(pool: PgPool) {
    let good_topic = seed_publishable_topic(&pool).await;
    let bad_topic = seed_publishable_topic(&pool).await;

    // The bad job fails fast on an unknown target channel.
    schedule(&pool, bad_topic, Utc::now() - Duration::minutes(2), "myspace").await;
    let good_job = schedule(&pool, good_topic, Utc::now() - Duration::minutes(1), TARGET_ARTICLE).await;

    let report = run_sweep(&pool, &publisher(), &offline_social(), &config())
        .await
        .unwrap();
    assert_eq!(report.executed, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);

    let good = ScheduleRepo::find_by_id(&pool, good_job).await.unwrap().unwrap();
    assert_eq!(good.status_id, ScheduleStatus::Completed.id());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn linkedin_job_without_credential_is_recorded_as_failed(pool: PgPool) {
    let topic_id = seed_publishable_topic(&pool).await;
    publisher().publish_article(&pool, topic_id).await.unwrap();

    // Approve the LinkedIn stage with a generated body.
    use pressroom_core::artifacts::{LinkedinArtifacts, TopicArtifacts};
    let mut current = TopicStatus::Published;
    for next in [TopicStatus::LinkedinReady, TopicStatus::LinkedinApproved] {
        let mut artifacts = TopicRepo::find_by_id(&pool, topic_id)
            .await
            .unwrap()
            .unwrap()
            .artifacts();
        artifacts.merge(TopicArtifacts {
            linkedin: Some(LinkedinArtifacts {
                post_body_en: Some("Read our new article".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        TopicRepo::transition(&pool, topic_id, current, next, &artifacts)
            .await
            .unwrap()
            .unwrap();
        current = next;
    }

    let job_id = schedule(&pool, topic_id, Utc::now() - Duration::minutes(1), TARGET_LINKEDIN).await;

    let report = run_sweep(&pool, &publisher(), &offline_social(), &config())
        .await
        .unwrap();
    assert_eq!(report.executed, 1);
    assert_eq!(report.failed, 1);

    // The job records the delivery failure for a manual retry, but the
    // post itself is committed to the owned record.
    let job = ScheduleRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status_id, ScheduleStatus::Failed.id());
    assert!(job.last_error.as_deref().unwrap().contains("NotConnected"));

    let draft = ContentRepo::find_for_topic(&pool, topic_id, ContentType::SocialPost, "en")
        .await
        .unwrap()
        .unwrap();
    assert!(draft.url.is_some());
}

// ---------------------------------------------------------------------------
// Wall-clock budget
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn exhausted_budget_leaves_jobs_pending(pool: PgPool) {
    let topic_id = seed_publishable_topic(&pool).await;
    let job_id = schedule(&pool, topic_id, Utc::now() - Duration::minutes(1), TARGET_ARTICLE).await;

    let zero_budget = SweepConfig {
        budget_secs: 0,
        ..SweepConfig::default()
    };
    let report = run_sweep(&pool, &publisher(), &offline_social(), &zero_budget)
        .await
        .unwrap();

    assert_eq!(report.executed, 0);
    assert_eq!(report.skipped, 1);
    let job = ScheduleRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status_id, ScheduleStatus::Pending.id());
}
