//! Integration tests for topic creation and conditional pipeline
//! transitions against a real database.

use pressroom_core::artifacts::{PromptArtifacts, TopicArtifacts};
use pressroom_core::pipeline::TopicStatus;
use pressroom_db::models::status::TopicSource;
use pressroom_db::models::topic::CreateTopic;
use pressroom_db::repositories::TopicRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_topic(title: &str) -> CreateTopic {
    CreateTopic {
        title: title.to_string(),
        description: None,
        source_id: None,
        keywords: Some(vec!["lease".into(), "renewal".into()]),
        priority: Some(5),
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_starts_pending_and_unlocked(pool: PgPool) {
    let topic = TopicRepo::create(&pool, &new_topic("Lease renewals"))
        .await
        .unwrap();

    assert_eq!(topic.status().unwrap(), TopicStatus::Pending);
    assert_eq!(topic.source_id, TopicSource::Manual.id());
    assert_eq!(topic.keywords.0, vec!["lease", "renewal"]);
    assert_eq!(topic.priority, 5);
    assert!(!topic.locked);
    assert!(topic.prompt_artifacts.is_none());
}

// ---------------------------------------------------------------------------
// Conditional transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn transition_persists_status_and_artifacts(pool: PgPool) {
    let topic = TopicRepo::create(&pool, &new_topic("Lease renewals"))
        .await
        .unwrap();

    let mut artifacts = topic.artifacts();
    artifacts.prompt = Some(PromptArtifacts {
        prompt: Some("Write about lease renewals".into()),
        ..Default::default()
    });

    let updated = TopicRepo::transition(
        &pool,
        topic.id,
        TopicStatus::Pending,
        TopicStatus::PromptReady,
        &artifacts,
    )
    .await
    .unwrap()
    .expect("transition from pending should succeed");

    assert_eq!(updated.status().unwrap(), TopicStatus::PromptReady);
    assert_eq!(
        updated.artifacts().prompt.unwrap().prompt.as_deref(),
        Some("Write about lease renewals")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn transition_with_wrong_expected_status_is_a_lost_race(pool: PgPool) {
    let topic = TopicRepo::create(&pool, &new_topic("Lease renewals"))
        .await
        .unwrap();

    // The row is in Pending, so a writer expecting PromptReady loses.
    let result = TopicRepo::transition(
        &pool,
        topic.id,
        TopicStatus::PromptReady,
        TopicStatus::PromptApproved,
        &TopicArtifacts::default(),
    )
    .await
    .unwrap();

    assert!(result.is_none());

    let reloaded = TopicRepo::find_by_id(&pool, topic.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status().unwrap(), TopicStatus::Pending);
}

// ---------------------------------------------------------------------------
// Advisory lock
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn lock_is_exclusive_until_released(pool: PgPool) {
    let topic = TopicRepo::create(&pool, &new_topic("Lease renewals"))
        .await
        .unwrap();

    let locked = TopicRepo::lock(&pool, topic.id, 1).await.unwrap().unwrap();
    assert!(locked.locked);
    assert_eq!(locked.locked_by, Some(1));

    // Second editor cannot acquire it.
    assert!(TopicRepo::lock(&pool, topic.id, 2).await.unwrap().is_none());

    // Only the holder can release it.
    assert!(TopicRepo::unlock(&pool, topic.id, 2).await.unwrap().is_none());
    let released = TopicRepo::unlock(&pool, topic.id, 1).await.unwrap().unwrap();
    assert!(!released.locked);
    assert_eq!(released.locked_by, None);
}

// ---------------------------------------------------------------------------
// Stale transient recovery
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn stale_publishing_topic_reverts_to_article_approved(pool: PgPool) {
    let topic = TopicRepo::create(&pool, &new_topic("Lease renewals"))
        .await
        .unwrap();

    // Force the row into Publishing directly; the repo's conditional
    // transition would require driving the whole pipeline.
    sqlx::query("UPDATE topics SET status_id = $2 WHERE id = $1")
        .bind(topic.id)
        .bind(TopicStatus::Publishing.id())
        .execute(&pool)
        .await
        .unwrap();

    // A cutoff in the future makes the fresh row count as stale.
    let cutoff = chrono::Utc::now() + chrono::Duration::hours(1);
    let reverted = TopicRepo::revert_stale_transients(&pool, cutoff)
        .await
        .unwrap();
    assert_eq!(reverted, 1);

    let reloaded = TopicRepo::find_by_id(&pool, topic.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status().unwrap(), TopicStatus::ArticleApproved);
}

#[sqlx::test(migrations = "./migrations")]
async fn fresh_transient_topic_is_not_reverted(pool: PgPool) {
    let topic = TopicRepo::create(&pool, &new_topic("Lease renewals"))
        .await
        .unwrap();

    sqlx::query("UPDATE topics SET status_id = $2 WHERE id = $1")
        .bind(topic.id)
        .bind(TopicStatus::ArticleGenerating.id())
        .execute(&pool)
        .await
        .unwrap();

    let cutoff = chrono::Utc::now() - chrono::Duration::minutes(5);
    let reverted = TopicRepo::revert_stale_transients(&pool, cutoff)
        .await
        .unwrap();
    assert_eq!(reverted, 0);

    let reloaded = TopicRepo::find_by_id(&pool, topic.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status().unwrap(), TopicStatus::ArticleGenerating);
}
