//! Publication executor: turns approved drafts into published artifacts.
//!
//! Both operations write the transient status before starting external
//! work and write the revert edge on the failure path, so a crash
//! mid-operation leaves the topic in a recoverable approved state (the
//! sweep's staleness check covers the crash-between-writes window).

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;

use pressroom_core::artifacts::{ArticleArtifacts, LinkedinArtifacts, TopicArtifacts};
use pressroom_core::error::CoreError;
use pressroom_core::pipeline::TopicStatus;
use pressroom_core::slug::slugify;
use pressroom_core::types::DbId;
use pressroom_db::models::content::{ContentDraft, CreateContentDraft};
use pressroom_db::models::status::ContentType;
use pressroom_db::models::topic::Topic;
use pressroom_db::repositories::{ContentRepo, TopicRepo};
use pressroom_social::publisher::{PostRequest, SocialPublisher};

use crate::error::{PipelineError, PipelineResult};
use crate::indexing::IndexingNotifier;

/// Languages every article ships in, in publish order.
pub const LANGUAGES: [&str; 2] = ["en", "ar"];

/// Result of [`Publisher::publish_article`].
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePublishResult {
    pub topic_id: DbId,
    pub status: &'static str,
    pub slug: String,
    pub url_en: String,
    pub url_ar: String,
    /// True when the topic was already published and this call was a no-op.
    pub already_published: bool,
}

/// Result of [`Publisher::publish_social_post`].
///
/// `success` means the post is committed to the owned record. Delivery to
/// the external platform may still have failed, in which case `warning`
/// says so and `permalink` is absent.
#[derive(Debug, Clone, Serialize)]
pub struct SocialPublishResult {
    pub topic_id: DbId,
    pub status: &'static str,
    pub success: bool,
    pub permalink: Option<String>,
    pub warning: Option<String>,
}

/// Executes publish operations against the owned site.
pub struct Publisher {
    /// Site origin, e.g. `https://example.com`. Published article URLs are
    /// `{site_base_url}/{lang}/blog/{slug}`.
    site_base_url: String,
    notifier: IndexingNotifier,
}

impl Publisher {
    pub fn new(site_base_url: String, notifier: IndexingNotifier) -> Self {
        Self {
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
            notifier,
        }
    }

    /// Canonical URL for a published article.
    fn article_url(&self, language: &str, slug: &str) -> String {
        format!("{}/{language}/blog/{slug}", self.site_base_url)
    }

    /// Publish the approved article drafts for a topic to the owned site.
    ///
    /// Idempotent: a topic already in `published` returns its existing
    /// URLs without touching any draft. A hard failure mid-publish reverts
    /// the topic to `article_approved` and surfaces the error.
    pub async fn publish_article(
        &self,
        pool: &PgPool,
        topic_id: DbId,
    ) -> PipelineResult<ArticlePublishResult> {
        let topic = require_topic(pool, topic_id).await?;
        let status = topic.status()?;

        if status == TopicStatus::Published {
            return Ok(already_published(&topic));
        }
        if !matches!(
            status,
            TopicStatus::ArticleReady | TopicStatus::ArticleApproved
        ) {
            return Err(CoreError::PreconditionFailed(format!(
                "topic {} is {}, expected article_ready or article_approved",
                topic.id,
                status.name()
            ))
            .into());
        }

        // Validate both drafts before entering the transient state so a
        // missing draft never needs a revert.
        let mut drafts = Vec::with_capacity(LANGUAGES.len());
        for language in LANGUAGES {
            let draft = ContentRepo::find_for_topic(pool, topic.id, ContentType::Article, language)
                .await?
                .filter(|d| !d.body.trim().is_empty())
                .ok_or_else(|| {
                    CoreError::PreconditionFailed(format!(
                        "topic {} has no non-empty {language} article draft",
                        topic.id
                    ))
                })?;
            drafts.push(draft);
        }

        let slug = slugify(&drafts[0].title);

        let topic = TopicRepo::transition(pool, topic.id, status, TopicStatus::Publishing, &topic.artifacts())
            .await?
            .ok_or_else(|| {
                CoreError::PreconditionFailed(format!(
                    "topic {} was modified concurrently",
                    topic_id
                ))
            })?;

        match self.stamp_drafts(pool, &drafts, &slug).await {
            Ok(stamped) => {
                // Best-effort: a bounced ping never fails the publish.
                for draft in &stamped {
                    if let Some(url) = &draft.url {
                        self.notifier.notify(url).await;
                    }
                }

                let mut artifacts = topic.artifacts();
                artifacts.merge(TopicArtifacts {
                    article: Some(ArticleArtifacts {
                        slug: Some(slug.clone()),
                        url_en: stamped[0].url.clone(),
                        url_ar: stamped[1].url.clone(),
                        draft_id_en: Some(stamped[0].id),
                        draft_id_ar: Some(stamped[1].id),
                        published_at: Some(Utc::now()),
                    }),
                    ..Default::default()
                });

                let published = TopicRepo::transition(
                    pool,
                    topic.id,
                    TopicStatus::Publishing,
                    TopicStatus::Published,
                    &artifacts,
                )
                .await?
                .ok_or_else(|| {
                    CoreError::Internal(format!(
                        "topic {} left publishing state mid-operation",
                        topic.id
                    ))
                })?;

                tracing::info!(
                    topic_id = published.id,
                    slug = %slug,
                    "Article published in both languages"
                );

                Ok(ArticlePublishResult {
                    topic_id: published.id,
                    status: TopicStatus::Published.name(),
                    slug,
                    url_en: stamped[0].url.clone().unwrap_or_default(),
                    url_ar: stamped[1].url.clone().unwrap_or_default(),
                    already_published: false,
                })
            }
            Err(e) => {
                // Revert edge: back to the stable approved state. If this
                // write also fails the staleness sweep recovers the topic.
                let reverted = TopicRepo::transition(
                    pool,
                    topic.id,
                    TopicStatus::Publishing,
                    TopicStatus::ArticleApproved,
                    &topic.artifacts(),
                )
                .await;
                if let Err(revert_err) = reverted {
                    tracing::error!(
                        topic_id = topic.id,
                        error = %revert_err,
                        "Failed to revert topic after publish failure"
                    );
                }
                tracing::error!(topic_id = topic.id, error = %e, "Article publish failed");
                Err(e)
            }
        }
    }

    /// Stamp both language drafts as published. Any error aborts and is
    /// handled by the caller's revert path.
    async fn stamp_drafts(
        &self,
        pool: &PgPool,
        drafts: &[ContentDraft],
        slug: &str,
    ) -> PipelineResult<Vec<ContentDraft>> {
        let mut stamped = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let url = self.article_url(&draft.language, slug);
            match ContentRepo::stamp_published(pool, draft.id, slug, &url).await {
                Ok(updated) => stamped.push(updated),
                Err(e) => {
                    ContentRepo::record_publish_failure(pool, draft.id, &e.to_string())
                        .await
                        .ok();
                    return Err(e.into());
                }
            }
        }
        Ok(stamped)
    }

    /// Publish a LinkedIn post for one language of a published article.
    ///
    /// The post is committed to the owned record before the network call,
    /// so content survives even when LinkedIn bounces. Delivery failure
    /// leaves the topic in its approved state with a warning; the caller
    /// retries delivery manually.
    pub async fn publish_social_post(
        &self,
        pool: &PgPool,
        social: &SocialPublisher,
        topic_id: DbId,
        language: &str,
        user_id: DbId,
    ) -> PipelineResult<SocialPublishResult> {
        let topic = require_topic(pool, topic_id).await?;
        let status = topic.status()?;

        if !matches!(
            status,
            TopicStatus::LinkedinReady | TopicStatus::LinkedinApproved
        ) {
            return Err(CoreError::PreconditionFailed(format!(
                "topic {} is {}, expected linkedin_ready or linkedin_approved",
                topic.id,
                status.name()
            ))
            .into());
        }

        let artifacts = topic.artifacts();
        let linkedin = artifacts.linkedin.clone().unwrap_or_default();
        let body = match language {
            "ar" => linkedin.post_body_ar.clone(),
            _ => linkedin.post_body_en.clone(),
        }
        .ok_or_else(|| {
            CoreError::PreconditionFailed(format!(
                "topic {} has no generated {language} post body",
                topic.id
            ))
        })?;

        let article = artifacts.article.clone().unwrap_or_default();
        let article_url = match language {
            "ar" => article.url_ar.clone(),
            _ => article.url_en.clone(),
        }
        .ok_or_else(|| {
            CoreError::PreconditionFailed(format!(
                "topic {} has no published {language} article URL",
                topic.id
            ))
        })?;

        // Commit to the owned record first: the draft row outlives any
        // network outcome.
        let draft = ContentRepo::upsert(
            pool,
            &CreateContentDraft {
                topic_id: topic.id,
                content_type_id: ContentType::SocialPost.id(),
                language: language.to_string(),
                title: topic.title.clone(),
                body: body.clone(),
            },
        )
        .await?;
        let slug = article.slug.as_deref().unwrap_or("social-post");
        let draft = ContentRepo::stamp_published(pool, draft.id, slug, &article_url).await?;

        let outcome = social
            .post(
                pool,
                user_id,
                &PostRequest {
                    text: body,
                    url: article_url,
                    images: Vec::new(),
                },
            )
            .await;

        if outcome.success {
            let permalink = outcome.permalink.unwrap_or_default();
            ContentRepo::mark_posted(pool, draft.id, &permalink).await?;

            let mut merged = topic.artifacts();
            merged.merge(TopicArtifacts {
                linkedin: Some(LinkedinArtifacts {
                    permalink: Some(permalink.clone()),
                    posted_at: Some(Utc::now()),
                    ..Default::default()
                }),
                ..Default::default()
            });

            let published = TopicRepo::transition(
                pool,
                topic.id,
                status,
                TopicStatus::LinkedinPublished,
                &merged,
            )
            .await?
            .ok_or_else(|| {
                CoreError::PreconditionFailed(format!(
                    "topic {} was modified concurrently",
                    topic.id
                ))
            })?;

            tracing::info!(topic_id = published.id, permalink = %permalink, "LinkedIn post delivered");

            Ok(SocialPublishResult {
                topic_id: published.id,
                status: TopicStatus::LinkedinPublished.name(),
                success: true,
                permalink: Some(permalink),
                warning: None,
            })
        } else {
            let error = outcome.error.unwrap_or_else(|| "unknown error".into());
            ContentRepo::record_delivery_error(pool, draft.id, &error).await?;

            // Record the error on the topic without advancing its status.
            let mut merged = topic.artifacts();
            merged.merge(TopicArtifacts {
                linkedin: Some(LinkedinArtifacts {
                    last_error: Some(error.clone()),
                    ..Default::default()
                }),
                ..Default::default()
            });
            TopicRepo::save_artifacts(pool, topic.id, &merged).await?;

            tracing::warn!(
                topic_id = topic.id,
                error = %error,
                "Post committed locally but LinkedIn delivery failed"
            );

            Ok(SocialPublishResult {
                topic_id: topic.id,
                status: status.name(),
                success: true,
                permalink: None,
                warning: Some(format!(
                    "post saved to the site record, but LinkedIn delivery failed ({error}); retry publishing to LinkedIn manually"
                )),
            })
        }
    }
}

/// Load a topic or fail with `NotFound`.
async fn require_topic(pool: &PgPool, topic_id: DbId) -> PipelineResult<Topic> {
    TopicRepo::find_by_id(pool, topic_id)
        .await?
        .ok_or_else(|| {
            PipelineError::Core(CoreError::NotFound {
                entity: "Topic",
                id: topic_id,
            })
        })
}

/// Build the no-op result for a topic that is already published.
fn already_published(topic: &Topic) -> ArticlePublishResult {
    let article = topic.artifacts().article.unwrap_or_default();
    ArticlePublishResult {
        topic_id: topic.id,
        status: TopicStatus::Published.name(),
        slug: article.slug.unwrap_or_default(),
        url_en: article.url_en.unwrap_or_default(),
        url_ar: article.url_ar.unwrap_or_default(),
        already_published: true,
    }
}
