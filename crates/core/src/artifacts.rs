//! Typed per-stage workflow artifacts.
//!
//! Each pipeline stage produces its own struct, stored as a JSONB column on
//! the topic row. Merging is additive: a patch only ever fills or updates
//! fields, it never clears data written by an earlier stage.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Output of the prompt-drafting stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptArtifacts {
    /// The generated article prompt.
    pub prompt: Option<String>,
    /// Which model produced it.
    pub model: Option<String>,
    pub generated_at: Option<Timestamp>,
}

/// Output of the article publish stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleArtifacts {
    /// URL-safe slug shared by both language URLs.
    pub slug: Option<String>,
    pub url_en: Option<String>,
    pub url_ar: Option<String>,
    pub draft_id_en: Option<DbId>,
    pub draft_id_ar: Option<DbId>,
    pub published_at: Option<Timestamp>,
}

/// Output of the LinkedIn drafting and posting stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedinArtifacts {
    pub post_body_en: Option<String>,
    pub post_body_ar: Option<String>,
    /// Permalink returned by LinkedIn on a successful post.
    pub permalink: Option<String>,
    pub posted_at: Option<Timestamp>,
    /// Last delivery error. Presence means the post is committed locally
    /// but still needs a manual retry against LinkedIn.
    pub last_error: Option<String>,
}

/// All stage artifacts carried by a topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicArtifacts {
    pub prompt: Option<PromptArtifacts>,
    pub article: Option<ArticleArtifacts>,
    pub linkedin: Option<LinkedinArtifacts>,
}

/// A partial update produced by one stage.
pub type ArtifactPatch = TopicArtifacts;

macro_rules! merge_fields {
    ($dst:expr, $src:expr, $( $field:ident ),+ $(,)?) => {
        $( if $src.$field.is_some() { $dst.$field = $src.$field; } )+
    };
}

impl PromptArtifacts {
    fn merge(&mut self, patch: Self) {
        merge_fields!(self, patch, prompt, model, generated_at);
    }
}

impl ArticleArtifacts {
    fn merge(&mut self, patch: Self) {
        merge_fields!(
            self,
            patch,
            slug,
            url_en,
            url_ar,
            draft_id_en,
            draft_id_ar,
            published_at
        );
    }
}

impl LinkedinArtifacts {
    fn merge(&mut self, patch: Self) {
        merge_fields!(
            self,
            patch,
            post_body_en,
            post_body_ar,
            permalink,
            posted_at,
            last_error
        );
    }
}

impl TopicArtifacts {
    /// Merge a patch additively. Fields present in the patch win; fields
    /// absent from the patch keep their existing value.
    pub fn merge(&mut self, patch: ArtifactPatch) {
        if let Some(p) = patch.prompt {
            match &mut self.prompt {
                Some(existing) => existing.merge(p),
                None => self.prompt = Some(p),
            }
        }
        if let Some(a) = patch.article {
            match &mut self.article {
                Some(existing) => existing.merge(a),
                None => self.article = Some(a),
            }
        }
        if let Some(l) = patch.linkedin {
            match &mut self.linkedin {
                Some(existing) => existing.merge(l),
                None => self.linkedin = Some(l),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_patch(slug: &str) -> ArtifactPatch {
        ArtifactPatch {
            article: Some(ArticleArtifacts {
                slug: Some(slug.into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn merge_fills_empty_stage() {
        let mut artifacts = TopicArtifacts::default();
        artifacts.merge(article_patch("lease-renewals"));
        assert_eq!(
            artifacts.article.unwrap().slug.as_deref(),
            Some("lease-renewals")
        );
    }

    #[test]
    fn merge_updates_own_stage_field() {
        let mut artifacts = TopicArtifacts::default();
        artifacts.merge(article_patch("old-slug"));
        artifacts.merge(article_patch("new-slug"));
        assert_eq!(artifacts.article.unwrap().slug.as_deref(), Some("new-slug"));
    }

    #[test]
    fn merge_never_clears_existing_fields() {
        let mut artifacts = TopicArtifacts::default();
        artifacts.merge(ArtifactPatch {
            article: Some(ArticleArtifacts {
                slug: Some("kept".into()),
                url_en: Some("https://example.com/en/blog/kept".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        // A later patch for the same stage with absent fields keeps them.
        artifacts.merge(ArtifactPatch {
            article: Some(ArticleArtifacts {
                published_at: Some(chrono::Utc::now()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let article = artifacts.article.unwrap();
        assert_eq!(article.slug.as_deref(), Some("kept"));
        assert!(article.url_en.is_some());
        assert!(article.published_at.is_some());
    }

    #[test]
    fn merge_leaves_other_stages_untouched() {
        let mut artifacts = TopicArtifacts {
            prompt: Some(PromptArtifacts {
                prompt: Some("the prompt".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        artifacts.merge(article_patch("slug"));
        assert_eq!(
            artifacts.prompt.unwrap().prompt.as_deref(),
            Some("the prompt")
        );
    }

    #[test]
    fn serde_round_trip() {
        let artifacts = TopicArtifacts {
            linkedin: Some(LinkedinArtifacts {
                post_body_en: Some("Read our new article".into()),
                last_error: Some("timeout".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&artifacts).unwrap();
        let back: TopicArtifacts = serde_json::from_value(json).unwrap();
        assert_eq!(back, artifacts);
    }
}
