//! LinkedIn integration: OAuth connection flow, sealed credential
//! handling, and post delivery with normalized outcomes.
//!
//! Everything network-variable lives behind [`publisher::SocialPublisher`],
//! which turns auth expiry, rate limits, timeouts, and malformed payloads
//! into a plain [`publisher::PostOutcome`] so callers branch on
//! `outcome.success` instead of catching transport errors.

pub mod linkedin;
pub mod oauth;
pub mod publisher;

/// Platform key used in the `social_credentials` table.
pub const PLATFORM_LINKEDIN: &str = "linkedin";
