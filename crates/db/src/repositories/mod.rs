//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod content_repo;
pub mod schedule_repo;
pub mod social_credential_repo;
pub mod topic_repo;

pub use content_repo::ContentRepo;
pub use schedule_repo::ScheduleRepo;
pub use social_credential_repo::SocialCredentialRepo;
pub use topic_repo::TopicRepo;
