//! The publishing pipeline: article publication, social delivery, search
//! indexing pings, and the scheduled-job sweep.

pub mod error;
pub mod indexing;
pub mod publisher;
pub mod sweep;
