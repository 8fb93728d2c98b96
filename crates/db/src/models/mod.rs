//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Request/update DTOs used by the repositories

pub mod content;
pub mod schedule;
pub mod social;
pub mod status;
pub mod topic;
