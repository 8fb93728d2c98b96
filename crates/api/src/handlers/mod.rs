//! HTTP handlers, one module per resource.

pub mod generation;
pub mod publish;
pub mod schedule;
pub mod social;
pub mod topic;
