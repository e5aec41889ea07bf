//! Automation data models: all request-scoped, nothing is persisted.

pub mod deploy;
pub mod message;
pub mod repo;
pub mod report;
