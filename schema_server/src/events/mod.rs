//! Incoming events the automation subscribes to.
//!
//! Push events come from GitHub (directly or relayed); impact events come
//! from the fingerprint service once it has diffed two commits.

pub mod impact;
pub mod push;
