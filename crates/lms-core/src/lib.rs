//! Service plumbing shared by LMS binaries: config loading, tracing, middleware, health.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
