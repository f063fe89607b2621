//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Push notification providers (FCM)
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod push;
pub mod repositories;
