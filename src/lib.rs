// Infrastructure (shared components)
pub mod config;
pub mod error;
pub mod metrics;
pub mod postgres;
pub mod telemetry;

// Domain
pub mod build;
pub mod template;
