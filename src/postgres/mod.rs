//! PostgreSQL persistence module.
//!
//! Provides connection pooling and schema bootstrap for the template repository.

pub mod pool;

pub use pool::{mask_database_url, PostgresPool, PostgresPoolError};
