//! Repository Module
//!
//! SQL for the tenant-owned tables. Every function here expects to run on a
//! connection checked out through [`crate::db::TenantGateway::with_tenant`];
//! tenant filtering goes through the connection-local `_tenant_scope` marker,
//! never through a caller-supplied id. Do not call these with a bare pool
//! connection; without the marker they match zero rows.

pub mod dining_table;
pub mod inventory;
pub mod module_config;
pub mod order;
pub mod staff;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
