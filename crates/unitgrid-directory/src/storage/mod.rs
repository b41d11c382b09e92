//! Storage abstraction for the unit directory
//!
//! This module provides a trait-based abstraction over the unit table,
//! with an in-memory backend (default) and a PostgreSQL backend behind the
//! `postgres` feature.
//!
//! Backends only have to provide atomic primitives:
//! - `create_unit` must check identity uniqueness and insert in one step
//! - `commit_issuance` must update token, address and updated_at together
//!
//! The find-or-create algorithm itself lives in [`UnitStore::resolve_or_create`]
//! so every backend resolves creation races the same way.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use tracing::{debug, info};
use unitgrid_core::Unit;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Unit not found: {0}")]
    NotFound(String),

    #[error("Unit already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Outcome of [`UnitStore::resolve_or_create`]
#[derive(Debug, Clone)]
pub struct Resolved {
    pub unit: Unit,
    /// Whether this call created the record
    pub created: bool,
}

/// Storage backend trait for unit records
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait UnitStore: Send + Sync + Debug {
    /// Fetch a unit by identity
    async fn find_unit(&self, identity: &str) -> Result<Option<Unit>, StorageError>;

    /// Insert a new unit
    ///
    /// Returns `AlreadyExists` if a unit with the same identity is present.
    /// The uniqueness check and the insert must be a single atomic step.
    async fn create_unit(&self, unit: Unit) -> Result<(), StorageError>;

    /// Atomically set token, address and updated_at for an existing unit
    async fn commit_issuance(
        &self,
        identity: &str,
        token: &str,
        address: &str,
        at: DateTime<Utc>,
    ) -> Result<Unit, StorageError>;

    /// Number of registered units
    async fn count_units(&self) -> Result<usize, StorageError>;

    /// Find the unit for `identity`, creating it if absent
    ///
    /// If a concurrent caller creates the same identity between our lookup
    /// and our insert, the insert fails with `AlreadyExists` and the
    /// winner's record is fetched and returned instead.
    async fn resolve_or_create(
        &self,
        identity: &str,
        public_key: &str,
        address: &str,
    ) -> Result<Resolved, StorageError> {
        if let Some(unit) = self.find_unit(identity).await? {
            return Ok(Resolved { unit, created: false });
        }

        let unit = Unit::new(identity, public_key, address);
        match self.create_unit(unit.clone()).await {
            Ok(()) => {
                info!(identity = %identity, address = %address, "Created new unit");
                Ok(Resolved { unit, created: true })
            }
            Err(StorageError::AlreadyExists(_)) => {
                debug!(identity = %identity, "Lost creation race, re-fetching unit");
                match self.find_unit(identity).await? {
                    Some(unit) => Ok(Resolved { unit, created: false }),
                    None => Err(StorageError::Database(format!(
                        "unit {} reported as existing but could not be fetched",
                        identity
                    ))),
                }
            }
            Err(e) => Err(e),
        }
    }
}
