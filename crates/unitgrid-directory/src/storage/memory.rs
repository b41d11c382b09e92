//! In-memory storage backend
//!
//! Default storage implementation using an in-memory hashmap.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use unitgrid_core::Unit;

use super::{StorageError, UnitStore};

/// In-memory unit store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    units: RwLock<HashMap<String, Unit>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Unit>>, StorageError> {
        self.units
            .read()
            .map_err(|_| StorageError::Database("unit table lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Unit>>, StorageError> {
        self.units
            .write()
            .map_err(|_| StorageError::Database("unit table lock poisoned".into()))
    }
}

#[async_trait]
impl UnitStore for MemoryStore {
    async fn find_unit(&self, identity: &str) -> Result<Option<Unit>, StorageError> {
        Ok(self.read()?.get(identity).cloned())
    }

    async fn create_unit(&self, unit: Unit) -> Result<(), StorageError> {
        let mut units = self.write()?;
        match units.entry(unit.identity.clone()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists(unit.identity)),
            Entry::Vacant(slot) => {
                slot.insert(unit);
                Ok(())
            }
        }
    }

    async fn commit_issuance(
        &self,
        identity: &str,
        token: &str,
        address: &str,
        at: DateTime<Utc>,
    ) -> Result<Unit, StorageError> {
        let mut units = self.write()?;
        let unit = units
            .get_mut(identity)
            .ok_or_else(|| StorageError::NotFound(identity.to_string()))?;

        unit.token = token.to_string();
        unit.address = address.to_string();
        unit.updated_at = at;
        Ok(unit.clone())
    }

    async fn count_units(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }
}
