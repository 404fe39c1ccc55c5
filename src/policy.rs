//! Administrator-supplied VO/FQAN to tenant mapping.
//! The table is loaded once at startup and read-only afterwards; a reload
//! builds a fresh table and swaps the whole structure atomically.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One mapping target. Unknown fields in the JSON value are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyEntry {
    pub tenant: String,
}

/// Flat mapping from a literal FQAN or a bare VO name to a policy entry.
/// Keys are unique; the table has no ordering of its own — precedence comes
/// from the FQAN sequence the VOMS server returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTable {
    entries: HashMap<String, PolicyEntry>,
}

impl PolicyTable {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let entries: HashMap<String, PolicyEntry> =
            serde_json::from_str(json).map_err(|source| ConfigError::Json { source })?;
        Ok(Self { entries })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn lookup(&self, key: &str) -> Option<&PolicyEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared read-only handle to the current policy table. Readers grab an `Arc`
/// snapshot; a reload swaps the snapshot in one step and never mutates a
/// table concurrent readers may hold.
#[derive(Clone)]
pub struct PolicyHandle {
    current: Arc<RwLock<Arc<PolicyTable>>>,
}

impl PolicyHandle {
    pub fn new(table: PolicyTable) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(table))) }
    }

    pub fn load(&self) -> Arc<PolicyTable> {
        self.current.read().clone()
    }

    /// Install a freshly built table, returning the one it replaced.
    pub fn swap(&self, table: PolicyTable) -> Arc<PolicyTable> {
        let next = Arc::new(table);
        let mut slot = self.current.write();
        std::mem::replace(&mut *slot, next)
    }
}
