use serde_json::Value;
use tracing::{debug, warn};

use super::kv::KeyValueStore;
use crate::entity::{normalize_items, Record};
use crate::error::NotizError;

/// Key under which the whole board is stored.
pub const STORAGE_KEY: &str = "vanilla-blocks-v1";

/// Reads and writes the full record list under one fixed key.
///
/// The on-device copy is advisory: a missing, corrupt or wrongly shaped value
/// reads as absent and write failures are logged, never returned.
pub struct LocalAdapter {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl LocalAdapter {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: STORAGE_KEY.to_string(),
        }
    }

    pub fn with_key(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn read_all(&self) -> Option<Vec<Record>> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "local store read failed");
                return None;
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                let err = NotizError::LocalStoreCorrupt(e.to_string());
                warn!(key = %self.key, error = %err, "ignoring local copy");
                return None;
            }
        };

        match value {
            Value::Array(items) => Some(normalize_items(&items)),
            _ => {
                debug!(key = %self.key, "local copy is not a list");
                None
            }
        }
    }

    pub fn write_all(&self, records: &[Record]) {
        let encoded = match serde_json::to_string(records) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "could not encode blocks for local store");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &encoded) {
            warn!(key = %self.key, error = %e, "local store write failed");
        }
    }
}
