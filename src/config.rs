use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NotizError, Result};
use crate::remote::{HttpRemote, RemoteAdapter};
use crate::storage::{FileKvStore, KeyValueStore, LocalAdapter, MemoryKvStore, SqliteKvStore};
use crate::sync::{Backend, LoadOrder, Policy, Reconciler};

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "notiz.yaml";

/// Which on-device store backs the local adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalStoreKind {
    #[default]
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotizConfig {
    pub policy: Policy,
    pub load_order: LoadOrder,
    /// Base URL of the backup service; no remote when unset.
    pub api_base: Option<String>,
    pub data_dir: PathBuf,
    pub local_store: LocalStoreKind,
    pub save_debounce_ms: u64,
    pub finalize_timeout_ms: u64,
    pub remote_timeout_ms: u64,
    pub beacon_limit_bytes: usize,
    pub local_quota_bytes: Option<usize>,
}

impl Default for NotizConfig {
    fn default() -> Self {
        Self {
            policy: Policy::OfflineFirst,
            load_order: LoadOrder::RemoteFirst,
            api_base: None,
            data_dir: PathBuf::from(".notiz"),
            local_store: LocalStoreKind::File,
            save_debounce_ms: 600,
            finalize_timeout_ms: 1000,
            remote_timeout_ms: 5000,
            beacon_limit_bytes: 60 * 1024,
            local_quota_bytes: None,
        }
    }
}

impl NotizConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read `path`, or fall back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    fn open_local(&self) -> Result<LocalAdapter> {
        let store: Box<dyn KeyValueStore> = match self.local_store {
            LocalStoreKind::File => {
                let store = FileKvStore::open(&self.data_dir)?;
                let store = match self.local_quota_bytes {
                    Some(limit) => store.with_quota(limit),
                    None => store,
                };
                Box::new(store)
            }
            LocalStoreKind::Sqlite => Box::new(SqliteKvStore::open(&self.data_dir)?),
            LocalStoreKind::Memory => Box::new(MemoryKvStore::new()),
        };
        Ok(LocalAdapter::new(store))
    }

    fn open_remote(&self, base: &str, beacons: bool) -> Result<RemoteAdapter> {
        let mut client = HttpRemote::new(base, Duration::from_millis(self.remote_timeout_ms))?;
        if !beacons {
            client = client.without_beacon();
        }
        Ok(RemoteAdapter::new(Arc::new(client))
            .with_debounce(Duration::from_millis(self.save_debounce_ms))
            .with_finalize_timeout(Duration::from_millis(self.finalize_timeout_ms))
            .with_beacon_limit(self.beacon_limit_bytes))
    }

    /// Pick the backend from policy and endpoint.
    ///
    /// `beacons` controls whether finalize may use detached requests; a
    /// process about to exit should pass `false`.
    pub fn build_backend(&self, beacons: bool) -> Result<Backend> {
        match (self.policy, self.api_base.as_deref()) {
            (Policy::OfflineFirst, None) => Ok(Backend::LocalOnly(self.open_local()?)),
            (Policy::OfflineFirst, Some(base)) => Ok(Backend::Mirrored {
                local: self.open_local()?,
                remote: self.open_remote(base, beacons)?,
            }),
            (Policy::ServerAuthoritative, Some(base)) => {
                Ok(Backend::RemoteOnly(self.open_remote(base, beacons)?))
            }
            (Policy::ServerAuthoritative, None) => Err(NotizError::Config(
                "server-authoritative policy needs api_base".to_string(),
            )),
        }
    }

    pub fn build_reconciler(&self, beacons: bool) -> Result<Reconciler> {
        Ok(Reconciler::new(self.build_backend(beacons)?).with_load_order(self.load_order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = NotizConfig::default();
        assert_eq!(config.policy, Policy::OfflineFirst);
        assert_eq!(config.load_order, LoadOrder::RemoteFirst);
        assert_eq!(config.save_debounce_ms, 600);
        assert_eq!(config.beacon_limit_bytes, 61440);
        assert!(config.api_base.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "policy: server-authoritative\n\
                    api_base: http://localhost:7001/api\n\
                    local_store: sqlite\n";
        let config = NotizConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.policy, Policy::ServerAuthoritative);
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:7001/api"));
        assert_eq!(config.local_store, LocalStoreKind::Sqlite);
        assert_eq!(config.save_debounce_ms, 600);
    }

    #[test]
    fn test_unknown_policy_is_error() {
        assert!(NotizConfig::from_yaml("policy: sometimes\n").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = NotizConfig::load_or_default(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, NotizConfig::default());
    }

    #[test]
    fn test_backend_selection() {
        let tmp = TempDir::new().unwrap();
        let mut config = NotizConfig {
            data_dir: tmp.path().join("data"),
            ..Default::default()
        };
        assert!(matches!(config.build_backend(false).unwrap(), Backend::LocalOnly(_)));

        config.api_base = Some("http://localhost:7001/api".to_string());
        assert!(matches!(
            config.build_backend(false).unwrap(),
            Backend::Mirrored { .. }
        ));

        config.policy = Policy::ServerAuthoritative;
        assert!(matches!(config.build_backend(false).unwrap(), Backend::RemoteOnly(_)));

        config.api_base = None;
        assert!(matches!(config.build_backend(false), Err(NotizError::Config(_))));
    }

    #[test]
    fn test_sqlite_store_is_created_in_data_dir() {
        let tmp = TempDir::new().unwrap();
        let config = NotizConfig {
            data_dir: tmp.path().to_path_buf(),
            local_store: LocalStoreKind::Sqlite,
            ..Default::default()
        };
        config.build_backend(false).unwrap();
        assert!(tmp.path().join("notiz-proto-db.sqlite").exists());
    }
}
