//! Reconciliation between the in-memory board, the local store and the
//! remote backup service.
//!
//! At startup the configured sources are asked in [`LoadOrder`]; the first one
//! holding a non-empty board wins. With no data anywhere the seed board is
//! used and written to whichever side is authoritative. After that every
//! mutation is written through: synchronously to the local store and
//! debounced to the remote service, depending on the [`Backend`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::entity::{seed, Record};
use crate::error::NotizError;
use crate::remote::{FinalizeReport, RemoteAdapter};
use crate::storage::LocalAdapter;

/// Which side holds the truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Local store is authoritative, the remote service is a silent mirror.
    #[default]
    OfflineFirst,
    /// Remote service is authoritative; nothing is kept on the device and
    /// file import/export is disabled.
    ServerAuthoritative,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::OfflineFirst => write!(f, "offline-first"),
            Policy::ServerAuthoritative => write!(f, "server-authoritative"),
        }
    }
}

impl FromStr for Policy {
    type Err = NotizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offline-first" => Ok(Policy::OfflineFirst),
            "server-authoritative" => Ok(Policy::ServerAuthoritative),
            other => Err(NotizError::Config(format!(
                "unknown policy '{other}' (expected offline-first or server-authoritative)"
            ))),
        }
    }
}

/// Which source is asked first at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadOrder {
    #[default]
    RemoteFirst,
    LocalFirst,
}

impl FromStr for LoadOrder {
    type Err = NotizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote-first" => Ok(LoadOrder::RemoteFirst),
            "local-first" => Ok(LoadOrder::LocalFirst),
            other => Err(NotizError::Config(format!(
                "unknown load order '{other}' (expected remote-first or local-first)"
            ))),
        }
    }
}

/// Adapters a deployment persists through.
pub enum Backend {
    LocalOnly(LocalAdapter),
    RemoteOnly(RemoteAdapter),
    Mirrored {
        local: LocalAdapter,
        remote: RemoteAdapter,
    },
}

impl Backend {
    pub fn policy(&self) -> Policy {
        match self {
            Backend::RemoteOnly(_) => Policy::ServerAuthoritative,
            Backend::LocalOnly(_) | Backend::Mirrored { .. } => Policy::OfflineFirst,
        }
    }

    fn local(&self) -> Option<&LocalAdapter> {
        match self {
            Backend::LocalOnly(local) | Backend::Mirrored { local, .. } => Some(local),
            Backend::RemoteOnly(_) => None,
        }
    }

    fn remote(&self) -> Option<&RemoteAdapter> {
        match self {
            Backend::RemoteOnly(remote) | Backend::Mirrored { remote, .. } => Some(remote),
            Backend::LocalOnly(_) => None,
        }
    }

    fn remote_mut(&mut self) -> Option<&mut RemoteAdapter> {
        match self {
            Backend::RemoteOnly(remote) | Backend::Mirrored { remote, .. } => Some(remote),
            Backend::LocalOnly(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
}

/// Where the startup board came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Local,
    Seed,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote => write!(f, "remote"),
            Source::Local => write!(f, "local"),
            Source::Seed => write!(f, "seed"),
        }
    }
}

pub struct Loaded {
    pub records: Vec<Record>,
    pub source: Source,
}

pub struct Reconciler {
    backend: Backend,
    load_order: LoadOrder,
    phase: Phase,
}

impl Reconciler {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            load_order: LoadOrder::default(),
            phase: Phase::Uninitialized,
        }
    }

    pub fn with_load_order(mut self, order: LoadOrder) -> Self {
        self.load_order = order;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn policy(&self) -> Policy {
        self.backend.policy()
    }

    pub fn load_order(&self) -> LoadOrder {
        self.load_order
    }

    /// Import and export only make sense while the device copy is authoritative.
    pub fn allows_file_transfer(&self) -> bool {
        self.policy() == Policy::OfflineFirst
    }

    /// Establish the startup board. Never fails: the worst case is the seed.
    pub async fn load(&mut self) -> Loaded {
        self.phase = Phase::Loading;

        let sources = match self.load_order {
            LoadOrder::RemoteFirst => [Source::Remote, Source::Local],
            LoadOrder::LocalFirst => [Source::Local, Source::Remote],
        };

        let mut loaded = None;
        for source in sources {
            let found = match source {
                Source::Remote => self.load_remote().await,
                _ => self.load_local(),
            };
            if let Some(records) = found {
                loaded = Some(Loaded { records, source });
                break;
            }
        }

        let loaded = match loaded {
            Some(loaded) => loaded,
            None => {
                let records = seed();
                self.persist_seed(&records).await;
                Loaded {
                    records,
                    source: Source::Seed,
                }
            }
        };

        info!(
            source = %loaded.source,
            blocks = loaded.records.len(),
            policy = %self.policy(),
            "board ready"
        );
        self.phase = Phase::Ready;
        loaded
    }

    async fn load_remote(&self) -> Option<Vec<Record>> {
        let remote = self.backend.remote()?;
        match remote.load().await {
            Ok(records) if !records.is_empty() => {
                if let Some(local) = self.backend.local() {
                    local.write_all(&records);
                }
                Some(records)
            }
            Ok(_) => {
                debug!("remote board is empty");
                None
            }
            Err(e) => {
                debug!(error = %e, "remote load failed, falling back");
                None
            }
        }
    }

    fn load_local(&self) -> Option<Vec<Record>> {
        let records = self.backend.local()?.read_all()?;
        if records.is_empty() {
            debug!("local board is empty");
            return None;
        }
        Some(records)
    }

    async fn persist_seed(&mut self, records: &[Record]) {
        match self.policy() {
            Policy::OfflineFirst => {
                if let Some(local) = self.backend.local() {
                    local.write_all(records);
                }
            }
            Policy::ServerAuthoritative => {
                if let Some(remote) = self.backend.remote_mut() {
                    if let Err(e) = remote.save_now(records).await {
                        warn!(error = %e, "could not store seed board remotely");
                    }
                }
            }
        }
    }

    /// Write-through after a mutation. The remote side is debounced.
    pub fn save(&mut self, records: &[Record]) {
        if self.phase != Phase::Ready {
            warn!(phase = ?self.phase, "save ignored before the board is ready");
            return;
        }
        match &mut self.backend {
            Backend::LocalOnly(local) => local.write_all(records),
            Backend::RemoteOnly(remote) => remote.request_save(records.to_vec()),
            Backend::Mirrored { local, remote } => {
                local.write_all(records);
                remote.request_save(records.to_vec());
            }
        }
    }

    /// Send a debounced remote save whose quiet period has elapsed.
    pub async fn tick(&mut self) -> bool {
        match self.backend.remote_mut() {
            Some(remote) => remote.flush_due().await,
            None => false,
        }
    }

    /// Wait for the debounced remote save to come due and send it.
    /// Returns `false` at once when no remote save is pending.
    pub async fn wait_due(&mut self) -> bool {
        match self.backend.remote_mut() {
            Some(remote) => remote.wait_due().await,
            None => false,
        }
    }

    /// End of session: hand the latest board to the remote side.
    pub async fn finalize(&mut self, records: &[Record]) -> Option<FinalizeReport> {
        let remote = self.backend.remote_mut()?;
        Some(remote.finalize(records).await)
    }
}
