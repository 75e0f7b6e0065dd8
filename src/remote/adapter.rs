use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use super::client::{RemoteClient, Route};
use super::debounce::{Clock, Debouncer, SystemClock};
use crate::entity::{normalize_items, Record};
use crate::error::Result;

pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(600);
pub const DEFAULT_FINALIZE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Snapshots above this size skip the beacon and go through the keepalive path.
pub const BEACON_LIMIT_BYTES: usize = 60 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeTransport {
    /// Detached request that may outlive the process.
    Beacon,
    /// Awaited request bounded by the finalize timeout.
    Keepalive,
}

/// What [`RemoteAdapter::finalize`] attempted. Delivery is never confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    pub snapshot: Option<FinalizeTransport>,
    pub push: FinalizeTransport,
    pub payload_bytes: usize,
}

/// Remote side of persistence: load, debounced save and the finalize signal.
///
/// Failures never leave this type except from [`RemoteAdapter::load`] and
/// [`RemoteAdapter::save_now`]; everything else logs and carries on.
pub struct RemoteAdapter {
    client: Arc<dyn RemoteClient>,
    clock: Arc<dyn Clock>,
    debouncer: Debouncer<Vec<Record>>,
    beacon_limit: usize,
    finalize_timeout: Duration,
}

impl RemoteAdapter {
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            client,
            debouncer: Debouncer::new(DEFAULT_SAVE_DEBOUNCE, clock.clone()),
            clock,
            beacon_limit: BEACON_LIMIT_BYTES,
            finalize_timeout: DEFAULT_FINALIZE_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.debouncer = Debouncer::new(self.debouncer.window(), clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debouncer = Debouncer::new(window, self.clock.clone());
        self
    }

    pub fn with_beacon_limit(mut self, bytes: usize) -> Self {
        self.beacon_limit = bytes;
        self
    }

    pub fn with_finalize_timeout(mut self, timeout: Duration) -> Self {
        self.finalize_timeout = timeout;
        self
    }

    /// Load the remote board. A payload that is not a list reads as empty.
    pub async fn load(&self) -> Result<Vec<Record>> {
        match self.client.load().await? {
            Value::Array(items) => Ok(normalize_items(&items)),
            _ => {
                debug!("remote payload is not a list");
                Ok(Vec::new())
            }
        }
    }

    /// Schedule `records` for the next debounced save, replacing any earlier snapshot.
    pub fn request_save(&mut self, records: Vec<Record>) {
        self.debouncer.trigger(records);
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Sleep until the pending snapshot is due, then send it.
    ///
    /// Returns `false` at once when nothing is pending. Dropping the future
    /// cancels the wait; a later [`RemoteAdapter::request_save`] reschedules
    /// and the owner awaits this again.
    pub async fn wait_due(&mut self) -> bool {
        let Some(deadline) = self.next_deadline() else {
            return false;
        };
        let remaining = deadline.saturating_duration_since(self.clock.now());
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
        self.flush_due().await
    }

    /// Send the pending snapshot if the debounce window has elapsed.
    /// Returns whether a request was made.
    pub async fn flush_due(&mut self) -> bool {
        match self.debouncer.take_due() {
            Some(records) => {
                self.send(&records).await;
                true
            }
            None => false,
        }
    }

    /// Send the pending snapshot now, whatever its deadline.
    pub async fn flush(&mut self) -> bool {
        match self.debouncer.take_pending() {
            Some(records) => {
                self.send(&records).await;
                true
            }
            None => false,
        }
    }

    /// Undebounced save, used when the remote is authoritative for seed data.
    pub async fn save_now(&mut self, records: &[Record]) -> Result<()> {
        let body = serde_json::to_string(records)?;
        self.client.save(body).await
    }

    async fn send(&self, records: &[Record]) {
        let body = match serde_json::to_string(records) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "could not encode blocks for remote save");
                return;
            }
        };
        match self.client.save(body).await {
            Ok(()) => debug!(blocks = records.len(), "remote save done"),
            Err(e) => warn!(error = %e, "remote save failed"),
        }
    }

    /// Best-effort hand-off at session end.
    ///
    /// Any pending debounced snapshot is dropped in favour of `latest`, which
    /// is sent on its own so a tail edit is not lost to an in-flight save.
    pub async fn finalize(&mut self, latest: &[Record]) -> FinalizeReport {
        self.debouncer.take_pending();

        let (snapshot, payload_bytes) = match serde_json::to_string(latest) {
            Ok(body) => {
                let len = body.len();
                let transport = if len > self.beacon_limit {
                    self.keepalive_save(body).await;
                    FinalizeTransport::Keepalive
                } else if self.client.beacon(Route::Save, body.clone()) {
                    FinalizeTransport::Beacon
                } else {
                    self.keepalive_save(body).await;
                    FinalizeTransport::Keepalive
                };
                (Some(transport), len)
            }
            Err(e) => {
                warn!(error = %e, "could not encode blocks for finalize");
                (None, 0)
            }
        };

        let push = if self.client.beacon(Route::Push, String::new()) {
            FinalizeTransport::Beacon
        } else {
            match tokio::time::timeout(self.finalize_timeout, self.client.push()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(error = %e, "push signal failed"),
                Err(_) => debug!("push signal timed out"),
            }
            FinalizeTransport::Keepalive
        };

        FinalizeReport {
            snapshot,
            push,
            payload_bytes,
        }
    }

    async fn keepalive_save(&self, body: String) {
        match tokio::time::timeout(self.finalize_timeout, self.client.save(body)).await {
            Ok(Ok(())) => debug!("final snapshot sent"),
            Ok(Err(e)) => warn!(error = %e, "final snapshot failed"),
            Err(_) => warn!(
                timeout_ms = self.finalize_timeout.as_millis() as u64,
                "final snapshot timed out"
            ),
        }
    }
}
