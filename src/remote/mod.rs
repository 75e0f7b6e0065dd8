//! Remote backup service: HTTP transport, debounced saves and the
//! end-of-session finalize signal.

mod adapter;
mod client;
mod debounce;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{
    FinalizeReport, FinalizeTransport, RemoteAdapter, BEACON_LIMIT_BYTES,
    DEFAULT_FINALIZE_TIMEOUT, DEFAULT_SAVE_DEBOUNCE,
};
pub use client::{HttpRemote, RemoteClient, Route, DEFAULT_API_BASE};
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
