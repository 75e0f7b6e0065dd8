pub mod app;
pub mod board;
pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod remote;
pub mod storage;
pub mod sync;

pub use app::App;
pub use config::NotizConfig;
pub use error::{NotizError, Result};
pub use sync::Reconciler;
