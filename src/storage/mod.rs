mod kv;
mod local;
mod sqlite_kv;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use local::{LocalAdapter, STORAGE_KEY};
pub use sqlite_kv::{SqliteKvStore, DB_NAME, STORE_NAME};
