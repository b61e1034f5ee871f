#![forbid(unsafe_code)]

pub mod keys;
pub mod progress;
pub mod repository;
pub mod sqlite;

pub use progress::ProgressStore;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
