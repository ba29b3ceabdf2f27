//! Local key-value persistence.
//!
//! A tiny string-to-string store, the desktop stand-in for a browser's local
//! storage. Reads never fail (absent and unreadable look the same); writes
//! report errors so callers can keep working in memory.
//!
//! ## Module Structure
//!
//! - [`file_store`] - JSON file backed store used by the application
//! - [`memory`] - In-memory store for tests and headless use
//! - [`shared`] - Cloneable handle so several owners share one store

mod file_store;
mod memory;
mod shared;

pub use file_store::FileStore;
pub use memory::MemoryStore;
pub use shared::SharedStore;

use bevy::prelude::*;
use thiserror::Error;

use crate::constants::STORAGE_QUOTA_BYTES;

/// Why a write to the store did not happen.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode storage contents: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("storage is unavailable")]
    Unavailable,
}

/// Synchronous get/set string store over fixed keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Bytes a set of entries occupies for quota purposes.
fn entries_size<'a>(entries: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    entries.map(|(k, v)| k.len() + v.len()).sum()
}

/// The application's store, shared by the drawing session and the marker book.
#[derive(Resource, Clone)]
pub struct AppStorage(pub SharedStore<FileStore>);

/// System set for opening the store (consumers run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageOpened;

fn open_storage(mut commands: Commands) {
    let store = FileStore::open(crate::paths::storage_file(), Some(STORAGE_QUOTA_BYTES));
    info!("Using storage file {:?}", store.path());
    commands.insert_resource(AppStorage(SharedStore::new(store)));
}

pub struct StoragePlugin;

impl Plugin for StoragePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, open_storage.in_set(StorageOpened));
    }
}
