use std::path::PathBuf;

use thiserror::Error;

use crate::models::store::Store;

pub mod json;
pub mod migrations;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load store from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save store to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize store to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Store file was created by a newer version of studytrack (version {0}). Please upgrade studytrack to open this file."
    )]
    FutureVersion(u32),

    #[error("Store file has unsupported version {0}. This version of studytrack cannot read this file.")]
    UnsupportedVersion(u32),

    #[error("Store file has a version field that is not a number: {0}")]
    InvalidVersion(String),
}

pub trait Storage {
    fn load(&self) -> Result<Store, StorageError>;
    fn save(&self, store: &Store) -> Result<(), StorageError>;
}

/// Loads the store, starting from an empty one if it cannot be read.
/// The unreadable file is left in place and overwritten on the next save.
pub fn load_or_fresh(storage: &impl Storage) -> Store {
    match storage.load() {
        Ok(mut store) => {
            store.reconcile_level();
            tracing::debug!(
                tasks = store.tasks.len(),
                habits = store.habits.len(),
                points = store.points,
                "loaded store"
            );
            store
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not read store, starting with an empty one");
            Store::default()
        }
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    use super::{Storage, StorageError};
    use crate::models::store::Store;

    /// Keeps the last saved store in memory. Can be told to fail saves.
    #[derive(Default)]
    pub struct MemoryStorage {
        pub saved: RefCell<Option<Store>>,
        pub saves: Cell<usize>,
        pub fail_saves: bool,
    }

    impl MemoryStorage {
        pub fn failing() -> Self {
            Self {
                fail_saves: true,
                ..Self::default()
            }
        }
    }

    impl Storage for MemoryStorage {
        fn load(&self) -> Result<Store, StorageError> {
            Ok(self.saved.borrow().clone().unwrap_or_default())
        }

        fn save(&self, store: &Store) -> Result<(), StorageError> {
            if self.fail_saves {
                return Err(StorageError::SaveFailed {
                    path: PathBuf::from("<memory>"),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.saves.set(self.saves.get() + 1);
            *self.saved.borrow_mut() = Some(store.clone());
            Ok(())
        }
    }
}
