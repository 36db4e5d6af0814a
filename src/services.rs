use crate::{models::store::Store, storage::Storage};

pub mod habits;
pub mod tasks;

/// Writes the whole store. A failed write is logged and the in-memory
/// change is kept, so the next successful save still captures it.
fn persist(store: &Store, storage: &impl Storage) {
    match storage.save(store) {
        Ok(()) => tracing::debug!("store saved"),
        Err(e) => tracing::error!(error = %e, "failed to save store, changes are kept in memory"),
    }
}
