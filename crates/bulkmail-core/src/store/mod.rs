//! Session-scoped key-value persistence.
//!
//! [`KeyValueStore`] is the storage seam: string keys, string values, scoped
//! to one session. [`MemoryStore`] backs tests and throwaway sessions,
//! [`SqliteStore`] keeps sessions across process runs. [`DraftStore`] layers
//! the typed draft fields on top with a best-effort write policy.

mod draft;
mod memory;
mod repository;

pub use draft::{DraftField, DraftStore, StoredDraft, keys};
pub use memory::MemoryStore;
pub use repository::SqliteStore;

use std::future::Future;

use crate::Result;

/// String-keyed, string-valued storage scoped to one session.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value; `None` if the key was never saved or was cleared.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Writes a value, replacing any previous one.
    fn save(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Removes the given keys as one operation.
    ///
    /// A later `load` never observes some of the keys removed and others not.
    fn clear(&self, keys: &[&str]) -> impl Future<Output = Result<()>> + Send;
}
