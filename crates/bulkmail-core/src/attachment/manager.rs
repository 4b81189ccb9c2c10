//! Attachment list with admission rules and persistence.

use bulkmail_api::AttachmentPart;
use tracing::debug;

use super::model::{Attachment, AttachmentMeta, FileRef};
use crate::store::{DraftStore, KeyValueStore};
use crate::validation::FieldError;

/// Maximum number of attachments per draft.
pub const MAX_ATTACHMENTS: usize = 5;

/// Maximum size of a single attachment (10 MiB).
pub const MAX_ATTACHMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Ordered attachment list of a draft.
///
/// Every mutation re-serializes the whole list to the draft store as
/// placeholder metadata; the bytes of live attachments stay in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentManager {
    items: Vec<Attachment>,
}

impl AttachmentManager {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the list from stored metadata. Every entry is a placeholder.
    #[must_use]
    pub fn restore(metas: Vec<AttachmentMeta>) -> Self {
        Self {
            items: metas.into_iter().map(Attachment::Placeholder).collect(),
        }
    }

    /// All entries in order.
    #[must_use]
    pub fn items(&self) -> &[Attachment] {
        &self.items
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if any entry is metadata-only.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        self.items.iter().any(Attachment::is_placeholder)
    }

    /// How many more files can be admitted.
    #[must_use]
    pub const fn remaining_capacity(&self) -> usize {
        MAX_ATTACHMENTS.saturating_sub(self.items.len())
    }

    /// Multipart payloads of the live entries; placeholders are skipped.
    #[must_use]
    pub fn parts(&self) -> Vec<AttachmentPart> {
        self.items.iter().filter_map(Attachment::to_part).collect()
    }

    /// Metadata of every entry, in order.
    #[must_use]
    pub fn metas(&self) -> Vec<AttachmentMeta> {
        self.items.iter().map(Attachment::meta).collect()
    }

    /// Admits files without touching storage.
    ///
    /// Files over [`MAX_ATTACHMENT_SIZE`] are excluded and reported with a
    /// single error. The remaining files fill the free slots in order; any
    /// beyond the remaining capacity are dropped silently.
    pub fn admit(&mut self, files: Vec<FileRef>) -> Option<FieldError> {
        let offered = files.len();
        let fitting: Vec<FileRef> = files
            .into_iter()
            .filter(|file| file.size <= MAX_ATTACHMENT_SIZE)
            .collect();
        let rejected = fitting.len() < offered;

        let capacity = self.remaining_capacity();
        if fitting.len() > capacity {
            debug!(
                dropped = fitting.len() - capacity,
                "Attachment limit reached, dropping extra files"
            );
        }
        self.items.extend(
            fitting
                .into_iter()
                .take(capacity)
                .map(|file| Attachment::Live(file.into())),
        );

        rejected.then(FieldError::oversized_attachments)
    }

    /// Admits files and persists the resulting list.
    ///
    /// Returns the oversize error, if any file was excluded for its size.
    pub async fn add<S: KeyValueStore>(
        &mut self,
        files: Vec<FileRef>,
        store: &DraftStore<S>,
    ) -> Option<FieldError> {
        let error = self.admit(files);
        store.save_attachments(&self.items).await;
        error
    }

    /// Removes the entry at `index` and persists the remainder.
    ///
    /// Out-of-range indices leave the list untouched.
    pub async fn remove<S: KeyValueStore>(
        &mut self,
        index: usize,
        store: &DraftStore<S>,
    ) -> Option<Attachment> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        store.save_attachments(&self.items).await;
        Some(removed)
    }

    /// Removes every entry and persists the empty list.
    pub async fn clear<S: KeyValueStore>(&mut self, store: &DraftStore<S>) {
        self.items.clear();
        store.save_attachments(&self.items).await;
    }

    /// Drops every entry without touching storage.
    pub(crate) fn reset(&mut self) {
        self.items.clear();
    }
}
