//! Typed draft persistence on top of a [`KeyValueStore`].
//!
//! Writes are best-effort: a failed write is logged and dropped, and the
//! caller's in-memory state stays authoritative for the rest of the session.
//! Reads that fail or hold malformed JSON are treated as absent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::KeyValueStore;
use crate::attachment::{Attachment, AttachmentMeta};
use crate::send::SendOutcome;

/// Storage keys used by the draft store.
pub mod keys {
    /// Subject text.
    pub const SUBJECT: &str = "lp_subject";
    /// Body text.
    pub const BODY: &str = "lp_body";
    /// Comma-separated recipients.
    pub const RECIPIENTS: &str = "lp_emails";
    /// JSON array of attachment metadata.
    pub const ATTACHMENTS: &str = "lp_attachments_meta";
    /// JSON array of send outcomes.
    pub const RESULTS: &str = "lp_results";

    /// Every key owned by the draft.
    pub const ALL: [&str; 5] = [SUBJECT, BODY, RECIPIENTS, ATTACHMENTS, RESULTS];
}

/// Text fields of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Subject line.
    Subject,
    /// Message body.
    Body,
    /// Recipient list.
    Recipients,
}

impl DraftField {
    /// Storage key of the field.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Subject => keys::SUBJECT,
            Self::Body => keys::BODY,
            Self::Recipients => keys::RECIPIENTS,
        }
    }
}

/// Whatever the store holds for the draft. Absent fields were never saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredDraft {
    /// Saved subject.
    pub subject: Option<String>,
    /// Saved body.
    pub body: Option<String>,
    /// Saved recipient text.
    pub recipients: Option<String>,
    /// Saved attachment metadata.
    pub attachments: Option<Vec<AttachmentMeta>>,
    /// Saved send outcomes.
    pub results: Option<Vec<SendOutcome>>,
}

/// Stored shape of one attachment.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAttachment {
    name: String,
    size: u64,
    // Always true on write, ignored on read.
    #[serde(default = "placeholder_flag")]
    #[allow(dead_code)]
    placeholder: bool,
}

const fn placeholder_flag() -> bool {
    true
}

/// Draft persistence adapter.
#[derive(Debug)]
pub struct DraftStore<S> {
    inner: S,
}

impl<S: KeyValueStore> DraftStore<S> {
    /// Wraps a key-value store.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The underlying key-value store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Loads every saved draft field.
    pub async fn load(&self) -> StoredDraft {
        let attachments = self
            .load_json::<Vec<StoredAttachment>>(keys::ATTACHMENTS)
            .await
            .map(|items| {
                items
                    .into_iter()
                    .map(|item| AttachmentMeta::new(item.name, item.size))
                    .collect()
            });

        StoredDraft {
            subject: self.load_text(keys::SUBJECT).await,
            body: self.load_text(keys::BODY).await,
            recipients: self.load_text(keys::RECIPIENTS).await,
            attachments,
            results: self.load_json(keys::RESULTS).await,
        }
    }

    /// Saves one text field.
    pub async fn save(&self, field: DraftField, value: &str) {
        self.write(field.key(), value).await;
    }

    /// Saves the attachment list as placeholder metadata.
    pub async fn save_attachments(&self, items: &[Attachment]) {
        let stored: Vec<StoredAttachment> = items
            .iter()
            .map(|item| StoredAttachment {
                name: item.name().to_string(),
                size: item.size(),
                placeholder: true,
            })
            .collect();
        self.write_json(keys::ATTACHMENTS, &stored).await;
    }

    /// Saves the accumulated send outcomes.
    pub async fn save_results(&self, results: &[SendOutcome]) {
        self.write_json(keys::RESULTS, results).await;
    }

    /// Removes every draft key in one operation.
    pub async fn clear(&self) {
        if let Err(e) = self.inner.clear(&keys::ALL).await {
            warn!(error = %e, "Failed to clear saved draft");
        }
    }

    async fn load_text(&self, key: &str) -> Option<String> {
        match self.inner.load(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to load saved draft field");
                None
            }
        }
    }

    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_text(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed saved draft field");
                None
            }
        }
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.inner.save(key, value).await {
            warn!(key, error = %e, "Failed to save draft field");
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write(key, &json).await,
            Err(e) => warn!(key, error = %e, "Failed to serialize draft field"),
        }
    }
}
