//! # bulkmail-core
//!
//! Core logic for the `bulkmail` bulk-email client.
//!
//! This crate provides:
//! - The draft being composed, with attachments and validation
//! - Session-scoped draft persistence (in-memory or `SQLite`)
//! - The send orchestrator: one request per recipient, strictly in order
//! - Result and history views
//! - Session token storage, with keyring cleanup on logout

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
pub mod compose;
pub mod credentials;
pub mod draft;
mod error;
pub mod history;
pub mod results;
pub mod send;
pub mod store;
pub mod validation;

pub use attachment::{
    Attachment, AttachmentManager, AttachmentMeta, FileRef, LiveAttachment, MAX_ATTACHMENT_SIZE,
    MAX_ATTACHMENTS,
};
pub use compose::ComposeSession;
pub use credentials::CredentialError;
pub use draft::Draft;
pub use error::{Error, Result};
pub use results::ResultSummary;
pub use send::{
    BatchId, BatchSummary, MailTransport, SendEvent, SendOrchestrator, SendOutcome, SendState,
    SendStatus,
};
pub use store::{DraftField, DraftStore, KeyValueStore, MemoryStore, SqliteStore, StoredDraft};
pub use validation::{Field, FieldError, is_valid_email, parse_recipients, validate};
