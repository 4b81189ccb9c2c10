//! Attachment handling.
//!
//! Attachments selected in the current process carry their bytes (`Live`).
//! Attachments restored from the draft store only carry metadata
//! (`Placeholder`) and must be re-selected before sending.

mod manager;
mod model;

pub use manager::{AttachmentManager, MAX_ATTACHMENT_SIZE, MAX_ATTACHMENTS};
pub use model::{Attachment, AttachmentMeta, FileRef, LiveAttachment};
