//! Attachment model types.

use std::path::Path;

use bulkmail_api::AttachmentPart;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::MAX_ATTACHMENT_SIZE;

/// A file picked by the user, not yet admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// File name without directories.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// File content. Empty for files skipped as oversized.
    pub content: Bytes,
}

impl FileRef {
    /// Creates a file reference from in-memory content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// Reads a file from disk.
    ///
    /// Files over [`MAX_ATTACHMENT_SIZE`] are not read; the reference keeps
    /// their real size so admission rejects them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata or content cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        let size = tokio::fs::metadata(path).await?.len();
        let content = if size > MAX_ATTACHMENT_SIZE {
            Bytes::new()
        } else {
            Bytes::from(tokio::fs::read(path).await?)
        };
        Ok(Self {
            name,
            size,
            content,
        })
    }
}

/// Name and size of an attachment, without content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

impl AttachmentMeta {
    /// Creates attachment metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// An attachment whose bytes are available for sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveAttachment {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// File content.
    pub content: Bytes,
}

impl From<FileRef> for LiveAttachment {
    fn from(file: FileRef) -> Self {
        Self {
            name: file.name,
            size: file.size,
            content: file.content,
        }
    }
}

/// An entry of the attachment list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Selected in this process; sendable.
    Live(LiveAttachment),
    /// Restored from storage; metadata only.
    Placeholder(AttachmentMeta),
}

impl Attachment {
    /// File name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Live(live) => &live.name,
            Self::Placeholder(meta) => &meta.name,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        match self {
            Self::Live(live) => live.size,
            Self::Placeholder(meta) => meta.size,
        }
    }

    /// Returns true for metadata-only entries.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Metadata as persisted to the draft store.
    #[must_use]
    pub fn meta(&self) -> AttachmentMeta {
        AttachmentMeta::new(self.name(), self.size())
    }

    /// Multipart payload, for live attachments only.
    #[must_use]
    pub fn to_part(&self) -> Option<AttachmentPart> {
        match self {
            Self::Live(live) => Some(AttachmentPart::new(live.name.clone(), live.content.clone())),
            Self::Placeholder(_) => None,
        }
    }

    /// Size in MiB with two decimals, as shown in listings.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size() as f64 / 1024.0 / 1024.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_ref_size_from_content() {
        let file = FileRef::new("a.txt", b"hello".to_vec());
        assert_eq!(file.size, 5);
    }

    #[test]
    fn placeholder_has_no_part() {
        let attachment = Attachment::Placeholder(AttachmentMeta::new("cv.pdf", 10));
        assert!(attachment.is_placeholder());
        assert!(attachment.to_part().is_none());
        assert_eq!(attachment.meta(), AttachmentMeta::new("cv.pdf", 10));
    }

    #[test]
    fn live_part_shares_content() {
        let attachment = Attachment::Live(FileRef::new("cv.pdf", b"%PDF".to_vec()).into());
        let part = attachment.to_part().unwrap();
        assert_eq!(part.file_name, "cv.pdf");
        assert_eq!(part.content.as_ref(), b"%PDF");
    }

    #[test]
    fn size_label() {
        let attachment = Attachment::Placeholder(AttachmentMeta::new("big.bin", 1_572_864));
        assert_eq!(attachment.size_label(), "1.50 MB");
    }

    #[tokio::test]
    async fn from_path_reads_small_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"resume").unwrap();

        let file_ref = FileRef::from_path(file.path()).await.unwrap();
        assert_eq!(file_ref.size, 6);
        assert_eq!(file_ref.content.as_ref(), b"resume");
        assert!(!file_ref.name.contains('/'));
    }

    #[tokio::test]
    async fn from_path_skips_oversized_content() {
        let file = tempfile::NamedTempFile::new().unwrap();
        file.as_file().set_len(MAX_ATTACHMENT_SIZE + 1).unwrap();

        let file_ref = FileRef::from_path(file.path()).await.unwrap();
        assert_eq!(file_ref.size, MAX_ATTACHMENT_SIZE + 1);
        assert!(file_ref.content.is_empty());
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        assert!(FileRef::from_path("/definitely/not/here.pdf").await.is_err());
    }
}
