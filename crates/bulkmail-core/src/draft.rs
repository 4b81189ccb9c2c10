//! The draft being composed.

use crate::attachment::AttachmentManager;
use crate::validation::parse_recipients;

/// A composition in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Subject line.
    pub subject: String,
    /// Body, HTML allowed.
    pub body: String,
    /// Comma-separated recipient addresses, as typed.
    pub recipients: String,
    /// Attachments, at most five.
    pub attachments: AttachmentManager,
}

impl Draft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed recipient addresses, in the order typed.
    #[must_use]
    pub fn recipient_list(&self) -> Vec<String> {
        parse_recipients(&self.recipients)
    }
}
