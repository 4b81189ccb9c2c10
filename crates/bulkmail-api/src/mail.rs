//! Mail endpoint payloads: single-recipient sends and server history.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

/// One binary attachment part of a send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    /// File name reported to the server.
    pub file_name: String,
    /// Raw file content.
    pub content: Bytes,
}

impl AttachmentPart {
    /// Creates a new attachment part.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// A message addressed to exactly one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// Recipient address (`recruiterEmail` on the wire).
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Body, HTML allowed.
    pub body: String,
    /// Binary attachments.
    pub attachments: Vec<AttachmentPart>,
}

impl SendRequest {
    /// Creates a send request without attachments.
    #[must_use]
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, part: AttachmentPart) -> Self {
        self.attachments.push(part);
        self
    }

    /// Builds the multipart form sent to `POST /send`.
    pub(crate) fn to_form(&self) -> Form {
        let form = Form::new()
            .text("recruiterEmail", self.recipient.clone())
            .text("subject", self.subject.clone())
            .text("body", self.body.clone());

        self.attachments.iter().fold(form, |form, attachment| {
            let part = Part::bytes(attachment.content.to_vec())
                .file_name(attachment.file_name.clone());
            form.part("attachments", part)
        })
    }
}

/// Delivery status recorded by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Delivered to the provider.
    Success,
    /// Provider rejected the message.
    Failed,
    /// Any status this client does not know.
    #[serde(other)]
    Unknown,
}

impl DeliveryStatus {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// One record of `GET /history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Recipient address.
    pub recruiter_email: String,
    /// Subject line.
    pub subject: String,
    /// Delivery status.
    pub status: DeliveryStatus,
    /// Number of attachments sent.
    #[serde(default)]
    pub attachments_count: u32,
    /// When the server attempted delivery.
    pub sent_at: DateTime<Utc>,
    /// Provider error, for failed sends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
