//! Draft validation.
//!
//! Validation is a pure pass over the draft. Every rule runs independently
//! and the full error list is rebuilt on each pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::draft::Draft;

/// Draft field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// Subject line.
    Subject,
    /// Message body.
    Body,
    /// Recipient list.
    Emails,
    /// Attachment list.
    Attachments,
}

impl Field {
    /// Field name as shown to users.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Body => "body",
            Self::Emails => "emails",
            Self::Attachments => "attachments",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation error scoped to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field the error belongs to.
    pub field: Field,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Error emitted when attachments were dropped for exceeding the size limit.
    #[must_use]
    pub fn oversized_attachments() -> Self {
        Self::new(Field::Attachments, "Some files exceed 10MB limit")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Splits a comma-separated recipient list.
///
/// Entries are trimmed and empty entries dropped; order is preserved.
#[must_use]
pub fn parse_recipients(recipients: &str) -> Vec<String> {
    recipients
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Checks the `local@domain.tld` shape.
///
/// Accepts exactly one `@`, no whitespace, a non-empty local part, and a
/// domain with a `.` that is neither its first nor its last character.
#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validates a draft.
///
/// Returns an empty list if and only if the draft can be sent.
#[must_use]
pub fn validate(draft: &Draft) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if draft.subject.trim().is_empty() {
        errors.push(FieldError::new(Field::Subject, "Subject is required"));
    }

    if draft.body.trim().is_empty() {
        errors.push(FieldError::new(Field::Body, "Email body is required"));
    }

    let recipients = draft.recipient_list();
    if recipients.is_empty() {
        errors.push(FieldError::new(
            Field::Emails,
            "At least one email is required",
        ));
    }

    errors.extend(
        recipients
            .iter()
            .filter(|r| !is_valid_email(r))
            .map(|r| FieldError::new(Field::Emails, format!("Invalid email format: {r}"))),
    );

    if !draft.attachments.is_empty() && draft.attachments.has_placeholders() {
        errors.push(FieldError::new(
            Field::Attachments,
            "Some attachments are placeholders (files were not re-uploaded). \
             Please re-select the files before sending.",
        ));
    }

    errors
}
