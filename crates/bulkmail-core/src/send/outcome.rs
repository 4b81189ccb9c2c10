//! Per-recipient send outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error detail recorded when the server gives no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Groups the outcomes of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// Generates an identifier from the current UTC time, to the millisecond.
    #[must_use]
    pub fn generate() -> Self {
        Self::at(Utc::now())
    }

    /// Identifier for a batch started at `time`.
    #[must_use]
    pub fn at(time: DateTime<Utc>) -> Self {
        Self(format!("batch-{}", time.format("%Y%m%d%H%M%S%3f")))
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BatchId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one recipient's send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    /// The API accepted the message.
    Success,
    /// Transport or API failure.
    Failed,
}

impl SendStatus {
    /// Lowercase label, as stored and searched.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded outcome for one recipient. Never modified once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    /// Recipient address.
    #[serde(rename = "email")]
    pub recipient: String,
    /// Success or failure.
    pub status: SendStatus,
    /// Failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the attempt completed.
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
    /// Batch the attempt belonged to.
    #[serde(rename = "batchId", default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
}

impl SendOutcome {
    /// Successful delivery to `recipient`, timestamped now.
    #[must_use]
    pub fn success(recipient: impl Into<String>, batch_id: Option<BatchId>) -> Self {
        Self {
            recipient: recipient.into(),
            status: SendStatus::Success,
            error: None,
            sent_at: Utc::now(),
            batch_id,
        }
    }

    /// Failed delivery to `recipient`, timestamped now.
    #[must_use]
    pub fn failure(
        recipient: impl Into<String>,
        error: impl Into<String>,
        batch_id: Option<BatchId>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            status: SendStatus::Failed,
            error: Some(error.into()),
            sent_at: Utc::now(),
            batch_id,
        }
    }

    /// Returns true if the send succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SendStatus::Success
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn batch_id_is_timestamp_derived() {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 5).unwrap();
        assert_eq!(BatchId::at(time).as_str(), "batch-20240601123005000");
    }

    #[test]
    fn outcome_json_shape() {
        let outcome = SendOutcome::failure("b@y.com", "Rejected", Some(BatchId::from("batch-7")));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["email"], "b@y.com");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "Rejected");
        assert_eq!(json["batchId"], "batch-7");
        assert!(json["sentAt"].is_string());
    }

    #[test]
    fn success_omits_optional_fields() {
        let json = serde_json::to_value(SendOutcome::success("a@x.com", None)).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("batchId").is_none());
    }

    #[test]
    fn status_labels() {
        assert_eq!(SendStatus::Success.to_string(), "success");
        assert_eq!(SendStatus::Failed.as_str(), "failed");
    }
}
