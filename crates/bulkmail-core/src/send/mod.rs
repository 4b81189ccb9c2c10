//! Bulk send: one request per recipient, strictly in order.

mod orchestrator;
mod outcome;
mod transport;

pub use orchestrator::{BatchSummary, SendEvent, SendOrchestrator, SendState, percent};
pub use outcome::{BatchId, SendOutcome, SendStatus, UNKNOWN_ERROR};
pub use transport::MailTransport;
