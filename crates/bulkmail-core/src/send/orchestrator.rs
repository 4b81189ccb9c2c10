//! Sequential bulk send.
//!
//! One batch validates the draft, then sends to every parsed recipient one
//! at a time. Each outcome is recorded before the next request starts, so
//! progress only moves forward and never more than one request is in flight.

use bulkmail_api::SendRequest;
use tracing::{debug, info, warn};

use super::outcome::{BatchId, SendOutcome, UNKNOWN_ERROR};
use super::transport::MailTransport;
use crate::compose::ComposeSession;
use crate::store::KeyValueStore;
use crate::validation::{FieldError, validate};

/// Orchestrator state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SendState {
    /// Ready for a new batch.
    #[default]
    Idle,
    /// Checking the draft.
    Validating,
    /// Sending a batch.
    Sending {
        /// Batch in progress.
        batch_id: BatchId,
        /// Recipients attempted so far.
        completed: usize,
        /// Recipients in the batch.
        total: usize,
    },
}

/// Totals for one finished batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Batch identifier.
    pub batch_id: BatchId,
    /// Recipients attempted.
    pub total: usize,
    /// Successful sends.
    pub succeeded: usize,
    /// Failed sends.
    pub failed: usize,
}

/// Progress notifications emitted during a batch.
#[derive(Debug, Clone, Copy)]
pub enum SendEvent<'a> {
    /// Validation passed and sending begins.
    Started {
        /// Batch identifier.
        batch_id: &'a BatchId,
        /// Recipients in the batch.
        total: usize,
    },
    /// One recipient was attempted and its outcome recorded.
    Progress {
        /// Zero-based position in the batch.
        index: usize,
        /// Recipients in the batch.
        total: usize,
        /// Rounded percentage complete.
        progress: u8,
        /// The recorded outcome.
        outcome: &'a SendOutcome,
    },
    /// The batch finished.
    Finished(&'a BatchSummary),
}

/// Rounded percentage of `done` out of `total`, half rounding up.
#[must_use]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total) as u128;
    let total = total as u128;
    u8::try_from((200 * done + total) / (2 * total)).unwrap_or(100)
}

/// Runs batches against a [`MailTransport`].
#[derive(Debug)]
pub struct SendOrchestrator<T> {
    transport: T,
    state: SendState,
    progress: u8,
}

impl<T: MailTransport> SendOrchestrator<T> {
    /// Creates an idle orchestrator.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            state: SendState::Idle,
            progress: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SendState {
        &self.state
    }

    /// Percentage of the current batch completed; 0 when idle.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Returns true while a batch is being sent.
    #[must_use]
    pub const fn is_sending(&self) -> bool {
        matches!(self.state, SendState::Sending { .. })
    }

    /// The transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Validates the session's draft and sends it to every recipient.
    ///
    /// On success the recipient field is cleared (subject, body and
    /// attachments are kept) and the outcomes are appended to the session's
    /// results. Individual send failures are recorded as failed outcomes and
    /// never stop the batch.
    ///
    /// # Errors
    ///
    /// Returns the validation errors, also published on the session, if the
    /// draft cannot be sent. Nothing is sent in that case.
    pub async fn send_all<S, F>(
        &mut self,
        session: &mut ComposeSession<S>,
        mut on_event: F,
    ) -> Result<BatchSummary, Vec<FieldError>>
    where
        S: KeyValueStore,
        F: FnMut(SendEvent<'_>),
    {
        self.state = SendState::Validating;
        let errors = validate(session.draft());
        session.set_errors(errors.clone());
        if !errors.is_empty() {
            debug!(errors = errors.len(), "Draft failed validation, nothing sent");
            self.state = SendState::Idle;
            return Err(errors);
        }

        let draft = session.draft();
        let recipients = draft.recipient_list();
        let subject = draft.subject.clone();
        let body = draft.body.clone();
        let attachments = draft.attachments.parts();
        let total = recipients.len();
        let batch_id = BatchId::generate();

        info!(batch = %batch_id, total, attachments = attachments.len(), "Starting batch");
        self.progress = 0;
        self.state = SendState::Sending {
            batch_id: batch_id.clone(),
            completed: 0,
            total,
        };
        on_event(SendEvent::Started {
            batch_id: &batch_id,
            total,
        });

        let mut succeeded = 0;
        for (index, recipient) in recipients.into_iter().enumerate() {
            let request = SendRequest {
                recipient,
                subject: subject.clone(),
                body: body.clone(),
                attachments: attachments.clone(),
            };

            let outcome = match self.transport.send(&request).await {
                Ok(()) => {
                    succeeded += 1;
                    SendOutcome::success(request.recipient, Some(batch_id.clone()))
                }
                Err(e) => {
                    warn!(recipient = %request.recipient, error = %e, "Send failed");
                    let detail = e.server_message().unwrap_or(UNKNOWN_ERROR);
                    SendOutcome::failure(request.recipient, detail, Some(batch_id.clone()))
                }
            };

            let completed = index + 1;
            self.progress = percent(completed, total);
            self.state = SendState::Sending {
                batch_id: batch_id.clone(),
                completed,
                total,
            };
            let outcome = session.record_outcome(outcome).await;
            on_event(SendEvent::Progress {
                index,
                total,
                progress: self.progress,
                outcome,
            });
        }

        session.clear_recipients().await;

        let summary = BatchSummary {
            batch_id,
            total,
            succeeded,
            failed: total - succeeded,
        };
        info!(
            batch = %summary.batch_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch finished"
        );

        self.progress = 0;
        self.state = SendState::Idle;
        on_event(SendEvent::Finished(&summary));
        Ok(summary)
    }
}
