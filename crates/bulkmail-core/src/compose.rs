//! Compose session.
//!
//! Holds the draft, the accumulated send outcomes and the current field
//! errors, and mirrors every change into the [`DraftStore`].

use tracing::{debug, info};

use crate::attachment::{Attachment, AttachmentManager, FileRef};
use crate::draft::Draft;
use crate::results::{ResultSummary, summarize};
use crate::send::SendOutcome;
use crate::store::{DraftField, DraftStore, KeyValueStore};
use crate::validation::{FieldError, validate};

/// In-memory state of one compose session.
#[derive(Debug)]
pub struct ComposeSession<S> {
    draft: Draft,
    results: Vec<SendOutcome>,
    errors: Vec<FieldError>,
    store: DraftStore<S>,
}

impl<S: KeyValueStore> ComposeSession<S> {
    /// Starts an empty session without reading the store.
    #[must_use]
    pub fn new(store: DraftStore<S>) -> Self {
        Self {
            draft: Draft::new(),
            results: Vec::new(),
            errors: Vec::new(),
            store,
        }
    }

    /// Restores the session from whatever the store holds.
    ///
    /// Saved attachments come back as placeholders.
    pub async fn hydrate(store: DraftStore<S>) -> Self {
        let stored = store.load().await;
        let draft = Draft {
            subject: stored.subject.unwrap_or_default(),
            body: stored.body.unwrap_or_default(),
            recipients: stored.recipients.unwrap_or_default(),
            attachments: AttachmentManager::restore(stored.attachments.unwrap_or_default()),
        };
        let results = stored.results.unwrap_or_default();
        debug!(
            attachments = draft.attachments.len(),
            results = results.len(),
            "Hydrated compose session"
        );

        Self {
            draft,
            results,
            errors: Vec::new(),
            store,
        }
    }

    /// The draft.
    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Every outcome recorded in this session, in send order.
    #[must_use]
    pub fn results(&self) -> &[SendOutcome] {
        &self.results
    }

    /// Errors from the last validation pass or attachment admission.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The draft store.
    #[must_use]
    pub const fn store(&self) -> &DraftStore<S> {
        &self.store
    }

    /// Sets the subject.
    pub async fn set_subject(&mut self, subject: impl Into<String>) {
        self.draft.subject = subject.into();
        self.store.save(DraftField::Subject, &self.draft.subject).await;
    }

    /// Sets the body.
    pub async fn set_body(&mut self, body: impl Into<String>) {
        self.draft.body = body.into();
        self.store.save(DraftField::Body, &self.draft.body).await;
    }

    /// Sets the raw recipient text.
    pub async fn set_recipients(&mut self, recipients: impl Into<String>) {
        self.draft.recipients = recipients.into();
        self.store
            .save(DraftField::Recipients, &self.draft.recipients)
            .await;
    }

    /// Number of parsed recipients.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.draft.recipient_list().len()
    }

    /// Adds files to the attachment list.
    ///
    /// An oversize rejection replaces any earlier attachment error and is
    /// also returned.
    pub async fn add_attachments(&mut self, files: Vec<FileRef>) -> Option<FieldError> {
        let error = self.draft.attachments.add(files, &self.store).await;
        if let Some(error) = &error {
            self.errors.retain(|e| e.field != error.field);
            self.errors.push(error.clone());
        }
        error
    }

    /// Removes the attachment at `index`.
    pub async fn remove_attachment(&mut self, index: usize) -> Option<Attachment> {
        self.draft.attachments.remove(index, &self.store).await
    }

    /// Replaces every attachment, live or placeholder, with `files`.
    pub async fn reselect_attachments(&mut self, files: Vec<FileRef>) -> Option<FieldError> {
        self.draft.attachments.reset();
        self.add_attachments(files).await
    }

    /// Runs validation and keeps its errors.
    pub fn validate(&mut self) -> &[FieldError] {
        self.errors = validate(&self.draft);
        &self.errors
    }

    /// Drops the current errors.
    pub fn dismiss_errors(&mut self) {
        self.errors.clear();
    }

    /// Success and failure counts of the recorded outcomes.
    #[must_use]
    pub fn summary(&self) -> ResultSummary {
        summarize(&self.results)
    }

    /// Resets the draft, results and errors, and clears the store.
    pub async fn clear_all(&mut self) {
        self.draft = Draft::new();
        self.results.clear();
        self.errors.clear();
        self.store.clear().await;
        info!("Cleared draft and results");
    }

    pub(crate) fn set_errors(&mut self, errors: Vec<FieldError>) {
        self.errors = errors;
    }

    /// Appends an outcome and persists the full history.
    pub(crate) async fn record_outcome(&mut self, outcome: SendOutcome) -> &SendOutcome {
        self.results.push(outcome);
        self.store.save_results(&self.results).await;
        &self.results[self.results.len() - 1]
    }

    pub(crate) async fn clear_recipients(&mut self) {
        self.set_recipients(String::new()).await;
    }
}
