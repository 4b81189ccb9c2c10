//! The outbound seam of the orchestrator.

use std::future::Future;

use bulkmail_api::{Client, SendRequest};

/// Delivers one single-recipient message.
pub trait MailTransport: Send + Sync {
    /// Sends `request` and resolves once the API has answered.
    fn send(
        &self,
        request: &SendRequest,
    ) -> impl Future<Output = bulkmail_api::Result<()>> + Send;
}

impl MailTransport for Client {
    fn send(
        &self,
        request: &SendRequest,
    ) -> impl Future<Output = bulkmail_api::Result<()>> + Send {
        self.send_mail(request)
    }
}
