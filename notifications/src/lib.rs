// notifications/src/lib.rs
//
// Outbound SMS and email. The senders are external collaborators behind
// traits. Dispatch goes through an in-process outbound queue: handlers
// enqueue and return, a background worker delivers with retry/backoff, and
// every failure is logged and swallowed. A provider outage can never surface
// as a user-facing error or roll back the write that triggered it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub mod email;
pub mod sms;

pub use email::HttpEmailSender;
pub use sms::HttpSmsSender;

/// Fixed subject line for all outbound mail.
pub const EMAIL_SUBJECT: &str = "ANC Track Notification";

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider rejected message: {0}")]
    Rejected(String),
    #[error("notification configuration error: {0}")]
    Config(String),
}

#[async_trait]
pub trait SmsSender: Send + Sync + 'static {
    /// Sends one text message; returns the provider's message id.
    async fn send(&self, destination_number: &str, message: &str) -> Result<String, NotifyError>;
}

#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    /// Sends one email with the fixed subject.
    async fn send(&self, recipient: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug)]
enum Outbound {
    Sms { to: String, message: String },
    Email { recipient: String, body: String },
}

/// Fire-and-forget front of the outbound queue. Enqueueing never blocks the
/// request; the worker owns the senders.
#[derive(Clone, Default)]
pub struct Dispatcher {
    tx: Option<mpsc::UnboundedSender<Outbound>>,
}

impl Dispatcher {
    /// Starts the delivery worker on the current runtime. With no sender
    /// configured for a channel, its jobs are dropped silently.
    pub fn start(
        sms: Option<Arc<dyn SmsSender>>,
        email: Option<Arc<dyn EmailSender>>,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                deliver(job, sms.as_deref(), email.as_deref()).await;
            }
        });
        Self { tx: Some(tx) }
    }

    /// A dispatcher that drops everything; for setups with no providers.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Best-effort SMS; a missing number or queue is a no-op.
    pub fn sms_best_effort(&self, destination_number: Option<&str>, message: &str) {
        let (Some(tx), Some(to)) = (&self.tx, destination_number) else {
            return;
        };
        let _ = tx.send(Outbound::Sms {
            to: to.to_string(),
            message: message.to_string(),
        });
    }

    /// Best-effort email; a missing recipient or queue is a no-op.
    pub fn email_best_effort(&self, recipient: Option<&str>, body: &str) {
        let (Some(tx), Some(recipient)) = (&self.tx, recipient) else {
            return;
        };
        let _ = tx.send(Outbound::Email {
            recipient: recipient.to_string(),
            body: body.to_string(),
        });
    }
}

/// Delivers one job, retrying with doubling backoff. Exhausted retries are
/// logged and dropped.
async fn deliver(job: Outbound, sms: Option<&dyn SmsSender>, email: Option<&dyn EmailSender>) {
    for attempt in 0..MAX_ATTEMPTS {
        let result = match &job {
            Outbound::Sms { to, message } => match sms {
                Some(sender) => sender.send(to, message).await.map(|provider_id| {
                    info!(%provider_id, "sms dispatched");
                }),
                None => return,
            },
            Outbound::Email { recipient, body } => match email {
                Some(sender) => sender.send(recipient, body).await.map(|()| {
                    info!(%recipient, "email dispatched");
                }),
                None => return,
            },
        };

        match result {
            Ok(()) => return,
            Err(e) if attempt + 1 < MAX_ATTEMPTS => {
                warn!(attempt = attempt + 1, "notification attempt failed: {}", e);
                tokio::time::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt)).await;
            }
            Err(e) => {
                warn!("failed to send notification, giving up: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Dispatcher, EmailSender, NotifyError, SmsSender};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct FailingSms(Arc<AtomicUsize>);

    #[async_trait]
    impl SmsSender for FailingSms {
        async fn send(&self, _to: &str, _message: &str) -> Result<String, NotifyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError::Rejected("provider down".to_string()))
        }
    }

    struct CountingEmail(Arc<AtomicUsize>);

    #[async_trait]
    impl EmailSender for CountingEmail {
        async fn send(&self, _recipient: &str, _body: &str) -> Result<(), NotifyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn wait_for(counter: &AtomicUsize, expected: usize) -> bool {
        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) >= expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failure_is_retried_then_swallowed() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::start(Some(Arc::new(FailingSms(attempts.clone()))), None);

        dispatcher.sms_best_effort(Some("+250783378349"), "You have been accepted");
        // paused time lets the backoff sleeps resolve instantly
        assert!(wait_for(&attempts, 3).await);
    }

    #[tokio::test]
    async fn email_is_delivered_and_missing_recipient_is_a_noop() {
        let sent = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::start(None, Some(Arc::new(CountingEmail(sent.clone()))));

        dispatcher.email_best_effort(None, "body");
        dispatcher.email_best_effort(Some("patient@example.org"), "body");
        assert!(wait_for(&sent, 1).await);
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }
}
