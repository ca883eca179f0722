//! Recording notifier for testing.

use crate::providers::Notifier;
use allocateme_core::{Result, SignupError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A message handed to the [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    /// Verification code delivery.
    VerificationCode {
        /// Recipient.
        to: String,
        /// The code.
        code: String,
        /// Expiry.
        expires_at: DateTime<Utc>,
    },
    /// Allocation result delivery.
    AllocationResult {
        /// Recipient.
        to: String,
        /// Assigned option name.
        option_name: Option<String>,
    },
}

/// Notifier that records instead of sending.
///
/// Clones share the outbox.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    outbox: Arc<Mutex<Vec<SentMessage>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    /// Create a notifier that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent message.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    /// Everything delivered so far.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.outbox.lock().await.clone()
    }

    /// Most recent code delivered to `to`.
    pub async fn last_code_for(&self, to: &str) -> Option<String> {
        self.outbox
            .lock()
            .await
            .iter()
            .rev()
            .find_map(|m| match m {
                SentMessage::VerificationCode { to: rcpt, code, .. } if rcpt == to => {
                    Some(code.clone())
                }
                _ => None,
            })
    }

    async fn record(&self, message: SentMessage) -> Result<()> {
        if *self.failing.lock().await {
            return Err(SignupError::Delivery("recording notifier set to fail".into()));
        }
        self.outbox.lock().await.push(message);
        Ok(())
    }
}

impl Notifier for RecordingNotifier {
    async fn send_verification_code(
        &self,
        to: &str,
        _event_title: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.record(SentMessage::VerificationCode {
            to: to.to_string(),
            code: code.to_string(),
            expires_at,
        })
        .await
    }

    async fn send_allocation_result(
        &self,
        to: &str,
        _event_title: &str,
        option_name: Option<&str>,
    ) -> Result<()> {
        self.record(SentMessage::AllocationResult {
            to: to.to_string(),
            option_name: option_name.map(str::to_string),
        })
        .await
    }
}
