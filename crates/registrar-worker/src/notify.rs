use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::NotifyError;
use crate::VerificationRequest;

pub const APPROVAL_SUBJECT: &str = "Verification Approved";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub text: String,
}

/// The message sent when a request is approved.
pub fn approval_email(record: &VerificationRequest, registration_url: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: record.email.clone(),
        to_name: Some(record.full_name()),
        subject: APPROVAL_SUBJECT.to_string(),
        text: format!(
            "Hello {}, your verification is approved. Please register here: {}",
            record.first_name, registration_url
        ),
    }
}

/// Outbound email delivery. Sends are single attempts; callers decide what a failure means.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Mailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError>;
}

/// Logs messages instead of delivering them. Used when no mail transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "mail transport not configured; message not delivered"
        );
        Ok(())
    }
}

/// Keeps every attempted message in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_with: Option<String>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer that records each attempt and then fails it with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    /// Every attempted message, in order, including failed ones.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        self.sent.lock().push(email.clone());
        match &self.fail_with {
            Some(reason) => Err(NotifyError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VerificationRequest {
        VerificationRequest {
            id: 7,
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            institution_name: "Acme Lab".to_string(),
            institution_address: "1 Main St".to_string(),
            role: "researcher".to_string(),
            email: "ana@acme.org".to_string(),
            is_verified: true,
            created_at: 1_760_000_000,
        }
    }

    #[test]
    fn approval_email_template() {
        let email = approval_email(&record(), "https://your-app.vercel.app/register");
        assert_eq!(email.to, "ana@acme.org");
        assert_eq!(email.to_name.as_deref(), Some("Ana Lee"));
        assert_eq!(email.subject, "Verification Approved");
        assert_eq!(
            email.text,
            "Hello Ana, your verification is approved. Please register here: https://your-app.vercel.app/register"
        );
    }

    #[tokio::test]
    async fn memory_mailer_records_attempts() {
        let mailer = MemoryMailer::new();
        let email = approval_email(&record(), "https://example.org/register");
        mailer.send(&email).await.unwrap();
        assert_eq!(mailer.sent(), vec![email]);
    }

    #[tokio::test]
    async fn failing_mailer_still_records_attempt() {
        let mailer = MemoryMailer::failing("smtp down");
        let email = approval_email(&record(), "https://example.org/register");
        let err = mailer.send(&email).await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(ref r) if r == "smtp down"));
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let email = approval_email(&record(), "https://example.org/register");
        assert!(LogMailer.send(&email).await.is_ok());
    }
}
