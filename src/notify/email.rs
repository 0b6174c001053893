//! Outbound email dispatch
//!
//! Email goes out through a hosted transactional mail API. The send call is
//! fire-and-forget from the workflows' perspective: the hard 5-second timeout
//! is the only explicit client timeout in the system, and a failed send is
//! logged by the caller and never blocks a workflow.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Email dispatch errors
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Mail API request failed: {0}")]
    Transport(String),

    #[error("Mail API rejected the message: HTTP {0}")]
    Rejected(u16),
}

/// One outbound message
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Capability interface for the email dispatcher.
///
/// Injected so workflows can be tested against a sender that always fails,
/// proving the non-fatal contract.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Production sender backed by the hosted mail API.
pub struct HttpEmailSender {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpEmailSender {
    /// Build a sender with the hard 5-second abort on outbound calls.
    pub fn new(api_url: String, api_key: Option<String>, from: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "text": message.body,
        });

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EmailError::Rejected(response.status().as_u16()));
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "Email dispatched");

        Ok(())
    }
}
