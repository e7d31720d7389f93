use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v17.0";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("WhatsApp credentials are not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WhatsApp API rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound text delivery to a requester.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), NotifyError>;
}

/// Send and log. Delivery is best-effort and never retried.
pub async fn deliver(notifier: &dyn Notifier, recipient: &str, text: &str) -> bool {
    match notifier.send(recipient, text).await {
        Ok(()) => {
            debug!("Notification sent to {}", recipient);
            true
        }
        Err(e) => {
            warn!("Failed to notify {}: {}", recipient, e);
            false
        }
    }
}

#[derive(Clone)]
pub struct WhatsAppConfig {
    pub api_base: String,
    pub phone_number_id: Option<String>,
    pub access_token: Option<String>,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            phone_number_id: None,
            access_token: None,
        }
    }
}

/// WhatsApp Business Cloud API sender.
pub struct WhatsAppNotifier {
    client: Client,
    config: WhatsAppConfig,
}

impl WhatsAppNotifier {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        non_empty(&self.config.phone_number_id).is_some() && non_empty(&self.config.access_token).is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), NotifyError> {
        let phone_number_id = non_empty(&self.config.phone_number_id).ok_or(NotifyError::NotConfigured)?;
        let access_token = non_empty(&self.config.access_token).ok_or(NotifyError::NotConfigured)?;

        let url = format!(
            "{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            phone_number_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "to": recipient,
                "type": "text",
                "text": { "body": text },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
