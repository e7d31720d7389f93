//! Inbound notification payload of the WhatsApp Business Cloud API.
//!
//! Every level is optional so that unrelated or partial notifications
//! (status updates, media messages) deserialize cleanly and are ignored.

use serde::Deserialize;

pub const WHATSAPP_OBJECT: &str = "whatsapp_business_account";

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookChange {
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    pub text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Sender id and text of an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText<'a> {
    pub from: &'a str,
    pub body: &'a str,
}

impl WebhookPayload {
    /// The platform delivers at most one message per call; only the first
    /// text message of the first change is considered.
    pub fn first_text_message(&self) -> Option<InboundText<'_>> {
        if self.object.as_deref() != Some(WHATSAPP_OBJECT) {
            return None;
        }

        let value = self.entry.first()?.changes.first()?.value.as_ref()?;
        let message = value.messages.first()?;
        let text = message.text.as_ref()?;

        Some(InboundText {
            from: &message.from,
            body: &text.body,
        })
    }
}
