use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, info, warn};

use clinic_types::api::VerifyQuery;
use clinic_types::webhook::WebhookPayload;

use crate::intake::{IntakeOutcome, handle_inbound_message};
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// GET /webhook — subscription handshake.
pub async fn verify(State(state): State<AppState>, Query(query): Query<VerifyQuery>) -> Response {
    let subscribed = query.mode.as_deref() == Some("subscribe");
    let token_matches = query.verify_token.as_deref() == Some(state.verify_token.as_str());

    if subscribed && token_matches {
        info!("Webhook verified");
        (StatusCode::OK, query.challenge.unwrap_or_default()).into_response()
    } else {
        warn!("Webhook verification rejected (mode={:?})", query.mode);
        StatusCode::FORBIDDEN.into_response()
    }
}

/// POST /webhook — inbound notifications.
///
/// Always answers 200 so the platform does not redeliver; bad payloads and
/// internal failures are only logged.
pub async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    if let Some(secret) = state.app_secret.as_deref() {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if !verify_signature(secret, &body, signature) {
            warn!("Dropping webhook payload with missing or invalid signature");
            return StatusCode::OK;
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("Ignoring malformed webhook payload: {}", e);
            return StatusCode::OK;
        }
    };

    let Some(message) = payload.first_text_message() else {
        debug!("Webhook payload carries no text message");
        return StatusCode::OK;
    };

    info!("Message from {}: {}", message.from, message.body);

    match handle_inbound_message(&state, message.from, message.body).await {
        IntakeOutcome::Accepted(appointment) => {
            debug!("Webhook created appointment {}", appointment.id)
        }
        outcome => debug!("Webhook intake outcome: {:?}", outcome),
    }

    StatusCode::OK
}

/// Check `sha256=<hex>` against the HMAC-SHA256 of the raw body.
pub fn verify_signature(secret: &str, body: &[u8], header: Option<&str>) -> bool {
    let Some(expected) = header
        .and_then(|h| h.strip_prefix("sha256="))
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
    else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_matching_signature() {
        let body = br#"{"object":"whatsapp_business_account"}"#;
        let header = sign("app-secret", body);
        assert!(verify_signature("app-secret", body, Some(&header)));
    }

    #[test]
    fn rejects_wrong_secret_or_tampered_body() {
        let body = br#"{"object":"whatsapp_business_account"}"#;
        let header = sign("app-secret", body);
        assert!(!verify_signature("other-secret", body, Some(&header)));
        assert!(!verify_signature("app-secret", b"{}", Some(&header)));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(!verify_signature("app-secret", b"{}", None));
        assert!(!verify_signature("app-secret", b"{}", Some("sha1=abcd")));
        assert!(!verify_signature("app-secret", b"{}", Some("sha256=not-hex")));
    }
}
