#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use clinic_api::notifier::{Notifier, NotifyError};
use clinic_api::routes::router;
use clinic_api::state::{AppState, AppStateInner};
use clinic_db::Database;

pub const VERIFY_TOKEN: &str = "verify-me";

/// Captures outbound messages instead of calling the WhatsApp API.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));

        if self.fail {
            return Err(NotifyError::Rejected {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self::build(notifier, None)
    }

    pub fn with_app_secret(secret: &str) -> Self {
        Self::build(RecordingNotifier::default(), Some(secret.to_string()))
    }

    fn build(notifier: RecordingNotifier, app_secret: Option<String>) -> Self {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let notifier = Arc::new(notifier);
        let state = Arc::new(
            AppStateInner::new(db, notifier.clone(), VERIFY_TOKEN).with_app_secret(app_secret),
        );
        Self { state, notifier }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str) -> Response<Body> {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response<Body> {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn open_queue(&self) {
        self.state.gate.open().await.unwrap();
    }

    /// Make every `INSERT` or `UPDATE` on appointments abort inside the store.
    pub fn break_appointment_writes(&self, event: &str) {
        let sql = format!(
            "CREATE TRIGGER reject_appointment_{0} BEFORE {0} ON appointments
             BEGIN SELECT RAISE(ABORT, 'disk I/O error'); END;",
            event.to_lowercase()
        );
        self.state
            .db
            .with_conn(|conn| Ok(conn.execute_batch(&sql)?))
            .unwrap();
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// A WhatsApp Cloud API notification carrying one text message.
pub fn text_payload(from: &str, body: &str) -> Value {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "102290129340398",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": { "phone_number_id": "10987654321" },
                    "messages": [{
                        "from": from,
                        "id": "wamid.HBgLMTY0NjcwNDM1OTUVAgASGBQzQTdCNTg5RjY1MEMyRjlGMjRGNgA=",
                        "timestamp": "1760688000",
                        "type": "text",
                        "text": { "body": body }
                    }]
                }
            }]
        }]
    })
}
