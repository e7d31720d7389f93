use std::sync::Arc;

use anyhow::anyhow;
use tracing::error;

use clinic_db::Database;

use crate::intent::{IntentClassifier, KeywordClassifier};
use crate::notifier::Notifier;
use crate::queue::QueueGate;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub gate: QueueGate,
    pub notifier: Arc<dyn Notifier>,
    pub classifier: Arc<dyn IntentClassifier>,
    /// Shared secret echoed by the platform during the webhook handshake.
    pub verify_token: String,
    /// When set, inbound payloads must carry a matching `X-Hub-Signature-256`.
    pub app_secret: Option<String>,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, notifier: Arc<dyn Notifier>, verify_token: impl Into<String>) -> Self {
        Self {
            gate: QueueGate::new(db.clone()),
            db,
            notifier,
            classifier: Arc::new(KeywordClassifier::default()),
            verify_token: verify_token.into(),
            app_secret: None,
        }
    }

    pub fn with_app_secret(mut self, app_secret: Option<String>) -> Self {
        self.app_secret = app_secret;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }
}

/// Run blocking DB work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        anyhow!("blocking task failed: {}", e)
    })?
}
