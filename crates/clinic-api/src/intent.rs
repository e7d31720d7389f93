//! Keyword heuristics for inbound chat text.
//!
//! Deliberately naive. Kept behind [`IntentClassifier`] so a smarter parser
//! can replace it without touching the intake flow.

/// What an inbound message is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    AppointmentRequest,
    Other,
}

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Intent;

    /// Best-effort display name for the requester.
    fn patient_name(&self, text: &str) -> String;
}

/// Substring match on lowercase text. `"this"` counts as a greeting because
/// it contains `"hi"`; there is no word-boundary handling.
pub struct KeywordClassifier {
    keywords: Vec<String>,
    fallback_name: String,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I, fallback_name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(|k| k.into().to_lowercase()).collect(),
            fallback_name: fallback_name.into(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(["hi", "appointment"], "Patient")
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Intent {
        let text = text.to_lowercase();
        if self.keywords.iter().any(|k| text.contains(k.as_str())) {
            Intent::AppointmentRequest
        } else {
            Intent::Other
        }
    }

    /// Second whitespace-delimited token, e.g. `"Hi Ravi"` -> `"Ravi"`.
    fn patient_name(&self, text: &str) -> String {
        text.split_whitespace()
            .nth(1)
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback_name.clone())
    }
}
