//! Urgency classification seam.
//!
//! The text-urgency classifier is an external black box; this module owns
//! its consumption contract. [`HttpClassifier`] talks to the real service,
//! [`KeywordClassifier`] is an offline fallback for CLI runs and tests, and
//! [`CachedClassifier`] is the opt-in memoization point; the default
//! behavior stays fresh-always, recomputing urgency on every run.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::Urgency;

/// The classifier consumption contract.
///
/// `Ok(None)` means "not urgent" and is never an error. Errors are reserved
/// for transport failures; the triage engine treats those the same as
/// `None` so a flaky classifier can't fail a whole run.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Option<Urgency>>;
}

// ---------------------------------------------------------------------------
// HTTP adapter
// ---------------------------------------------------------------------------

/// Adapter for the external urgency service: JSON POST of the complaint
/// text, answer is `{"urgency": "Low"|"Medium"|"High"|"Critical"}` or null.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    urgency: Option<Urgency>,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, api_key: Option<SecretString>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Other(format!("failed to build classifier client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl Classify for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<Option<Urgency>> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": text }));

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Unavailable(format!("classifier request failed: {e}")))?;

        // A null body or missing urgency field both mean "not urgent".
        let parsed: Option<ClassifyResponse> = response
            .json()
            .await
            .map_err(|e| Error::Unavailable(format!("bad classifier response: {e}")))?;

        Ok(parsed.and_then(|r| r.urgency))
    }
}

// ---------------------------------------------------------------------------
// Keyword fallback
// ---------------------------------------------------------------------------

const CRITICAL_TERMS: &[&str] = &[
    "emergency", "danger", "unsafe", "fire", "injury", "injured", "threat", "assault",
];

const HIGH_TERMS: &[&str] = &[
    "urgent", "broken", "harass", "failing", "leak", "outage", "stolen", "missing grade",
];

const MEDIUM_TERMS: &[&str] = &["delay", "slow", "noisy", "unclear", "complaint", "issue"];

/// Rule-based classifier used when no external service is configured.
/// Tiers are checked most-severe first; empty text is not urgent.
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn classify_text(text: &str) -> Option<Urgency> {
        if text.is_empty() {
            return None;
        }
        let lower = text.to_lowercase();
        if CRITICAL_TERMS.iter().any(|t| lower.contains(t)) {
            return Some(Urgency::Critical);
        }
        if HIGH_TERMS.iter().any(|t| lower.contains(t)) {
            return Some(Urgency::High);
        }
        if MEDIUM_TERMS.iter().any(|t| lower.contains(t)) {
            return Some(Urgency::Medium);
        }
        Some(Urgency::Low)
    }
}

#[async_trait]
impl Classify for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Option<Urgency>> {
        Ok(Self::classify_text(text))
    }
}

// ---------------------------------------------------------------------------
// Memoization point
// ---------------------------------------------------------------------------

/// Memoizing wrapper keyed by a hash of the input text. Classification is
/// a pure function of text, so the hash alone discriminates. Transport
/// errors are not cached.
pub struct CachedClassifier<C> {
    inner: C,
    cache: Mutex<HashMap<u64, Option<Urgency>>>,
}

impl<C: Classify> CachedClassifier<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn key(text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl<C: Classify> Classify for CachedClassifier<C> {
    async fn classify(&self, text: &str) -> Result<Option<Urgency>> {
        let key = Self::key(text);

        if let Some(hit) = self.cache.lock().unwrap().get(&key) {
            return Ok(*hit);
        }

        let result = self.inner.classify(text).await?;
        self.cache.lock().unwrap().insert(key, result);
        Ok(result)
    }
}
