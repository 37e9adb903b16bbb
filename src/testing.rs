//! Test doubles: scripted capability mocks and a recording event sink,
//! suitable for integration tests that exercise the real orchestrator loop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::generator::GenerationError;
use crate::traits::{
    Embedder, EntailmentModel, EventSink, LogSource, QueryClassifier, TextGenerator,
};
use crate::types::{
    Category, Classification, LogFetchOutcome, NotificationEvent, RepoCredentials,
};

// ---------------------------------------------------------------------------
// Classifier capabilities
// ---------------------------------------------------------------------------

/// Embedder returning scripted vectors by exact text lookup; unscripted
/// text is an error.
pub struct MockEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    pub call_count: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            call_count: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no scripted embedding for {text:?}"))
    }
}

/// Entailment model returning one fixed score, or an error when unscripted.
pub struct MockEntailment {
    score: Option<f32>,
    pub call_count: AtomicUsize,
}

impl MockEntailment {
    pub fn with_score(score: f32) -> Self {
        Self {
            score: Some(score),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            score: None,
            call_count: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EntailmentModel for MockEntailment {
    async fn entailment_score(&self, _text: &str, _hypothesis: &str) -> anyhow::Result<f32> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.score
            .ok_or_else(|| anyhow::anyhow!("entailment endpoint unavailable"))
    }
}

/// Classifier that always returns the given category.
pub struct FixedClassifier(pub Category);

#[async_trait]
impl QueryClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Classification {
        Classification {
            category: self.0,
            confidence: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline capabilities
// ---------------------------------------------------------------------------

/// Log source returning one scripted outcome and recording the credentials
/// it was called with.
pub struct MockLogSource {
    outcome: LogFetchOutcome,
    pub calls: Mutex<Vec<RepoCredentials>>,
}

impl MockLogSource {
    pub fn with_outcome(outcome: LogFetchOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn fetch_latest_log(&self, creds: &RepoCredentials) -> LogFetchOutcome {
        self.calls.lock().await.push(creds.clone());
        self.outcome.clone()
    }
}

/// Generator returning scripted text, a classified error, or a plain error.
pub struct MockGenerator {
    script: GeneratorScript,
    pub call_count: AtomicUsize,
}

enum GeneratorScript {
    Text(String),
    ClassifiedFailure,
    PlainFailure,
}

impl MockGenerator {
    pub fn with_text(text: &str) -> Self {
        Self {
            script: GeneratorScript::Text(text.to_string()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn classified_failure() -> Self {
        Self {
            script: GeneratorScript::ClassifiedFailure,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn plain_failure() -> Self {
        Self {
            script: GeneratorScript::PlainFailure,
            call_count: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _text: &str) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            GeneratorScript::Text(text) => Ok(text.clone()),
            GeneratorScript::ClassifiedFailure => {
                Err(GenerationError::from_status(503, "upstream down").into())
            }
            GeneratorScript::PlainFailure => Err(anyhow::anyhow!("generation exploded")),
        }
    }
}

// ---------------------------------------------------------------------------
// Event sink
// ---------------------------------------------------------------------------

/// Sink that captures every event in order. `failing()` still records but
/// reports delivery failure for every send.
pub struct RecordingSink {
    pub events: Mutex<Vec<(String, NotificationEvent)>>,
    fail_sends: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_sends: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_sends: true,
        }
    }

    pub async fn recorded(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .await
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn notify(&self, channel_url: &str, event: &NotificationEvent) -> anyhow::Result<()> {
        self.events
            .lock()
            .await
            .push((channel_url.to_string(), event.clone()));
        if self.fail_sends {
            anyhow::bail!("channel unreachable");
        }
        Ok(())
    }
}
