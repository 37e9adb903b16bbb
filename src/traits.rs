use async_trait::async_trait;

use crate::types::{Classification, LogFetchOutcome, NotificationEvent, RepoCredentials};

/// Text-embedding capability backing classification stage 1.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Zero-shot entailment capability backing classification stage 2.
///
/// Returns the probability that `hypothesis` is supported by `text`.
#[async_trait]
pub trait EntailmentModel: Send + Sync {
    async fn entailment_score(&self, text: &str, hypothesis: &str) -> anyhow::Result<f32>;
}

/// Intent classification as seen by the orchestrator. Total: every input
/// resolves to exactly one category, never an error and never "unknown".
#[async_trait]
pub trait QueryClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Classification;
}

/// The log-retrieval pipeline. All failures are folded into the outcome's
/// `Failed` variant with a human-readable reason.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch_latest_log(&self, creds: &RepoCredentials) -> LogFetchOutcome;
}

/// Conversational text generation with a fixed persona and sampling config.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, text: &str) -> anyhow::Result<String>;
}

/// Best-effort delivery of one event to a channel URL. No retries, no
/// delivery confirmation beyond the HTTP response.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn notify(&self, channel_url: &str, event: &NotificationEvent) -> anyhow::Result<()>;
}
