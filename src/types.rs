use serde::Serialize;

use crate::settings::ChannelSettings;

/// Which pipeline a classified command takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    GithubRelated,
    NotGithubRelated,
}

/// Result of intent classification: the category plus the score that decided
/// it (embedding similarity when stage 1 decided, entailment score when the
/// ambiguous band fell through to stage 2). Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub confidence: f32,
}

/// Terminal result of the log-retrieval pipeline. Exactly one variant, never
/// empty or partial; `Failed` carries a human-readable reason, not a code.
#[derive(Debug, Clone, PartialEq)]
pub enum LogFetchOutcome {
    Success(String),
    Failed(String),
}

/// Repository coordinates and access token as supplied by channel settings.
/// Fields may be empty; the pipeline's precondition check rejects them
/// before any network call is made.
#[derive(Debug, Clone, Default)]
pub struct RepoCredentials {
    pub owner: String,
    pub repo: String,
    pub token: String,
}

/// Delivery status of a notification event.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Success,
    Error,
}

/// Status notification posted to the caller-supplied channel URL.
///
/// Events have no identity beyond their emission order and are
/// fire-and-forget: no acknowledgment is tracked.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub sender: String,
    pub event_name: String,
    pub message: String,
    pub status: EventStatus,
}

impl NotificationEvent {
    fn new(sender: &str, event_name: &str, message: &str, status: EventStatus) -> Self {
        Self {
            sender: sender.to_string(),
            event_name: event_name.to_string(),
            message: message.to_string(),
            status,
        }
    }

    /// First event of every run, emitted before classification begins.
    pub fn accepted(sender: &str) -> Self {
        Self::new(
            sender,
            "Request accepted",
            "Your request is being processed",
            EventStatus::Success,
        )
    }

    pub fn fetching_log(sender: &str) -> Self {
        Self::new(
            sender,
            "Fetching log",
            "Fetching the latest deployment log from GitHub",
            EventStatus::Success,
        )
    }

    pub fn log_delivered(sender: &str, tail: &str) -> Self {
        Self::new(sender, "GitHub deployment log", tail, EventStatus::Success)
    }

    pub fn log_failed(sender: &str, reason: &str) -> Self {
        Self::new(sender, "Log fetch failed", reason, EventStatus::Error)
    }

    pub fn answer(sender: &str, text: &str) -> Self {
        Self::new(sender, "devbot thinks", text, EventStatus::Success)
    }

    pub fn answer_failed(sender: &str, reason: &str) -> Self {
        Self::new(sender, "Response failed", reason, EventStatus::Error)
    }
}

/// One unit of detached work: everything the orchestrator needs, captured at
/// ingress. No implicit environment lookups happen after dispatch.
#[derive(Debug, Clone)]
pub struct OrchestrationJob {
    pub channel_url: String,
    pub text: String,
    pub settings: ChannelSettings,
}
