use std::sync::Arc;

use tracing::{info, warn};

use crate::generator::GenerationError;
use crate::sanitize;
use crate::traits::{EventSink, LogSource, QueryClassifier, TextGenerator};
use crate::types::{Category, LogFetchOutcome, NotificationEvent, OrchestrationJob};

/// Composes the classifier, log pipeline, generator, and notification sink
/// into the end-to-end flow for one dispatched command.
///
/// Capabilities are constructed once at process start and shared read-only;
/// invocations carry no state between each other.
pub struct Orchestrator {
    classifier: Arc<dyn QueryClassifier>,
    logs: Arc<dyn LogSource>,
    generator: Arc<dyn TextGenerator>,
    events: Arc<dyn EventSink>,
    sender: String,
}

impl Orchestrator {
    pub fn new(
        classifier: Arc<dyn QueryClassifier>,
        logs: Arc<dyn LogSource>,
        generator: Arc<dyn TextGenerator>,
        events: Arc<dyn EventSink>,
        sender: String,
    ) -> Self {
        Self {
            classifier,
            logs,
            generator,
            events,
            sender,
        }
    }

    /// Run one command to its terminal notification. Never returns an
    /// error: the triggering request has already been answered, so every
    /// failure is converted into a channel event or a log line.
    pub async fn run(&self, job: OrchestrationJob) {
        let channel_url = &job.channel_url;
        self.emit(channel_url, NotificationEvent::accepted(&self.sender))
            .await;

        let classification = self.classifier.classify(&job.text).await;
        info!(
            category = ?classification.category,
            confidence = classification.confidence,
            "Command classified"
        );

        match classification.category {
            Category::GithubRelated => {
                self.emit(channel_url, NotificationEvent::fetching_log(&self.sender))
                    .await;

                let creds = job.settings.credentials();
                match self.logs.fetch_latest_log(&creds).await {
                    LogFetchOutcome::Success(tail) => {
                        self.emit(
                            channel_url,
                            NotificationEvent::log_delivered(&self.sender, &tail),
                        )
                        .await;
                    }
                    LogFetchOutcome::Failed(reason) => {
                        self.emit(
                            channel_url,
                            NotificationEvent::log_failed(&self.sender, &reason),
                        )
                        .await;
                    }
                }
            }
            Category::NotGithubRelated => match self.generator.generate(&job.text).await {
                Ok(text) => {
                    let plain = sanitize::render_plain(&text);
                    self.emit(channel_url, NotificationEvent::answer(&self.sender, &plain))
                        .await;
                }
                Err(e) => {
                    // Always notify; a silent drop would leave the channel hanging.
                    warn!("Generation failed: {e:#}");
                    let reason = e
                        .downcast_ref::<GenerationError>()
                        .map(GenerationError::user_message)
                        .unwrap_or_else(|| {
                            "I couldn't come up with a response this time. Please try again."
                                .to_string()
                        });
                    self.emit(
                        channel_url,
                        NotificationEvent::answer_failed(&self.sender, &reason),
                    )
                    .await;
                }
            },
        }
    }

    /// Best-effort delivery: a failed send is logged and never aborts the
    /// remaining pipeline steps.
    async fn emit(&self, channel_url: &str, event: NotificationEvent) {
        if let Err(e) = self.events.notify(channel_url, &event).await {
            warn!(event = %event.event_name, "Notification delivery failed: {e:#}");
        }
    }
}
