use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::classifier::{EmbeddingService, HfZeroShotClient, IntentClassifier};
use crate::config::AppConfig;
use crate::dispatcher::Dispatcher;
use crate::generator::GeminiGenerator;
use crate::github::GithubLogClient;
use crate::notify::HttpEventSink;
use crate::orchestrator::Orchestrator;
use crate::server::{self, ServerState};

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    // 1. Classifier capabilities
    let embedder = Arc::new(EmbeddingService::new());
    let entailment = Arc::new(HfZeroShotClient::new(
        &config.classifier.zero_shot_url,
        &config.classifier.api_key,
        Duration::from_secs(config.classifier.timeout_secs),
    )?);
    let classifier = Arc::new(IntentClassifier::new(
        config.classifier.clone(),
        embedder,
        entailment,
    ));
    info!(
        github_threshold = config.classifier.github_threshold,
        unrelated_threshold = config.classifier.unrelated_threshold,
        "Intent classifier configured"
    );

    // 2. Log retrieval
    let logs = Arc::new(GithubLogClient::new(&config.github)?);

    // 3. Response generation
    let generator = Arc::new(GeminiGenerator::new(&config.generation)?);
    info!(model = %config.generation.model, "Response generator configured");

    // 4. Notifications
    let events = Arc::new(HttpEventSink::new(Duration::from_secs(
        config.notifier.timeout_secs,
    ))?);

    // 5. Orchestrator on a bounded worker pool
    let orchestrator = Arc::new(Orchestrator::new(
        classifier,
        logs,
        generator,
        events,
        config.notifier.sender.clone(),
    ));
    let dispatcher = Arc::new(Dispatcher::spawn(
        move |job| {
            let orchestrator = orchestrator.clone();
            async move { orchestrator.run(job).await }
        },
        config.dispatcher.workers,
        config.dispatcher.queue,
    ));
    info!(
        workers = config.dispatcher.workers,
        queue = config.dispatcher.queue,
        "Dispatcher started"
    );

    // 6. HTTP trigger (blocks until shutdown)
    let state = ServerState {
        dispatcher,
        command: config.command.clone(),
    };
    server::start_server(state, &config.server).await
}
