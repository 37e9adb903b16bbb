//! Integration tests exercising the real orchestrator flow with scripted
//! capabilities: the same code path the webhook trigger dispatches onto.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::config::GithubConfig;
use crate::github::GithubLogClient;
use crate::orchestrator::Orchestrator;
use crate::settings::ChannelSettings;
use crate::testing::{FixedClassifier, MockGenerator, MockLogSource, RecordingSink};
use crate::types::{Category, EventStatus, LogFetchOutcome, OrchestrationJob};

const CHANNEL: &str = "https://ping.example/v1/webhooks/abc";
const SENDER: &str = "devbot";

fn job(text: &str, settings: ChannelSettings) -> OrchestrationJob {
    OrchestrationJob {
        channel_url: CHANNEL.to_string(),
        text: text.to_string(),
        settings,
    }
}

fn full_settings() -> ChannelSettings {
    ChannelSettings {
        channel_url: Some(CHANNEL.to_string()),
        repo_owner: Some("octocat".to_string()),
        github_repo: Some("hello-world".to_string()),
        github_pat: Some("ghp_token".to_string()),
    }
}

struct Harness {
    orchestrator: Orchestrator,
    logs: Arc<MockLogSource>,
    generator: Arc<MockGenerator>,
    sink: Arc<RecordingSink>,
}

fn harness(
    category: Category,
    outcome: LogFetchOutcome,
    generator: MockGenerator,
    sink: RecordingSink,
) -> Harness {
    let logs = Arc::new(MockLogSource::with_outcome(outcome));
    let generator = Arc::new(generator);
    let sink = Arc::new(sink);
    let orchestrator = Orchestrator::new(
        Arc::new(FixedClassifier(category)),
        logs.clone(),
        generator.clone(),
        sink.clone(),
        SENDER.to_string(),
    );
    Harness {
        orchestrator,
        logs,
        generator,
        sink,
    }
}

#[tokio::test]
async fn github_path_emits_accepted_fetching_then_log() {
    let h = harness(
        Category::GithubRelated,
        LogFetchOutcome::Success("build\ndeploy ok".to_string()),
        MockGenerator::with_text("unused"),
        RecordingSink::new(),
    );

    h.orchestrator
        .run(job("Fetch my deployment log", full_settings()))
        .await;

    let events = h.sink.recorded().await;
    let names: Vec<&str> = events.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Request accepted", "Fetching log", "GitHub deployment log"]
    );
    assert!(events.iter().all(|e| e.status == EventStatus::Success));
    assert_eq!(events[2].message, "build\ndeploy ok");
    assert_eq!(events[2].sender, SENDER);

    // The generator plays no part in the log pipeline.
    assert_eq!(h.generator.call_count.load(Ordering::SeqCst), 0);

    // Credentials come from the flattened settings, nowhere else.
    let calls = h.logs.calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].owner, "octocat");
    assert_eq!(calls[0].token, "ghp_token");
}

#[tokio::test]
async fn github_failure_notifies_and_stops() {
    let h = harness(
        Category::GithubRelated,
        LogFetchOutcome::Failed("repository not found, verify owner, repo, token".to_string()),
        MockGenerator::with_text("unused"),
        RecordingSink::new(),
    );

    h.orchestrator
        .run(job("Fetch my deployment log", full_settings()))
        .await;

    let events = h.sink.recorded().await;
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].event_name, "Log fetch failed");
    assert_eq!(events[2].status, EventStatus::Error);
    assert_eq!(
        events[2].message,
        "repository not found, verify owner, repo, token"
    );
    assert_eq!(h.generator.call_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn accepted_is_emitted_first_on_both_paths() {
    for category in [Category::GithubRelated, Category::NotGithubRelated] {
        let h = harness(
            category,
            LogFetchOutcome::Success("tail".to_string()),
            MockGenerator::with_text("an answer"),
            RecordingSink::new(),
        );
        h.orchestrator.run(job("anything", full_settings())).await;

        let events = h.sink.recorded().await;
        assert_eq!(events[0].event_name, "Request accepted");
        assert_eq!(events[0].message, "Your request is being processed");
    }
}

#[tokio::test]
async fn conversational_path_delivers_sanitized_text() {
    let h = harness(
        Category::NotGithubRelated,
        LogFetchOutcome::Failed("unused".to_string()),
        MockGenerator::with_text("**Pizza?** I'm a `DevOps` guru, let's deploy instead."),
        RecordingSink::new(),
    );

    h.orchestrator
        .run(job("what's a good pizza topping?", full_settings()))
        .await;

    let events = h.sink.recorded().await;
    let names: Vec<&str> = events.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(names, vec!["Request accepted", "devbot thinks"]);
    assert_eq!(
        events[1].message,
        "Pizza? I'm a DevOps guru, let's deploy instead."
    );
    assert_eq!(events[1].status, EventStatus::Success);
    assert_eq!(h.logs.call_count().await, 0);
}

#[tokio::test]
async fn classified_generation_failure_reaches_the_channel() {
    let h = harness(
        Category::NotGithubRelated,
        LogFetchOutcome::Failed("unused".to_string()),
        MockGenerator::classified_failure(),
        RecordingSink::new(),
    );

    h.orchestrator.run(job("tell me a joke", full_settings())).await;

    let events = h.sink.recorded().await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event_name, "Response failed");
    assert_eq!(events[1].status, EventStatus::Error);
    assert!(events[1].message.contains("AI backend"));
}

#[tokio::test]
async fn unclassified_generation_failure_still_notifies() {
    let h = harness(
        Category::NotGithubRelated,
        LogFetchOutcome::Failed("unused".to_string()),
        MockGenerator::plain_failure(),
        RecordingSink::new(),
    );

    h.orchestrator.run(job("tell me a joke", full_settings())).await;

    let events = h.sink.recorded().await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].status, EventStatus::Error);
    assert!(events[1].message.contains("couldn't come up with a response"));
}

#[tokio::test]
async fn notification_failures_never_abort_the_pipeline() {
    let h = harness(
        Category::GithubRelated,
        LogFetchOutcome::Success("deploy ok".to_string()),
        MockGenerator::with_text("unused"),
        RecordingSink::failing(),
    );

    h.orchestrator
        .run(job("Fetch my deployment log", full_settings()))
        .await;

    // Every send failed, yet all three sends were attempted in order.
    let events = h.sink.recorded().await;
    let names: Vec<&str> = events.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Request accepted", "Fetching log", "GitHub deployment log"]
    );
}

#[tokio::test]
async fn missing_token_fails_before_any_network_call() {
    // Real log pipeline; the base URL is unroutable, so any network attempt
    // would surface as a connection failure rather than the credential text.
    let logs = Arc::new(
        GithubLogClient::new(&GithubConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            tail_lines: 30,
            timeout_secs: 1,
        })
        .unwrap(),
    );
    let sink = Arc::new(RecordingSink::new());
    let orchestrator = Orchestrator::new(
        Arc::new(FixedClassifier(Category::GithubRelated)),
        logs,
        Arc::new(MockGenerator::with_text("unused")),
        sink.clone(),
        SENDER.to_string(),
    );

    let mut settings = full_settings();
    settings.github_pat = None;
    orchestrator.run(job("Fetch my deployment log", settings)).await;

    let events = sink.recorded().await;
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].status, EventStatus::Error);
    assert!(events[2].message.contains("credentials"));
}
