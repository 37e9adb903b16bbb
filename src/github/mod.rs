//! Latest-deployment-log retrieval from the GitHub Actions API.
//!
//! Protocol: list workflow runs, trust the provider-reported order and take
//! the first entry as "the latest", pull that run's log archive, extract
//! the deploy-step log tail.

mod archive;
mod error;

pub use error::{LogFetchError, LogFetchErrorKind};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::GithubConfig;
use crate::http::build_http_client;
use crate::traits::LogSource;
use crate::types::{LogFetchOutcome, RepoCredentials};

const USER_AGENT: &str = concat!("devbot/", env!("CARGO_PKG_VERSION"));

pub struct GithubLogClient {
    client: Client,
    base_url: String,
    tail_lines: usize,
}

impl GithubLogClient {
    pub fn new(config: &GithubConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(
                Duration::from_secs(config.timeout_secs),
                Some(USER_AGENT),
            )?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tail_lines: config.tail_lines,
        })
    }

    async fn try_fetch(&self, creds: &RepoCredentials) -> Result<String, LogFetchError> {
        // Pure precondition check: no network traffic without credentials.
        if creds.owner.trim().is_empty()
            || creds.repo.trim().is_empty()
            || creds.token.trim().is_empty()
        {
            return Err(LogFetchError::missing_credentials());
        }

        let runs_url = format!(
            "{}/repos/{}/{}/actions/runs",
            self.base_url, creds.owner, creds.repo
        );
        let resp = self
            .client
            .get(&runs_url)
            .header("Authorization", format!("Bearer {}", creds.token))
            .send()
            .await
            .map_err(|e| LogFetchError::network(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "GitHub run listing failed: {}", body);
            return Err(LogFetchError::auth_or_not_found(status.as_u16(), &body));
        }

        let data: Value = resp.json().await.map_err(|e| LogFetchError::network(&e))?;
        let runs = data["workflow_runs"].as_array().cloned().unwrap_or_default();
        if runs.is_empty() {
            return Err(LogFetchError::no_history());
        }

        // Provider-reported order is trusted: element 0 is the latest run.
        let run_id = runs[0]["id"]
            .as_u64()
            .ok_or_else(|| LogFetchError::log_fetch_failed(None, "run entry missing id"))?;
        info!(run_id, "Fetching log archive for latest workflow run");

        let logs_url = format!("{runs_url}/{run_id}/logs");
        let log_resp = self
            .client
            .get(&logs_url)
            .header("Authorization", format!("Bearer {}", creds.token))
            .send()
            .await
            .map_err(|e| LogFetchError::network(&e))?;

        let log_status = log_resp.status();
        if !log_status.is_success() {
            warn!(status = %log_status, run_id, "GitHub log archive fetch failed");
            return Err(LogFetchError::log_fetch_failed(
                Some(run_id),
                &format!("status {log_status}"),
            ));
        }

        let bytes = log_resp
            .bytes()
            .await
            .map_err(|e| LogFetchError::network(&e))?;
        archive::extract_deploy_tail(&bytes, self.tail_lines)
    }
}

#[async_trait]
impl LogSource for GithubLogClient {
    async fn fetch_latest_log(&self, creds: &RepoCredentials) -> LogFetchOutcome {
        match self.try_fetch(creds).await {
            Ok(tail) => LogFetchOutcome::Success(tail),
            Err(e) => {
                info!("Log fetch failed: {}", e);
                LogFetchOutcome::Failed(e.user_message())
            }
        }
    }
}
