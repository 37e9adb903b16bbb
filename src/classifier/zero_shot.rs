use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::http::build_http_client;
use crate::traits::EntailmentModel;

/// Zero-shot entailment over a hosted NLI model (Hugging Face inference
/// API shape): the hypothesis is submitted as the single candidate label
/// and the first score is the entailment probability.
pub struct HfZeroShotClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HfZeroShotClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(timeout, None)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl EntailmentModel for HfZeroShotClient {
    async fn entailment_score(&self, text: &str, hypothesis: &str) -> anyhow::Result<f32> {
        let body = json!({
            "inputs": text,
            "parameters": { "candidate_labels": [hypothesis] }
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = request.send().await?;
        let status = resp.status();
        let text_body = resp.text().await?;
        if !status.is_success() {
            anyhow::bail!("zero-shot endpoint returned {}: {}", status, text_body);
        }

        let data: Value = serde_json::from_str(&text_body)?;
        let score = data["scores"][0]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("zero-shot response missing scores"))?
            as f32;
        debug!(score, "Zero-shot entailment scored");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_entailment_score() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"inputs": "fetch my deploy log"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sequence": "fetch my deploy log",
                "labels": ["the query relates to retrieving CI logs"],
                "scores": [0.91]
            })))
            .mount(&server)
            .await;

        let client =
            HfZeroShotClient::new(&server.uri(), "", Duration::from_secs(5)).unwrap();
        let score = client
            .entailment_score("fetch my deploy log", "the query relates to retrieving CI logs")
            .await
            .unwrap();
        assert!((score - 0.91).abs() < 1e-6);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client =
            HfZeroShotClient::new(&server.uri(), "", Duration::from_secs(5)).unwrap();
        let err = client
            .entailment_score("anything", "hypothesis")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
