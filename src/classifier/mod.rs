//! Two-tier intent classification.
//!
//! Stage 1 is a cheap cosine comparison between the input embedding and a
//! precomputed anchor embedding; it decides the overwhelming majority of
//! queries. Stage 2, a zero-shot entailment check, runs only for input in
//! the ambiguous band to bound cost.

mod embeddings;
mod zero_shot;

pub use embeddings::EmbeddingService;
pub use zero_shot::HfZeroShotClient;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::ClassifierConfig;
use crate::traits::{Embedder, EntailmentModel, QueryClassifier};
use crate::types::{Category, Classification};

pub struct IntentClassifier {
    config: ClassifierConfig,
    embedder: Arc<dyn Embedder>,
    entailment: Arc<dyn EntailmentModel>,
    /// Anchor-phrase embedding, computed once on first use.
    anchor: OnceCell<Vec<f32>>,
}

impl IntentClassifier {
    pub fn new(
        config: ClassifierConfig,
        embedder: Arc<dyn Embedder>,
        entailment: Arc<dyn EntailmentModel>,
    ) -> Self {
        Self {
            config,
            embedder,
            entailment,
            anchor: OnceCell::new(),
        }
    }

    async fn anchor_embedding(&self) -> anyhow::Result<&Vec<f32>> {
        self.anchor
            .get_or_try_init(|| async { self.embedder.embed(&self.config.anchor).await })
            .await
    }

    async fn try_classify(&self, text: &str) -> anyhow::Result<Classification> {
        let anchor = self.anchor_embedding().await?;
        let embedding = self.embedder.embed(text).await?;
        let score = cosine_similarity(&embedding, anchor);
        info!(score, "Embedding similarity scored");

        if score >= self.config.github_threshold {
            return Ok(Classification {
                category: Category::GithubRelated,
                confidence: score,
            });
        }
        if score <= self.config.unrelated_threshold {
            return Ok(Classification {
                category: Category::NotGithubRelated,
                confidence: score,
            });
        }

        // Ambiguous band: logical comparison against the hypothesis.
        let nli_score = self
            .entailment
            .entailment_score(text, &self.config.hypothesis)
            .await?;
        info!(score = nli_score, "Entailment scored");

        let category = if nli_score >= self.config.entailment_threshold {
            Category::GithubRelated
        } else {
            Category::NotGithubRelated
        };
        Ok(Classification {
            category,
            confidence: nli_score,
        })
    }
}

#[async_trait]
impl QueryClassifier for IntentClassifier {
    /// Classification is total: a capability failure resolves to the
    /// conversational path instead of surfacing an error to the run.
    async fn classify(&self, text: &str) -> Classification {
        match self.try_classify(text).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Classification fell back to the conversational path: {e:#}");
                Classification {
                    category: Category::NotGithubRelated,
                    confidence: 0.0,
                }
            }
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
