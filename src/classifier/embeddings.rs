use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;
use tokio::task;
use tracing::info;

use crate::traits::Embedder;

/// Local sentence-embedding capability backing classification stage 1.
///
/// The model is loaded lazily on the first embedding request so process
/// startup stays fast; loading and inference run on blocking threads to
/// keep the async runtime responsive.
#[derive(Clone)]
pub struct EmbeddingService {
    model: Arc<OnceCell<Arc<TextEmbedding>>>,
}

impl EmbeddingService {
    pub fn new() -> Self {
        Self {
            model: Arc::new(OnceCell::new()),
        }
    }

    async fn get_model(&self) -> anyhow::Result<Arc<TextEmbedding>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                task::spawn_blocking(|| {
                    let mut options = InitOptions::default();
                    options.model_name = EmbeddingModel::AllMiniLML6V2;
                    options.show_download_progress = false;
                    let model = TextEmbedding::try_new(options)?;
                    info!("Embedding model loaded (AllMiniLML6V2)");
                    Ok::<_, anyhow::Error>(Arc::new(model))
                })
                .await?
            })
            .await?;
        Ok(model.clone())
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let model = self.get_model().await?;
        let text = text.to_string();
        task::spawn_blocking(move || {
            let mut embeddings = model.embed(vec![text], None)?;
            Ok(embeddings.remove(0))
        })
        .await?
    }
}
