//! Embedding generation providers.

use crate::error::MemoryError;
use crate::Result;
use async_trait::async_trait;
use folio_core::config::{EmbeddingsBackend, EmbeddingsConfig};
use folio_core::SecretString;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default Hugging Face inference endpoint.
pub const HUGGINGFACE_BASE_URL: &str = "https://router.huggingface.co/hf-inference";

/// Default Hugging Face sentence embedding model.
pub const HUGGINGFACE_MODEL: &str = "sentence-transformers/multi-qa-distilbert-cos-v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Generate one embedding per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate embedding for a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Embedding("No embedding returned".to_string()))
    }
}

/// Build the configured embedding provider.
pub fn from_config(config: &EmbeddingsConfig) -> Arc<dyn EmbeddingProvider> {
    let timeout = Duration::from_secs(config.timeout_secs);

    match config.backend {
        EmbeddingsBackend::Huggingface => {
            let mut provider = HuggingFaceEmbeddings::new(config.api_key.clone()).with_timeout(timeout);
            if let Some(model) = &config.model {
                provider = provider.with_model(model);
            }
            if let Some(url) = &config.base_url {
                provider = provider.with_base_url(url);
            }
            Arc::new(provider)
        }
        EmbeddingsBackend::Openai => {
            let mut provider = OpenAIEmbeddings::new(config.api_key.clone()).with_timeout(timeout);
            if let Some(model) = &config.model {
                provider = provider.with_model(model);
            }
            if let Some(url) = &config.base_url {
                provider = provider.with_base_url(url);
            }
            Arc::new(provider)
        }
    }
}

/// Hugging Face feature-extraction embeddings.
pub struct HuggingFaceEmbeddings {
    client: Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
    timeout: Duration,
    dimension: usize,
}

impl HuggingFaceEmbeddings {
    /// Create a provider for the default sentence model.
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: HUGGINGFACE_MODEL.to_string(),
            base_url: HUGGINGFACE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            dimension: 768,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the reported dimension for non-default models.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}/pipeline/feature-extraction",
            self.base_url, self.model
        )
    }
}

/// Feature-extraction output: one pooled vector per input, or per-token
/// vectors that still need pooling.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureExtraction {
    Pooled(Vec<Vec<f32>>),
    Tokens(Vec<Vec<Vec<f32>>>),
}

impl FeatureExtraction {
    fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            Self::Pooled(vectors) => vectors,
            Self::Tokens(batches) => batches.iter().map(|tokens| mean_pool(tokens)).collect(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbeddings {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        #[derive(Serialize)]
        struct Request<'a> {
            inputs: &'a [String],
        }

        let response: FeatureExtraction = post_json(
            &self.client,
            &self.endpoint(),
            self.api_key.as_ref(),
            &Request { inputs: texts },
            self.timeout,
        )
        .await?;

        let vectors = response.into_vectors();
        check_count(texts.len(), vectors)
    }
}

/// OpenAI-compatible embeddings provider.
pub struct OpenAIEmbeddings {
    client: Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
    timeout: Duration,
    dimension: Option<usize>,
}

impl OpenAIEmbeddings {
    /// Create a new OpenAI embeddings provider.
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com".to_string(),
            timeout: DEFAULT_TIMEOUT,
            dimension: None,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the reported dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    fn dimension(&self) -> usize {
        if let Some(dimension) = self.dimension {
            return dimension;
        }
        match self.model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct Response {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            index: usize,
            embedding: Vec<f32>,
        }

        let request = Request {
            model: &self.model,
            input: texts,
        };

        let mut response: Response = post_json(
            &self.client,
            &format!("{}/v1/embeddings", self.base_url),
            self.api_key.as_ref(),
            &request,
            self.timeout,
        )
        .await?;

        response.data.sort_by_key(|d| d.index);
        let vectors = response.data.into_iter().map(|d| d.embedding).collect();
        check_count(texts.len(), vectors)
    }
}

/// POST a JSON body and decode the JSON answer, bounded by `timeout`.
async fn post_json<B, T>(
    client: &Client,
    url: &str,
    api_key: Option<&SecretString>,
    body: &B,
    timeout: Duration,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut request = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(body);

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        request = request.bearer_auth(key.expose_secret());
    }

    let call = async {
        let response = request
            .send()
            .await
            .map_err(|e| MemoryError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MemoryError::ServiceUnavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MemoryError::Embedding(format!("Invalid response: {}", e)))
    };

    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(url, timeout_ms = timeout.as_millis() as u64, "Embedding request timed out");
            Err(MemoryError::Timeout(timeout))
        }
    }
}

fn check_count(expected: usize, vectors: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>> {
    if vectors.len() != expected {
        return Err(MemoryError::Embedding(format!(
            "Expected {} embeddings, got {}",
            expected,
            vectors.len()
        )));
    }
    Ok(vectors)
}

fn mean_pool(tokens: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = tokens.first() else {
        return Vec::new();
    };

    let mut pooled = vec![0.0; first.len()];
    for token in tokens {
        for (acc, value) in pooled.iter_mut().zip(token) {
            *acc += value;
        }
    }

    let count = tokens.len() as f32;
    pooled.iter_mut().for_each(|v| *v /= count);
    pooled
}

/// Compute cosine similarity between two vectors.
///
/// Mismatched lengths and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
