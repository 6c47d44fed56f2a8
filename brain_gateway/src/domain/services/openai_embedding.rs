use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    configuration::EmbeddingSettings,
    domain::entities::content_point::Embeddings,
    ports::embedding_service::{EmbeddingService, EmbeddingServiceError},
};

/// Service to generate embeddings from a text, using an OpenAI-compatible `/embeddings` API
///
/// Rate-limited (429) and server (5xx) responses, as well as network errors, are retried
/// with an exponential backoff. Other client errors fail immediately.
pub struct OpenAiEmbeddingsService {
    client: reqwest::Client,
    api_url: String,
    api_key: Secret<String>,
    model: String,
    dimension: usize,
    max_retries: u32,
    retry_base_delay: Duration,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsResponseData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponseData {
    embedding: Embeddings,
}

impl OpenAiEmbeddingsService {
    pub fn try_new(settings: &EmbeddingSettings) -> Result<Self, EmbeddingServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_s))
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            dimension: settings.dimension,
            max_retries: settings.max_retries,
            retry_base_delay: Duration::from_millis(settings.retry_base_delay_ms),
        })
    }

    /// Delay before the given retry attempt (starting at 1): base, 2 * base, 4 * base ...
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * 2u32.saturating_pow(attempt.saturating_sub(1).min(10))
    }

    async fn request_embeddings(&self, text: &str) -> Result<Embeddings, EmbeddingServiceError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingsRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingServiceError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let response = response.json::<EmbeddingsResponse>().await.map_err(|e| {
            EmbeddingServiceError::MalformedResponse(format!("could not decode body: {}", e))
        })?;

        parse_embeddings_response(response, self.dimension)
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingsService {
    fn dimension(&self) -> usize {
        self.dimension
    }

    #[tracing::instrument(name = "Generate embeddings from API", skip(self, text), fields(model = %self.model))]
    async fn generate_embeddings(&self, text: &str) -> Result<Embeddings, EmbeddingServiceError> {
        let mut attempt = 0;

        loop {
            match self.request_embeddings(text).await {
                Ok(embeddings) => {
                    info!(attempt, "Generated embeddings");
                    return Ok(embeddings);
                }
                Err(error) if is_retryable(&error) && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff_delay(attempt);
                    warn!(?error, attempt, ?delay, "Embeddings request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Rate limits, server errors and network errors are worth retrying
fn is_retryable(error: &EmbeddingServiceError) -> bool {
    match error {
        EmbeddingServiceError::RequestError(_) => true,
        EmbeddingServiceError::ApiError { status, .. } => *status == 429 || *status >= 500,
        EmbeddingServiceError::MalformedResponse(_) => false,
    }
}

fn parse_embeddings_response(
    response: EmbeddingsResponse,
    expected_dimension: usize,
) -> Result<Embeddings, EmbeddingServiceError> {
    let embeddings = response
        .data
        .into_iter()
        .next()
        .map(|data| data.embedding)
        .ok_or_else(|| EmbeddingServiceError::MalformedResponse("empty data array".into()))?;

    if embeddings.len() != expected_dimension {
        return Err(EmbeddingServiceError::MalformedResponse(format!(
            "expected {} dimensions, got {}",
            expected_dimension,
            embeddings.len()
        )));
    }

    Ok(embeddings)
}
