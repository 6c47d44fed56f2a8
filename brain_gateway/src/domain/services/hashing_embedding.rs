use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use crate::{
    domain::entities::content_point::Embeddings,
    ports::embedding_service::{EmbeddingService, EmbeddingServiceError},
};

/// Generates embeddings locally with the hashing trick, without any model
///
/// Every lowercased word is hashed into one of the `dimension` buckets, with a sign
/// also taken from the hash, and the resulting vector is L2-normalized.
/// Texts sharing words get a positive cosine similarity, which is enough to run the
/// service without an embeddings API (local development, tests). It has no notion of
/// synonyms.
pub struct HashingEmbeddingsService {
    dimension: usize,
}

impl HashingEmbeddingsService {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed(&self, text: &str) -> Embeddings {
        static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

        let mut vector = vec![0f32; self.dimension];

        for word in WORD.find_iter(text) {
            let mut hasher = DefaultHasher::new();
            word.as_str().to_lowercase().hash(&mut hasher);
            let hash = hasher.finish();

            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }

        vector
    }
}

#[async_trait]
impl EmbeddingService for HashingEmbeddingsService {
    fn dimension(&self) -> usize {
        self.dimension
    }

    #[tracing::instrument(name = "Generate embeddings by hashing", skip(self, text))]
    async fn generate_embeddings(&self, text: &str) -> Result<Embeddings, EmbeddingServiceError> {
        Ok(self.embed(text))
    }
}
