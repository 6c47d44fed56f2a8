use async_trait::async_trait;
use std::{collections::HashMap, sync::RwLock};
use uuid::Uuid;

use crate::{
    domain::entities::content_point::{ContentMatch, ContentPoint, Embeddings},
    ports::content_point_repository::{ContentPointRepository, ContentPointRepositoryError},
};

/// Exhaustive cosine-similarity index kept in the process memory
///
/// Points are keyed by content id, so upserting the same content twice replaces it.
#[derive(Default)]
pub struct ContentPointInMemoryRepository {
    points: RwLock<HashMap<Uuid, ContentPoint>>,
}

impl ContentPointInMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.read().map(|points| points.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, content_id: Uuid) -> bool {
        self.points
            .read()
            .map(|points| points.contains_key(&content_id))
            .unwrap_or(false)
    }
}

/// Cosine similarity in [-1, 1]; 0 when a vector is null or the dimensions differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[async_trait]
impl ContentPointRepository for ContentPointInMemoryRepository {
    async fn upsert(&self, content_point: ContentPoint) -> Result<(), ContentPointRepositoryError> {
        self.points
            .write()
            .map_err(|e| ContentPointRepositoryError::IndexError(e.to_string()))?
            .insert(content_point.id, content_point);
        Ok(())
    }

    async fn search(
        &self,
        owner_id: Uuid,
        vector: Embeddings,
        limit: u64,
    ) -> Result<Vec<ContentMatch>, ContentPointRepositoryError> {
        let mut matches: Vec<ContentMatch> = self
            .points
            .read()
            .map_err(|e| ContentPointRepositoryError::IndexError(e.to_string()))?
            .values()
            .filter(|point| point.payload.owner_id == owner_id)
            .map(|point| ContentMatch {
                id: point.id,
                score: cosine_similarity(&vector, &point.vector),
                metadata: point.payload.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit as usize);

        Ok(matches)
    }

    async fn delete(&self, content_id: Uuid) -> Result<(), ContentPointRepositoryError> {
        self.points
            .write()
            .map_err(|e| ContentPointRepositoryError::IndexError(e.to_string()))?
            .remove(&content_id);
        Ok(())
    }
}
