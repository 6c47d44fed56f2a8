use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::{ContentItem, ContentType};

pub type Embeddings = Vec<f32>;

/// Entry of the vector index: the embeddings of a content, under the content id
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContentPoint {
    pub id: Uuid,
    pub payload: ContentPointPayload,
    pub vector: Embeddings,
}

/// Metadata stored next to a vector, returned with search matches
///
/// `owner_id` is what searches are filtered on.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPointPayload {
    pub owner_id: Uuid,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ContentPoint {
    pub fn new(content: &ContentItem, vector: Embeddings) -> Self {
        Self {
            id: content.id,
            payload: ContentPointPayload {
                owner_id: content.owner_id,
                content_type: content.content_type,
                title: content.title.clone(),
                tags: content.tags.clone(),
            },
            vector,
        }
    }
}

/// A search hit, ranked by the vector index
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContentMatch {
    pub id: Uuid,
    pub score: f32,
    pub metadata: ContentPointPayload,
}
