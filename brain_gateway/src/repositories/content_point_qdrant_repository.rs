use async_trait::async_trait;
use qdrant_client::{
    prelude::QdrantClient,
    qdrant::{
        self, condition::ConditionOneOf, point_id::PointIdOptions,
        points_selector::PointsSelectorOneOf, r#match::MatchValue, value::Kind,
        vectors_config::Config, with_payload_selector::SelectorOptions, Condition,
        CreateCollection, Distance, FieldCondition, Filter, ListValue, Match, PointId,
        PointStruct, PointsIdsList, PointsSelector, ScoredPoint, SearchPoints, Struct,
        VectorParams, VectorsConfig, WithPayloadSelector,
    },
};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::entities::content_point::{ContentMatch, ContentPoint, ContentPointPayload, Embeddings},
    ports::content_point_repository::{ContentPointRepository, ContentPointRepositoryError},
};

/// Payload key searches are filtered on
const OWNER_ID_KEY: &str = "ownerId";

/// Vector index of the contents persisted in Qdrant
pub struct ContentPointQdrantRepository {
    client: QdrantClient,
    collection_name: String,
}

impl ContentPointQdrantRepository {
    /// Creates the collection if it does not exist yet
    #[tracing::instrument(
        name = "Initializing Qdrant and the associated collection",
        skip(client)
    )]
    pub async fn try_new(
        client: QdrantClient,
        collection_name: &str,
        collection_distance: &str,
        collection_vector_size: u64,
    ) -> Result<Self, ContentPointRepositoryError> {
        let collection_distance = Distance::from_str_name(collection_distance).ok_or_else(|| {
            ContentPointRepositoryError::ConfigurationError(format!(
                "Invalid Qdrant distance: {}",
                collection_distance
            ))
        })?;

        match client
            .create_collection(&CreateCollection {
                collection_name: collection_name.to_string(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: collection_vector_size,
                        distance: collection_distance as i32,
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })
            .await
        {
            Ok(_) => info!("Created collection"),
            Err(error) => {
                // Qdrant client only returns anyhow errors
                if !error.to_string().contains("already exists") {
                    return Err(ContentPointRepositoryError::IndexError(error.to_string()));
                }
            }
        };

        Ok(Self {
            client,
            collection_name: collection_name.to_string(),
        })
    }
}

#[async_trait]
impl ContentPointRepository for ContentPointQdrantRepository {
    #[tracing::instrument(name = "Saving content point to Qdrant", skip(self, content_point), fields(content_id = %content_point.id))]
    async fn upsert(&self, content_point: ContentPoint) -> Result<(), ContentPointRepositoryError> {
        let point = PointStruct::try_from(content_point)?;

        self.client
            .upsert_points(&self.collection_name, vec![point], None)
            .await
            .map_err(|e| ContentPointRepositoryError::IndexError(e.to_string()))?;

        info!("Saved content point");
        Ok(())
    }

    #[tracing::instrument(name = "Searching content points in Qdrant", skip(self, vector))]
    async fn search(
        &self,
        owner_id: Uuid,
        vector: Embeddings,
        limit: u64,
    ) -> Result<Vec<ContentMatch>, ContentPointRepositoryError> {
        let response = self
            .client
            .search_points(&SearchPoints {
                collection_name: self.collection_name.clone(),
                vector,
                filter: Some(owner_filter(owner_id)),
                limit,
                with_payload: Some(WithPayloadSelector {
                    selector_options: Some(SelectorOptions::Enable(true)),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| ContentPointRepositoryError::IndexError(e.to_string()))?;

        response
            .result
            .into_iter()
            .map(ContentMatch::try_from)
            .collect()
    }

    #[tracing::instrument(name = "Deleting content point from Qdrant", skip(self))]
    async fn delete(&self, content_id: Uuid) -> Result<(), ContentPointRepositoryError> {
        let selector = PointsSelector {
            points_selector_one_of: Some(PointsSelectorOneOf::Points(PointsIdsList {
                ids: vec![PointId::from(content_id.to_string())],
            })),
        };

        self.client
            .delete_points(&self.collection_name, &selector, None)
            .await
            .map_err(|e| ContentPointRepositoryError::IndexError(e.to_string()))?;

        Ok(())
    }
}

/// Only keeps the points whose payload `ownerId` is exactly `owner_id`
fn owner_filter(owner_id: Uuid) -> Filter {
    Filter {
        must: vec![Condition {
            condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                key: OWNER_ID_KEY.to_string(),
                r#match: Some(Match {
                    match_value: Some(MatchValue::Keyword(owner_id.to_string())),
                }),
                ..Default::default()
            })),
        }],
        ..Default::default()
    }
}

impl TryFrom<ContentPoint> for PointStruct {
    type Error = ContentPointRepositoryError;

    fn try_from(content_point: ContentPoint) -> Result<Self, Self::Error> {
        let payload = match json_to_qdrant_value(
            serde_json::to_value(&content_point.payload)
                .map_err(|e| ContentPointRepositoryError::InvalidPoint(e.to_string()))?,
        )
        .kind
        {
            Some(Kind::StructValue(payload)) => payload.fields,
            _ => {
                return Err(ContentPointRepositoryError::InvalidPoint(
                    "payload is not an object".into(),
                ))
            }
        };

        Ok(Self {
            id: Some(content_point.id.to_string().into()),
            vectors: Some(content_point.vector.into()),
            payload,
        })
    }
}

impl TryFrom<ScoredPoint> for ContentMatch {
    type Error = ContentPointRepositoryError;

    fn try_from(point: ScoredPoint) -> Result<Self, Self::Error> {
        let id = match point.id.and_then(|id| id.point_id_options) {
            Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(&id)
                .map_err(|e| ContentPointRepositoryError::InvalidPoint(e.to_string()))?,
            other => {
                return Err(ContentPointRepositoryError::InvalidPoint(format!(
                    "expected a uuid point id, got {:?}",
                    other
                )))
            }
        };

        let metadata = payload_from_qdrant(point.payload)?;

        Ok(Self {
            id,
            score: point.score,
            metadata,
        })
    }
}

fn payload_from_qdrant(
    payload: HashMap<String, qdrant::Value>,
) -> Result<ContentPointPayload, ContentPointRepositoryError> {
    let payload = serde_json::Value::Object(
        payload
            .into_iter()
            .map(|(key, value)| (key, qdrant_value_to_json(value)))
            .collect(),
    );

    serde_json::from_value(payload)
        .map_err(|e| ContentPointRepositoryError::InvalidPoint(e.to_string()))
}

fn json_to_qdrant_value(value: serde_json::Value) -> qdrant::Value {
    let kind = match value {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(value) => Kind::BoolValue(value),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(integer) => Kind::IntegerValue(integer),
            None => Kind::DoubleValue(number.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(value) => Kind::StringValue(value),
        serde_json::Value::Array(values) => Kind::ListValue(ListValue {
            values: values.into_iter().map(json_to_qdrant_value).collect(),
        }),
        serde_json::Value::Object(fields) => Kind::StructValue(Struct {
            fields: fields
                .into_iter()
                .map(|(key, value)| (key, json_to_qdrant_value(value)))
                .collect(),
        }),
    };

    qdrant::Value { kind: Some(kind) }
}

fn qdrant_value_to_json(value: qdrant::Value) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(value)) => serde_json::Value::Bool(value),
        Some(Kind::IntegerValue(value)) => serde_json::Value::from(value),
        Some(Kind::DoubleValue(value)) => serde_json::Value::from(value),
        Some(Kind::StringValue(value)) => serde_json::Value::String(value),
        Some(Kind::ListValue(list)) => serde_json::Value::Array(
            list.values.into_iter().map(qdrant_value_to_json).collect(),
        ),
        Some(Kind::StructValue(object)) => serde_json::Value::Object(
            object
                .fields
                .into_iter()
                .map(|(key, value)| (key, qdrant_value_to_json(value)))
                .collect(),
        ),
    }
}
