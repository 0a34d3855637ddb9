use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, Condition, DeletePointsBuilder, Filter, GetPointsBuilder, PointId, PointsIdsList,
    ScrollPointsBuilder, SearchPointsBuilder, SetPayloadPointsBuilder, Value as QdrantValue,
};
use serde_json::{Map, Value};

use super::QdrantConfig;
use crate::error::{PromptError, PromptResult};
use crate::models::{
    Browse, CollectionStats, FilterCondition, ScoredPrompt, StoredPrompt, VectorSearch,
};
use crate::store::PromptStore;

/// Qdrant-backed implementation of [`PromptStore`].
pub struct QdrantPromptStore {
    client: Qdrant,
    collection: String,
}

impl QdrantPromptStore {
    pub fn new(config: QdrantConfig) -> PromptResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| PromptError::Store(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            collection: config.collection,
        })
    }

    /// Point ids are opaque strings at the API edge. Numeric strings map to
    /// qdrant's numeric id space (the batch migration assigns those), any
    /// other string is treated as a UUID id.
    fn to_point_id(id: &str) -> PointId {
        match id.parse::<u64>() {
            Ok(num) => PointId::from(num),
            Err(_) => PointId::from(id.to_string()),
        }
    }

    fn point_id_to_string(point_id: &PointId) -> PromptResult<String> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid)) => Ok(uuid.clone()),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(num.to_string()),
            None => Err(PromptError::Internal("Missing point ID".to_string())),
        }
    }

    fn to_qdrant_filter(conditions: &[FilterCondition]) -> Option<Filter> {
        // An empty AND filter matches nothing in qdrant, not everything.
        if conditions.is_empty() {
            return None;
        }

        let conditions: Vec<Condition> = conditions
            .iter()
            .map(|condition| match condition {
                FilterCondition::Keyword { key, value } => {
                    Condition::matches(*key, value.clone())
                }
                FilterCondition::Flag { key, value } => Condition::matches(*key, *value),
                FilterCondition::AnyKeyword { key, values } => {
                    Condition::matches(*key, values.clone())
                }
            })
            .collect();

        Some(Filter::must(conditions))
    }

    fn payload_to_qdrant(payload: Map<String, Value>) -> HashMap<String, QdrantValue> {
        payload
            .into_iter()
            .map(|(key, value)| (key, json_to_qdrant_value(value)))
            .collect()
    }

    fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> Map<String, Value> {
        payload
            .into_iter()
            .map(|(key, value)| (key, qdrant_value_to_json(value)))
            .collect()
    }

    /// Extract vector values from VectorsOutput.
    /// Note: uses the deprecated data field until migration to 1.18+.
    #[allow(deprecated)]
    fn extract_vector(vectors: &Option<qdrant::VectorsOutput>) -> Option<Vec<f32>> {
        match vectors {
            Some(qdrant::VectorsOutput {
                vectors_options: Some(opts),
            }) => match opts {
                qdrant::vectors_output::VectorsOptions::Vector(v) => Some(v.data.clone()),
                qdrant::vectors_output::VectorsOptions::Vectors(map) => {
                    map.vectors.values().next().map(|v| v.data.clone())
                }
            },
            _ => None,
        }
    }

    fn retrieved_to_stored(point: qdrant::RetrievedPoint) -> PromptResult<StoredPrompt> {
        let id = point
            .id
            .as_ref()
            .map(Self::point_id_to_string)
            .transpose()?
            .ok_or_else(|| PromptError::Internal("Missing point ID".to_string()))?;

        let vector = Self::extract_vector(&point.vectors);

        Ok(StoredPrompt {
            id,
            payload: Self::qdrant_to_payload(point.payload),
            vector,
        })
    }
}

fn json_to_qdrant_value(value: Value) -> QdrantValue {
    use qdrant::value::Kind;

    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Kind::IntegerValue(i)
            } else {
                Kind::DoubleValue(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => Kind::StringValue(s),
        Value::Array(items) => Kind::ListValue(qdrant::ListValue {
            values: items.into_iter().map(json_to_qdrant_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(qdrant::Struct {
            fields: map
                .into_iter()
                .map(|(k, v)| (k, json_to_qdrant_value(v)))
                .collect(),
        }),
    };

    QdrantValue { kind: Some(kind) }
}

fn qdrant_value_to_json(value: QdrantValue) -> Value {
    use qdrant::value::Kind;

    match value.kind {
        Some(Kind::NullValue(_)) | None => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(fields)) => Value::Object(
            fields
                .fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
    }
}

#[async_trait]
impl PromptStore for QdrantPromptStore {
    async fn search(&self, query: VectorSearch) -> PromptResult<Vec<ScoredPrompt>> {
        let mut builder = SearchPointsBuilder::new(&self.collection, query.vector, query.limit)
            .offset(query.offset)
            .with_payload(true);

        if let Some(threshold) = query.score_threshold {
            builder = builder.score_threshold(threshold);
        }

        if let Some(filter) = query
            .filter
            .as_deref()
            .and_then(Self::to_qdrant_filter)
        {
            builder = builder.filter(filter);
        }

        let results = self.client.search_points(builder).await?;

        results
            .result
            .into_iter()
            .map(|point| {
                let id = point
                    .id
                    .as_ref()
                    .map(Self::point_id_to_string)
                    .transpose()?
                    .ok_or_else(|| PromptError::Internal("Missing point ID".to_string()))?;

                Ok(ScoredPrompt {
                    id,
                    score: point.score,
                    payload: Self::qdrant_to_payload(point.payload),
                })
            })
            .collect()
    }

    async fn scroll(&self, query: Browse) -> PromptResult<Vec<StoredPrompt>> {
        // Qdrant scroll cursors are point ids, not numeric offsets, so a
        // numeric offset is emulated by over-fetching and skipping. Fine at
        // prompt-library scale.
        let fetch = scroll_fetch_size(query.offset, query.limit);

        let mut builder = ScrollPointsBuilder::new(&self.collection)
            .limit(fetch)
            .with_payload(true);

        if let Some(filter) = query
            .filter
            .as_deref()
            .and_then(Self::to_qdrant_filter)
        {
            builder = builder.filter(filter);
        }

        let results = self.client.scroll(builder).await?;

        results
            .result
            .into_iter()
            .skip(query.offset as usize)
            .map(Self::retrieved_to_stored)
            .collect()
    }

    async fn retrieve(
        &self,
        ids: Vec<String>,
        with_vector: bool,
    ) -> PromptResult<Vec<StoredPrompt>> {
        let point_ids: Vec<PointId> = ids.iter().map(|id| Self::to_point_id(id)).collect();

        let builder = GetPointsBuilder::new(&self.collection, point_ids)
            .with_vectors(with_vector)
            .with_payload(true);

        let results = self.client.get_points(builder).await?;

        results
            .result
            .into_iter()
            .map(Self::retrieved_to_stored)
            .collect()
    }

    async fn set_payload(&self, id: &str, payload: Map<String, Value>) -> PromptResult<()> {
        let builder =
            SetPayloadPointsBuilder::new(&self.collection, Self::payload_to_qdrant(payload))
                .points_selector(PointsIdsList {
                    ids: vec![Self::to_point_id(id)],
                })
                .wait(true);

        self.client.set_payload(builder).await?;

        Ok(())
    }

    async fn delete(&self, ids: Vec<String>) -> PromptResult<u64> {
        let point_ids: Vec<PointId> = ids.iter().map(|id| Self::to_point_id(id)).collect();
        let count = point_ids.len() as u64;

        let builder = DeletePointsBuilder::new(&self.collection)
            .points(point_ids)
            .wait(true);

        self.client.delete_points(builder).await?;

        Ok(count)
    }

    async fn collection_info(&self) -> PromptResult<CollectionStats> {
        let info = self.client.collection_info(&self.collection).await?;

        let result = info
            .result
            .ok_or_else(|| PromptError::Store("Collection info missing result".to_string()))?;

        let (vector_size, distance) = extract_vector_params(&result.config);

        Ok(CollectionStats {
            points_count: result.points_count.unwrap_or(0),
            vector_size,
            distance,
        })
    }
}

/// Scroll page size for an emulated numeric offset. Both values are
/// caller-supplied, so the sum saturates and the cast clamps at the
/// wire type's maximum instead of wrapping.
fn scroll_fetch_size(offset: u64, limit: u64) -> u32 {
    u32::try_from(offset.saturating_add(limit)).unwrap_or(u32::MAX)
}

fn extract_vector_params(config: &Option<qdrant::CollectionConfig>) -> (u64, String) {
    let params = config
        .as_ref()
        .and_then(|c| c.params.as_ref())
        .and_then(|p| p.vectors_config.as_ref())
        .and_then(|vc| vc.config.as_ref());

    match params {
        Some(qdrant::vectors_config::Config::Params(p)) => {
            (p.size, format!("{:?}", p.distance()).to_lowercase())
        }
        Some(qdrant::vectors_config::Config::ParamsMap(map)) => map
            .map
            .values()
            .next()
            .map(|p| (p.size, format!("{:?}", p.distance()).to_lowercase()))
            .unwrap_or((0, "unknown".to_string())),
        None => (0, "unknown".to_string()),
    }
}
