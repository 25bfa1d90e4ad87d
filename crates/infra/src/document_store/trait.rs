use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use timberline_core::ExpectedVersion;

/// A stored document and the revision it was read at.
///
/// Versions start at 1 on creation and increase by one on every write.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub version: u64,
    pub data: JsonValue,
}

/// Address of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocRef {
    pub collection: String,
    pub id: String,
}

impl DocRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl core::fmt::Display for DocRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Query predicate over top-level document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value.
    Eq(String, JsonValue),
    /// Array field contains value.
    ArrayContains(String, JsonValue),
    /// Field equals one of the values.
    In(String, Vec<JsonValue>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Filter::ArrayContains(field.into(), value.into())
    }

    pub fn is_in(field: impl Into<String>, values: impl IntoIterator<Item = JsonValue>) -> Self {
        Filter::In(field.into(), values.into_iter().collect())
    }

    pub fn matches(&self, data: &JsonValue) -> bool {
        match self {
            Filter::Eq(field, value) => data.get(field) == Some(value),
            Filter::ArrayContains(field, value) => data
                .get(field)
                .and_then(JsonValue::as_array)
                .is_some_and(|items| items.contains(value)),
            Filter::In(field, values) => data.get(field).is_some_and(|v| values.contains(v)),
        }
    }
}

/// Guard checked before any write of a batch is applied.
///
/// The current version of a missing document is 0, so
/// `ExpectedVersion::ABSENT` means "must not exist".
#[derive(Debug, Clone, PartialEq)]
pub struct Precondition {
    pub target: DocRef,
    pub expected: ExpectedVersion,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Insert a new document; fails with `AlreadyExists` if present.
    Create { target: DocRef, data: JsonValue },
    /// Insert or replace the whole document.
    Set { target: DocRef, data: JsonValue },
    /// Shallow merge into an existing document; `null` removes a field.
    Merge { target: DocRef, patch: JsonValue },
    /// Append values missing from an array field of an existing document.
    ArrayUnion {
        target: DocRef,
        field: String,
        values: Vec<JsonValue>,
    },
    /// Remove the document if present.
    Delete { target: DocRef },
}

impl Write {
    pub fn target(&self) -> &DocRef {
        match self {
            Write::Create { target, .. }
            | Write::Set { target, .. }
            | Write::Merge { target, .. }
            | Write::ArrayUnion { target, .. }
            | Write::Delete { target } => target,
        }
    }
}

/// A set of writes committed all together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomicBatch {
    pub preconditions: Vec<Precondition>,
    pub writes: Vec<Write>,
}

impl AtomicBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn require(mut self, collection: &str, id: impl ToString, expected: ExpectedVersion) -> Self {
        self.preconditions.push(Precondition {
            target: DocRef::new(collection, id.to_string()),
            expected,
        });
        self
    }

    pub fn create<T: Serialize>(
        mut self,
        collection: &str,
        id: impl ToString,
        value: &T,
    ) -> Result<Self, StoreError> {
        self.writes.push(Write::Create {
            target: DocRef::new(collection, id.to_string()),
            data: serde_json::to_value(value)?,
        });
        Ok(self)
    }

    pub fn set<T: Serialize>(
        mut self,
        collection: &str,
        id: impl ToString,
        value: &T,
    ) -> Result<Self, StoreError> {
        self.writes.push(Write::Set {
            target: DocRef::new(collection, id.to_string()),
            data: serde_json::to_value(value)?,
        });
        Ok(self)
    }

    pub fn merge(mut self, collection: &str, id: impl ToString, patch: JsonValue) -> Self {
        self.writes.push(Write::Merge {
            target: DocRef::new(collection, id.to_string()),
            patch,
        });
        self
    }

    pub fn array_union(
        mut self,
        collection: &str,
        id: impl ToString,
        field: impl Into<String>,
        values: Vec<JsonValue>,
    ) -> Self {
        self.writes.push(Write::ArrayUnion {
            target: DocRef::new(collection, id.to_string()),
            field: field.into(),
            values,
        });
        self
    }

    pub fn delete(mut self, collection: &str, id: impl ToString) -> Self {
        self.writes.push(Write::Delete {
            target: DocRef::new(collection, id.to_string()),
        });
        self
    }
}

/// Document store operation error.
///
/// These are storage failures, as opposed to domain decisions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A batch precondition did not hold (concurrent modification).
    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("document does not exist: {0}")]
    Missing(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The store could not be reached or its state is unusable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Serialization(value.to_string())
    }
}

/// Collection-oriented JSON document store.
///
/// Implementations must apply an [`AtomicBatch`] atomically: every
/// precondition is checked and every write validated before any write takes
/// effect. Concurrent batches touching the same documents are serialized.
pub trait DocumentStore: Send + Sync {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Documents of `collection` matching every filter, ordered by id.
    fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError>;

    fn run_atomic_batch(&self, batch: AtomicBatch) -> Result<(), StoreError>;

    fn set(&self, collection: &str, id: &str, data: JsonValue) -> Result<(), StoreError> {
        self.run_atomic_batch(AtomicBatch {
            preconditions: Vec::new(),
            writes: vec![Write::Set {
                target: DocRef::new(collection, id),
                data,
            }],
        })
    }

    fn update(&self, collection: &str, id: &str, patch: JsonValue) -> Result<(), StoreError> {
        self.run_atomic_batch(AtomicBatch::new().merge(collection, id, patch))
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.run_atomic_batch(AtomicBatch::new().delete(collection, id))
    }
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        (**self).get(collection, id)
    }

    fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        (**self).query(collection, filters)
    }

    fn run_atomic_batch(&self, batch: AtomicBatch) -> Result<(), StoreError> {
        (**self).run_atomic_batch(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_match_top_level_fields() {
        let doc = json!({ "projectId": "p1", "status": "pending", "viewers": ["a", "b"] });

        assert!(Filter::eq("projectId", "p1").matches(&doc));
        assert!(!Filter::eq("projectId", "p2").matches(&doc));
        assert!(Filter::array_contains("viewers", "b").matches(&doc));
        assert!(!Filter::array_contains("status", "pending").matches(&doc));
        assert!(Filter::is_in("status", [json!("pending"), json!("quoted")]).matches(&doc));
        assert!(!Filter::is_in("missing", [json!(null)]).matches(&doc));
    }
}
