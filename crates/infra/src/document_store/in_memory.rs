use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::{Map, Value as JsonValue};

use super::r#trait::{AtomicBatch, DocRef, Document, DocumentStore, Filter, StoreError, Write};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// In-memory document store.
///
/// Intended for tests/dev. A single `RwLock` serializes batches, which is
/// what makes concurrent acceptance attempts observe each other.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

fn current<'a>(
    base: &'a Collections,
    staged: &'a BTreeMap<DocRef, Option<Document>>,
    target: &DocRef,
) -> Option<&'a Document> {
    match staged.get(target) {
        Some(entry) => entry.as_ref(),
        None => base.get(&target.collection).and_then(|c| c.get(&target.id)),
    }
}

fn as_object(data: JsonValue, target: &DocRef) -> Result<Map<String, JsonValue>, StoreError> {
    match data {
        JsonValue::Object(map) => Ok(map),
        _ => Err(StoreError::Serialization(format!("{target}: document body must be an object"))),
    }
}

/// Compute the post-write state of one document.
fn apply_write(existing: Option<&Document>, write: Write) -> Result<Option<Document>, StoreError> {
    let next_version = existing.map(|d| d.version).unwrap_or(0) + 1;

    match write {
        Write::Create { target, data } => {
            if existing.is_some() {
                return Err(StoreError::AlreadyExists(target.to_string()));
            }
            let data = JsonValue::Object(as_object(data, &target)?);
            Ok(Some(Document {
                id: target.id,
                version: next_version,
                data,
            }))
        }
        Write::Set { target, data } => {
            let data = JsonValue::Object(as_object(data, &target)?);
            Ok(Some(Document {
                id: target.id,
                version: next_version,
                data,
            }))
        }
        Write::Merge { target, patch } => {
            let doc = existing.ok_or_else(|| StoreError::Missing(target.to_string()))?;
            let mut body = as_object(doc.data.clone(), &target)?;
            for (key, value) in as_object(patch, &target)? {
                if value.is_null() {
                    body.remove(&key);
                } else {
                    body.insert(key, value);
                }
            }
            Ok(Some(Document {
                id: target.id,
                version: next_version,
                data: JsonValue::Object(body),
            }))
        }
        Write::ArrayUnion {
            target,
            field,
            values,
        } => {
            let doc = existing.ok_or_else(|| StoreError::Missing(target.to_string()))?;
            let mut body = as_object(doc.data.clone(), &target)?;
            let entry = body
                .entry(field.clone())
                .or_insert_with(|| JsonValue::Array(Vec::new()));
            let items = entry.as_array_mut().ok_or_else(|| {
                StoreError::Serialization(format!("{target}: field '{field}' is not an array"))
            })?;
            for value in values {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
            Ok(Some(Document {
                id: target.id,
                version: next_version,
                data: JsonValue::Object(body),
            }))
        }
        Write::Delete { .. } => Ok(None),
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .values()
            .filter(|doc| filters.iter().all(|f| f.matches(&doc.data)))
            .cloned()
            .collect())
    }

    fn run_atomic_batch(&self, batch: AtomicBatch) -> Result<(), StoreError> {
        if batch.preconditions.is_empty() && batch.writes.is_empty() {
            return Ok(());
        }

        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;

        // 1) Preconditions against committed state.
        for pre in &batch.preconditions {
            let actual = collections
                .get(&pre.target.collection)
                .and_then(|c| c.get(&pre.target.id))
                .map(|d| d.version)
                .unwrap_or(0);
            if !pre.expected.matches(actual) {
                return Err(StoreError::Conflict(format!(
                    "{}: expected {:?}, found version {actual}",
                    pre.target, pre.expected
                )));
            }
        }

        // 2) Stage every write; any failure leaves committed state untouched.
        let mut staged: BTreeMap<DocRef, Option<Document>> = BTreeMap::new();
        for write in batch.writes {
            let target = write.target().clone();
            let next = apply_write(current(&collections, &staged, &target), write)?;
            staged.insert(target, next);
        }

        // 3) Commit.
        for (target, doc) in staged {
            match doc {
                Some(doc) => {
                    collections
                        .entry(target.collection)
                        .or_default()
                        .insert(target.id, doc);
                }
                None => {
                    if let Some(c) = collections.get_mut(&target.collection) {
                        c.remove(&target.id);
                    }
                }
            }
        }

        Ok(())
    }
}
