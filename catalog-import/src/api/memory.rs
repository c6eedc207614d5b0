//! In-memory stores
//!
//! Behave like the real stores for the operations the importer uses:
//! partial updates merge into a JSON tree, document commits are
//! all-or-nothing merge upserts. Used for `--dry-run` and by tests, which
//! can make chosen paths or commits fail.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{DocumentStore, FieldValue, PathStore, StoreError, StorePath, WriteBatch};
use crate::config::MAX_BATCH_SIZE;

/// Tracks how many calls are running at once
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Path-keyed store holding a single JSON tree
#[derive(Debug)]
pub struct MemoryPathStore {
    root: Mutex<Value>,
    failing: HashSet<String>,
    writes: AtomicUsize,
    in_flight: InFlight,
}

impl Default for MemoryPathStore {
    fn default() -> Self {
        Self::with_data(Value::Object(Map::new()))
    }
}

impl MemoryPathStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing tree
    pub fn with_data(root: Value) -> Self {
        Self {
            root: Mutex::new(root),
            failing: HashSet::new(),
            writes: AtomicUsize::new(0),
            in_flight: InFlight::default(),
        }
    }

    /// Reject every update addressed to `path` (raw form, e.g. `golgran/44-1`)
    #[cfg(test)]
    pub fn fail_on(mut self, path: impl Into<String>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Copy of the whole tree
    pub fn snapshot(&self) -> Value {
        lock(&self.root).clone()
    }

    /// Node at a raw slash-separated path
    #[cfg(test)]
    pub fn get(&self, path: &str) -> Option<Value> {
        let root = lock(&self.root);
        let mut node = &*root;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.get(segment)?;
        }
        Some(node.clone())
    }

    /// Number of updates applied
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Most updates ever running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak()
    }

    fn apply(&self, path: &StorePath, payload: &Map<String, Value>) {
        let mut root = lock(&self.root);
        let mut node = &mut *root;

        for segment in path.segments() {
            node = as_object(node)
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        let target = as_object(node);
        for (key, value) in payload {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// The object at `value`, replacing any scalar found there
fn as_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

#[async_trait]
impl PathStore for MemoryPathStore {
    async fn partial_update(
        &self,
        path: &StorePath,
        payload: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.in_flight.enter();
        // Give any concurrently issued update the chance to overlap
        tokio::task::yield_now().await;

        let result = if self.failing.contains(&path.to_string()) {
            Err(StoreError::Rejected(format!("write to {} refused", path)))
        } else {
            self.apply(path, payload);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        self.in_flight.leave();
        result
    }
}

type Collection = BTreeMap<String, Map<String, Value>>;

/// Document store keyed by collection, then document id
#[derive(Debug)]
pub struct MemoryDocumentStore {
    collections: Mutex<BTreeMap<String, Collection>>,
    failing_commits: HashSet<usize>,
    commits: AtomicUsize,
    in_flight: InFlight,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self {
            collections: Mutex::new(BTreeMap::new()),
            failing_commits: HashSet::new(),
            commits: AtomicUsize::new(0),
            in_flight: InFlight::default(),
        }
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `n`th commit (1-based)
    #[cfg(test)]
    pub fn fail_commit(mut self, n: usize) -> Self {
        self.failing_commits.insert(n);
        self
    }

    /// Store a document directly, bypassing batches
    #[cfg(test)]
    pub fn seed(&self, collection: &str, doc_id: &str, fields: Map<String, Value>) {
        lock(&self.collections)
            .entry(collection.to_string())
            .or_default()
            .insert(doc_id.to_string(), fields);
    }

    #[cfg(test)]
    pub fn document(&self, collection: &str, doc_id: &str) -> Option<Map<String, Value>> {
        lock(&self.collections)
            .get(collection)
            .and_then(|docs| docs.get(doc_id))
            .cloned()
    }

    pub fn document_count(&self, collection: &str) -> usize {
        lock(&self.collections)
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Commit attempts so far, successful or not
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Most commits ever running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak()
    }

    fn apply(&self, batch: &WriteBatch) {
        let now = Value::String(chrono::Utc::now().to_rfc3339());
        let mut collections = lock(&self.collections);

        for write in batch.writes() {
            let doc = collections
                .entry(write.collection.clone())
                .or_default()
                .entry(write.doc_id.clone())
                .or_default();

            for (name, value) in &write.fields {
                let value = match value {
                    FieldValue::String(s) => Value::String(s.clone()),
                    FieldValue::ServerTimestamp => now.clone(),
                };
                doc.insert(name.clone(), value);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        self.in_flight.enter();
        tokio::task::yield_now().await;

        let n = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
        let result = if batch.len() > MAX_BATCH_SIZE {
            Err(StoreError::BatchTooLarge {
                size: batch.len(),
                limit: MAX_BATCH_SIZE,
            })
        } else if self.failing_commits.contains(&n) {
            Err(StoreError::Rejected(format!("commit {} refused", n)))
        } else {
            self.apply(batch);
            Ok(())
        };

        self.in_flight.leave();
        result
    }
}
