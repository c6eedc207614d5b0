//! Document payloads and write batches

use std::collections::BTreeMap;

/// Value of one document field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    /// Replaced by the store's own clock when the write is applied
    ServerTimestamp,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

/// Document fields by name
pub type Document = BTreeMap<String, FieldValue>;

/// A merge write of `fields` into `collection/doc_id`
///
/// Only the listed fields are set; every other field already stored on the
/// document is preserved. A missing document is created.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub collection: String,
    pub doc_id: String,
    pub fields: Document,
}

/// Writes queued for one atomic commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<DocumentWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a merge upsert
    pub fn upsert(
        &mut self,
        collection: impl Into<String>,
        doc_id: impl Into<String>,
        fields: Document,
    ) -> &mut Self {
        self.writes.push(DocumentWrite {
            collection: collection.into(),
            doc_id: doc_id.into(),
            fields,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[DocumentWrite] {
        &self.writes
    }
}
