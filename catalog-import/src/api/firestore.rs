//! Cloud Firestore REST client
//!
//! A [`WriteBatch`] becomes one `documents:commit` request, which Firestore
//! applies atomically. Each document is written as an `update` with an
//! `updateMask` naming exactly the payload fields, which gives merge
//! semantics: fields outside the mask keep their stored values. Server
//! timestamps travel as `REQUEST_TIME` field transforms.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::{DocumentStore, DocumentWrite, FieldValue, StoreError, WriteBatch};
use crate::config::FirestoreSettings;

pub struct FirestoreClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    database: String,
    access_token: Option<String>,
}

impl FirestoreClient {
    pub fn new(settings: FirestoreSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("catalog-import/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: settings.endpoint,
            project_id: settings.project_id,
            database: settings.database,
            access_token: settings.access_token,
        })
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database)
    }

    pub fn document_name(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/documents/{}/{}", self.database_path(), collection, doc_id)
    }

    pub fn commit_url(&self) -> String {
        format!("{}/{}/documents:commit", self.endpoint, self.database_path())
    }

    /// Request body for committing `batch`
    pub fn commit_body(&self, batch: &WriteBatch) -> Value {
        let writes: Vec<Value> = batch
            .writes()
            .iter()
            .map(|write| self.encode_write(write))
            .collect();

        json!({ "writes": writes })
    }

    fn encode_write(&self, write: &DocumentWrite) -> Value {
        let mut fields = Map::new();
        let mut mask = Vec::new();
        let mut transforms = Vec::new();

        for (name, value) in &write.fields {
            match value {
                FieldValue::String(s) => {
                    fields.insert(name.clone(), json!({ "stringValue": s }));
                    mask.push(Value::String(quote_field_path(name)));
                }
                FieldValue::ServerTimestamp => {
                    transforms.push(json!({
                        "fieldPath": quote_field_path(name),
                        "setToServerValue": "REQUEST_TIME",
                    }));
                }
            }
        }

        let mut encoded = json!({
            "update": {
                "name": self.document_name(&write.collection, &write.doc_id),
                "fields": fields,
            },
            "updateMask": { "fieldPaths": mask },
        });

        if !transforms.is_empty() {
            encoded["updateTransforms"] = Value::Array(transforms);
        }

        encoded
    }
}

/// Field names outside `[A-Za-z_][A-Za-z0-9_]*` must be backtick-quoted
fn quote_field_path(name: &str) -> String {
    let mut chars = name.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn commit(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let limit = self.max_batch_size();
        if batch.len() > limit {
            return Err(StoreError::BatchTooLarge {
                size: batch.len(),
                limit,
            });
        }

        let url = self.commit_url();
        log::debug!("POST {} ({} writes)", url, batch.len());

        let mut request = self.http.post(&url).json(&self.commit_body(batch));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        Ok(())
    }
}

/// Pull `error.message` out of a Google API error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
