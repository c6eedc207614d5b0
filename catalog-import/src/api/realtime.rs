//! Firebase Realtime Database REST client
//!
//! A partial update is a `PATCH` of `{base}/{path}.json`; the database
//! merges the body's keys into the existing node and leaves the rest alone.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{PathStore, StoreError, StorePath};
use crate::config::RealtimeSettings;

pub struct RealtimeClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RealtimeClient {
    pub fn new(settings: RealtimeSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("catalog-import/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: settings.base_url,
            auth_token: settings.auth_token,
        })
    }

    /// REST URL of the node at `path` (without the auth query)
    pub fn url_for(&self, path: &StorePath) -> String {
        format!("{}/{}.json", self.base_url, path.encoded())
    }
}

#[async_trait]
impl PathStore for RealtimeClient {
    async fn partial_update(
        &self,
        path: &StorePath,
        payload: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let url = self.url_for(path);
        log::debug!("PATCH {}", url);

        let mut request = self.http.patch(&url).json(payload);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        Ok(())
    }
}
