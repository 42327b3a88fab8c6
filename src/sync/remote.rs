//! Remote store access.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;

use super::RemoteError;
use crate::config::SyncConfig;
use crate::db::Table;
use crate::identity::UserId;

/// Row-oriented remote store holding one table per syncable local table.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upsert a batch of rows keyed by their `id`. All or nothing.
    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<(), RemoteError>;

    /// The `limit` most recent rows owned by `user`, newest first. Tables
    /// without a time column come back in ascending `id` order.
    async fn select_recent(
        &self,
        table: Table,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<Value>, RemoteError>;
}

/// PostgREST client for a Supabase-style remote store.
pub struct RestRemote {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: RwLock<Option<String>>,
}

impl RestRemote {
    /// Every request is abandoned after `timeout`, including a server that
    /// accepts the connection and never answers.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: RwLock::new(None),
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, RemoteError> {
        match (&config.remote_url, &config.api_key) {
            (Some(url), Some(key)) => {
                Self::new(url.as_str(), key.as_str(), config.request_timeout())
            }
            _ => Err(RemoteError::NotConfigured),
        }
    }

    pub fn with_access_token(self, token: impl Into<String>) -> Self {
        Self {
            access_token: RwLock::new(Some(token.into())),
            ..self
        }
    }

    /// Swap the user token, e.g. after the session file changed.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.access_token.read().await.clone();
        request
            .header("apikey", &self.api_key)
            .bearer_auth(token.as_deref().unwrap_or(&self.api_key))
    }
}

/// Build the query URL for the most recent rows of `user`.
///
/// Tables without a time column are ordered by `id` so the same rows come
/// back on every pull.
pub fn build_select_url(base_url: &str, table: Table, user: &UserId, limit: u32) -> String {
    let mut url = format!(
        "{}/rest/v1/{}?select=*&user_id=eq.{}",
        base_url.trim_end_matches('/'),
        table,
        urlencoding::encode(user.as_str())
    );
    match table.time_column() {
        Some(column) => url.push_str(&format!("&order={}.desc", column)),
        None => url.push_str("&order=id.asc"),
    }
    url.push_str(&format!("&limit={}", limit));
    url
}

#[async_trait]
impl RemoteStore for RestRemote {
    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows);

        let response = self.authorize(request).await.send().await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn select_recent(
        &self,
        table: Table,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<Value>, RemoteError> {
        let url = build_select_url(&self.base_url, table, user, limit);
        let request = self
            .client
            .get(url)
            .header("Accept", "application/json");

        let response = self.authorize(request).await.send().await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            other => Err(RemoteError::InvalidPayload(format!(
                "expected an array of rows, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

async fn status_error(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    RemoteError::Status {
        status: status.as_u16(),
        message: parse_api_error(status, &body),
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return message.trim().to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed.to_string()
    }
}
