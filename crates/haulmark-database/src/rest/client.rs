//! HTTP record store speaking the hosted service's REST dialect.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use tracing::debug;

use haulmark_core::config::StoreConfig;
use haulmark_core::error::{AppError, ErrorKind};
use haulmark_core::result::AppResult;
use haulmark_core::traits::RecordStore;
use haulmark_core::types::{Row, SelectQuery};

use super::query;

/// Error body returned by the REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Record store backed by the hosted REST API.
///
/// A handle carries the caller's access token; the service's row-level
/// policies decide what that caller can see and change.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    client: Client,
    base_url: String,
    anon_key: String,
    schema: String,
    access_token: Option<String>,
}

impl RestRecordStore {
    /// Create a store client from configuration.
    pub fn new(config: &StoreConfig, access_token: Option<String>) -> AppResult<Self> {
        if config.url.is_empty() {
            return Err(AppError::configuration("store.url is not set"));
        }
        Url::parse(&config.url).map_err(|e| {
            AppError::configuration(format!("Invalid store.url '{}': {e}", config.url))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to create HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            schema: config.schema.clone(),
            access_token,
        })
    }

    /// A handle acting for another caller.
    pub fn with_access_token(&self, access_token: Option<String>) -> Self {
        Self {
            access_token,
            ..self.clone()
        }
    }

    fn table_url(&self, table: &str, params: &[(String, String)]) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/rest/v1/{table}", self.base_url))
            .map_err(|e| AppError::configuration(format!("Invalid table URL: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, write: bool) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        let profile_header = if write {
            "Content-Profile"
        } else {
            "Accept-Profile"
        };
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header(profile_header, &self.schema)
    }

    async fn send(&self, request: RequestBuilder, table: &str, op: &str) -> AppResult<Response> {
        debug!(table, op, "REST store call");
        let response = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Request to '{table}' failed: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(api) => {
                let mut message = api.message.unwrap_or_else(|| status.to_string());
                if let Some(details) = api.details {
                    message.push_str(&format!(" ({details})"));
                }
                if let Some(hint) = api.hint {
                    message.push_str(&format!(" hint: {hint}"));
                }
                if let Some(code) = api.code {
                    message = format!("[{code}] {message}");
                }
                message
            }
            Err(_) if body.is_empty() => status.to_string(),
            Err(_) => body,
        };

        Err(AppError::new(
            ErrorKind::from_http_status(status.as_u16(), ErrorKind::Database),
            format!("{op} on '{table}' failed: {message}"),
        ))
    }

    async fn rows(response: Response, table: &str) -> AppResult<Vec<Row>> {
        response.json::<Vec<Row>>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Unexpected response body from '{table}'"),
                e,
            )
        })
    }

    fn single(mut rows: Vec<Row>, table: &str, id: &str) -> AppResult<Row> {
        if rows.is_empty() {
            return Err(AppError::not_found(format!(
                "No row '{id}' in '{table}' is visible to this caller"
            )));
        }
        Ok(rows.swap_remove(0))
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    fn backend_type(&self) -> &str {
        "rest"
    }

    async fn health_check(&self) -> AppResult<bool> {
        let url = Url::parse(&format!("{}/rest/v1/", self.base_url))
            .map_err(|e| AppError::configuration(format!("Invalid store URL: {e}")))?;
        match self.request(Method::GET, url, false).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> AppResult<Vec<Row>> {
        let url = self.table_url(table, &query::select_params(query))?;
        let response = self
            .send(self.request(Method::GET, url, false), table, "select")
            .await?;
        Self::rows(response, table).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>> {
        let url = self.table_url(table, &[])?;
        let request = self
            .request(Method::POST, url, true)
            .header("Prefer", "return=representation")
            .json(&rows);
        let response = self.send(request, table, "insert").await?;
        Self::rows(response, table).await
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        on_conflict: &[&str],
    ) -> AppResult<Vec<Row>> {
        let params = vec![("on_conflict".to_string(), on_conflict.join(","))];
        let url = self.table_url(table, &params)?;
        let request = self
            .request(Method::POST, url, true)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&rows);
        let response = self.send(request, table, "upsert").await?;
        Self::rows(response, table).await
    }

    async fn update(&self, table: &str, id: &str, fields: Row) -> AppResult<Row> {
        let url = self.table_url(table, &[query::id_param(id)])?;
        let request = self
            .request(Method::PATCH, url, true)
            .header("Prefer", "return=representation")
            .json(&fields);
        let response = self.send(request, table, "update").await?;
        Self::single(Self::rows(response, table).await?, table, id)
    }

    async fn delete(&self, table: &str, id: &str) -> AppResult<()> {
        let url = self.table_url(table, &[query::id_param(id)])?;
        let request = self
            .request(Method::DELETE, url, true)
            .header("Prefer", "return=representation");
        let response = self.send(request, table, "delete").await?;
        Self::single(Self::rows(response, table).await?, table, id).map(|_| ())
    }
}
