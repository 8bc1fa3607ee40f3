//! Blob store backed by the hosted object storage API.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::json;
use tracing::debug;

use haulmark_core::config::StoreConfig;
use haulmark_core::error::{AppError, ErrorKind};
use haulmark_core::result::AppResult;
use haulmark_core::traits::BlobStore;

use crate::keys::validate_key;

/// Object storage client sharing the record store's project URL and keys.
#[derive(Debug, Clone)]
pub struct RestBlobStore {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestBlobStore {
    /// Create a storage client from the store configuration.
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
            access_token,
        })
    }

    /// `{base}/storage/v1/object/{prefix..}/{bucket}/{key..}` with each
    /// segment percent-encoded.
    fn object_url(&self, prefix: &[&str], bucket: &str, key: Option<&str>) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/storage/v1/object", self.base_url))
            .map_err(|e| AppError::configuration(format!("Invalid storage URL: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::configuration("Storage URL cannot be a base"))?;
            segments.extend(prefix);
            segments.push(bucket);
            if let Some(key) = key {
                segments.extend(key.split('/'));
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder, target: &str, op: &str) -> AppResult<Response> {
        debug!(target, op, "Storage call");
        let response = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Storage request for '{target}' failed: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });

        Err(AppError::new(
            ErrorKind::from_http_status(status.as_u16(), ErrorKind::Storage),
            format!("{op} of '{target}' failed: {message}"),
        ))
    }
}

#[async_trait]
impl BlobStore for RestBlobStore {
    fn provider_type(&self) -> &str {
        "rest"
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> AppResult<()> {
        validate_key(bucket, key)?;
        let url = self.object_url(&[], bucket, Some(key))?;
        let request = self
            .request(Method::POST, url)
            .header(
                "content-type",
                content_type.unwrap_or("application/octet-stream"),
            )
            .header("x-upsert", "false")
            .body(data);
        self.send(request, &format!("{bucket}/{key}"), "upload")
            .await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        match self.object_url(&["public"], bucket, Some(key)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/storage/v1/object/public/{bucket}/{key}", self.base_url),
        }
    }

    async fn download(&self, bucket: &str, key: &str) -> AppResult<Bytes> {
        validate_key(bucket, key)?;
        let url = self.object_url(&[], bucket, Some(key))?;
        let target = format!("{bucket}/{key}");
        let response = self
            .send(self.request(Method::GET, url), &target, "download")
            .await?;
        response.bytes().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read body of '{target}'"),
                e,
            )
        })
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> AppResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let url = self.object_url(&[], bucket, None)?;
        let request = self
            .request(Method::DELETE, url)
            .json(&json!({ "prefixes": keys }));
        self.send(request, bucket, "remove").await?;
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool> {
        validate_key(bucket, key)?;
        let url = self.object_url(&[], bucket, Some(key))?;
        let response = self
            .request(Method::HEAD, url)
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Storage request failed", e))?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(false),
            status => Err(AppError::new(
                ErrorKind::from_http_status(status.as_u16(), ErrorKind::Storage),
                format!("exists check of '{bucket}/{key}' failed: {status}"),
            )),
        }
    }
}
