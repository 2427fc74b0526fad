use std::time::Duration;

use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Item, ItemPatch};

// The spreadsheet backend only answers simple (non-preflighted) requests,
// so write bodies are JSON sent as plain text.
const WRITE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no remote endpoint configured")]
    NotConfigured,
    #[error("invalid remote endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {status}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Body of a write request; `action` selects the backend operation.
#[derive(Debug, Serialize)]
#[serde(tag = "action")]
enum WriteRequest<'a> {
    #[serde(rename = "create")]
    Create(&'a Item),
    #[serde(rename = "update")]
    Update {
        id: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<&'a str>,
        #[serde(rename = "isCompleted", skip_serializing_if = "Option::is_none")]
        is_completed: Option<bool>,
    },
    #[serde(rename = "delete")]
    Delete { id: &'a str },
    #[serde(rename = "deleteMultiple")]
    DeleteMultiple { ids: &'a [String] },
}

/// Stateless client for the sheet-backed todo endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    endpoint: Url,
    http: Client,
}

impl RemoteClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|err| RemoteError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme {}", endpoint.scheme()),
            });
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn fetch_all(&self) -> Result<Vec<Item>, RemoteError> {
        let resp = self.http.get(self.endpoint.clone()).send().await?;
        Self::parse(resp).await
    }

    pub async fn create(&self, item: &Item) -> Result<serde_json::Value, RemoteError> {
        self.write(&WriteRequest::Create(item)).await
    }

    pub async fn update(
        &self,
        id: &str,
        patch: &ItemPatch,
    ) -> Result<serde_json::Value, RemoteError> {
        self.write(&WriteRequest::Update {
            id,
            text: patch.text.as_deref(),
            is_completed: patch.is_completed,
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value, RemoteError> {
        self.write(&WriteRequest::Delete { id }).await
    }

    pub async fn delete_many(&self, ids: &[String]) -> Result<serde_json::Value, RemoteError> {
        self.write(&WriteRequest::DeleteMultiple { ids }).await
    }

    async fn write(&self, request: &WriteRequest<'_>) -> Result<serde_json::Value, RemoteError> {
        let body = serde_json::to_string(request)?;
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, WRITE_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RemoteError> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Status { status, body: text });
        }
        Ok(serde_json::from_str(&text)?)
    }
}
