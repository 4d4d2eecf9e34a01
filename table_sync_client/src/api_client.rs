//! HTTP API client for the table server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use table_sync::{
    ActionKind, Address, SyncError, SyncResult,
    gateway::{ActionSubmitter, TableGateway},
};

/// Per-request timeout; a poll that hangs longer is treated as failed
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API client for the table server and its signing proxy
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ActionRequest<'a> {
    action: &'a str,
    amount: &'a str,
    nonce: u64,
}

/// `{ "result": { "data": ... } }` wrapper used by the nonce and deal
/// endpoints
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<EnvelopeResult>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResult {
    #[serde(default)]
    data: Option<Value>,
}

impl Envelope {
    fn into_data(self) -> Option<Value> {
        self.result.and_then(|result| result.data)
    }
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> SyncResult<Value> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("Failed to reach {}: {}", url, e)))?;

        read_json(&url, response).await
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> SyncResult<Value> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("Failed to reach {}: {}", url, e)))?;

        read_json(&url, response).await
    }
}

/// Turn a response into JSON, mapping non-2xx statuses to transport errors
async fn read_json(url: &str, response: Response) -> SyncResult<Value> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
        return Err(SyncError::Transport(format!(
            "{} returned {}: {}",
            url, status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| SyncError::MalformedResponse(format!("{} sent invalid JSON: {}", url, e)))
}

/// Pull `result.data` out of an enveloped response
fn envelope_data(payload: Value) -> SyncResult<Value> {
    let envelope: Envelope = serde_json::from_value(payload)
        .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;

    envelope
        .into_data()
        .ok_or_else(|| SyncError::MalformedResponse("response has no result.data".to_string()))
}

/// Nonces arrive either as numbers or as decimal strings
fn parse_nonce(data: &Value) -> SyncResult<u64> {
    let nonce = data.get("nonce").and_then(|nonce| match nonce {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });

    nonce.ok_or_else(|| SyncError::MalformedResponse(format!("no usable nonce in {}", data)))
}

#[async_trait]
impl TableGateway for ApiClient {
    async fn fetch_table_state(&self, table_id: &str) -> SyncResult<Value> {
        self.get_json(&format!("get_game_state/{}", table_id)).await
    }

    async fn fetch_seat_data(&self, table_id: &str, seat: u8) -> SyncResult<Value> {
        self.get_json(&format!("table/{}/player/{}", table_id, seat))
            .await
    }

    async fn fetch_nonce(&self, address: &Address) -> SyncResult<u64> {
        let payload = self.get_json(&format!("nonce/{}", address)).await?;
        parse_nonce(&envelope_data(payload)?)
    }

    async fn request_deal(&self, table_id: &str) -> SyncResult<Value> {
        let payload = self
            .post_json(&format!("table/{}/deal", table_id), &Value::Null)
            .await?;
        envelope_data(payload)
    }
}

#[async_trait]
impl ActionSubmitter for ApiClient {
    async fn submit_action(
        &self,
        table_id: &str,
        action: &ActionKind,
        amount: &str,
        nonce: u64,
    ) -> SyncResult<()> {
        let request = ActionRequest {
            action: action.as_str(),
            amount,
            nonce,
        };

        match self
            .post_json(&format!("table/{}/action", table_id), &request)
            .await
        {
            Ok(_) => Ok(()),
            Err(SyncError::Transport(reason)) => Err(SyncError::Submission(reason)),
            Err(e) => Err(e),
        }
    }
}
