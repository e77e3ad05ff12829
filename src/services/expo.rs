use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

const PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Best-effort push delivery. Callers log failures and move on; nothing in
/// alert state depends on the outcome.
#[async_trait]
pub trait PushSink: Send + Sync {
    async fn send(&self, token: &str, title: &str, body: &str) -> Result<(), DeliveryError>;
}

#[derive(Clone)]
pub struct ExpoPushClient {
    http: Client,
    push_url: String,
}

impl ExpoPushClient {
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            push_url: PUSH_URL.to_string(),
        }
    }
}

impl Default for ExpoPushClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushSink for ExpoPushClient {
    async fn send(&self, token: &str, title: &str, body: &str) -> Result<(), DeliveryError> {
        let res = self
            .http
            .post(&self.push_url)
            .json(&json!({ "to": token, "title": title, "body": body }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }

        Ok(())
    }
}
