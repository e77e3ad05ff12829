use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const BASE_URL: &str = "https://api.binance.com/api/v3";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("bad price in response: {0}")]
    Parse(String),
}

/// Anything that can answer "what does SYMBOL trade at right now".
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn get_price(&self, symbol: &str) -> Result<f64, FetchError>;
}

#[derive(Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: BASE_URL.to_string(),
        }
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

// Binance serves the price as a JSON string.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

#[async_trait]
impl PriceSource for BinanceClient {
    async fn get_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let url = format!("{}/ticker/price", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let ticker = res.json::<TickerPrice>().await?;
        ticker
            .price
            .parse::<f64>()
            .map_err(|_| FetchError::Parse(ticker.price.clone()))
    }
}
