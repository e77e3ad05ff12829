use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// Feed tag for alerts fed by the charting-platform webhook.
pub const WEBHOOK_SOURCE: &str = "tradingview";

/// Accepts a JSON number or a numeric string; clients send both.
fn parse_price(v: &Value) -> Option<f64> {
    let price = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (price.is_finite() && price >= 0.0).then_some(price)
}

#[derive(Deserialize)]
pub struct WebhookQuery {
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
}

// POST /tv_webhook?secret=
pub async fn post_webhook(
    State(state): State<AppState>,
    Query(q): Query<WebhookQuery>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<Value>, ApiError> {
    // Reject before touching the payload at all.
    if q.secret.as_deref() != Some(state.settings.webhook_secret.as_str()) {
        return Err(ApiError::Unauthorized);
    }

    let symbol = payload.symbol.unwrap_or_default().trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ApiError::Validation("Invalid payload".to_string()));
    }

    let price = payload
        .price
        .as_ref()
        .and_then(parse_price)
        .ok_or_else(|| ApiError::Validation("Invalid payload".to_string()))?;

    let triggered = state.engine.evaluate(&symbol, price, WEBHOOK_SOURCE).await?;

    Ok(Json(json!({ "status": "ok", "triggered": triggered })))
}
