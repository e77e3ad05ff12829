use axum::{
    Json,
    extract::{Path, Query, State},
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    error::ApiError,
    models::{Direction, alert::DEFAULT_SOURCE},
    services::alerts_service::{self, NewAlert},
};

/// Accepts a JSON number or a numeric string; clients send both.
fn parse_price(v: &Value) -> Option<f64> {
    let price = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (price.is_finite() && price >= 0.0).then_some(price)
}

fn invalid_payload() -> ApiError {
    ApiError::Validation("Invalid payload".to_string())
}

#[derive(Deserialize)]
pub struct RegisterAlertRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub token: Option<String>,
}

// POST /register_alert
pub async fn post_register_alert(
    State(state): State<AppState>,
    Json(req): Json<RegisterAlertRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = req.token.unwrap_or_default().trim().to_string();
    let symbol = req.symbol.unwrap_or_default().trim().to_uppercase();
    if token.is_empty() || symbol.is_empty() {
        return Err(invalid_payload());
    }

    let Some(direction) = Direction::parse(req.direction.as_deref().unwrap_or("Above")) else {
        return Err(invalid_payload());
    };

    let price = req
        .price
        .as_ref()
        .and_then(parse_price)
        .ok_or_else(invalid_payload)?;

    let source = req.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let alert = alerts_service::register_alert(
        state.store.as_ref(),
        NewAlert {
            token,
            symbol,
            direction,
            price,
            source,
        },
    )
    .await?;

    Ok(Json(json!({ "status": "ok", "id": alert.id.to_hex() })))
}

// GET /alerts?token=
pub async fn get_alerts(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
) -> Result<Json<Value>, ApiError> {
    let token = q.token.unwrap_or_default();
    let alerts = alerts_service::list_alerts(state.store.as_ref(), &token).await?;

    let items: Vec<Value> = alerts
        .into_iter()
        .map(|a| {
            json!({
                "id": a.id.to_hex(),
                "symbol": a.symbol,
                "direction": a.direction.as_str(),
                "price": a.price,
                "source": a.source,
            })
        })
        .collect();

    Ok(Json(Value::Array(items)))
}

// DELETE /alert/:id?token=
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<TokenQuery>,
) -> Result<Json<Value>, ApiError> {
    // An unparseable id is indistinguishable from an unknown one.
    let oid = ObjectId::parse_str(&id).map_err(|_| ApiError::NotFound)?;
    let token = q.token.unwrap_or_default();

    alerts_service::delete_alert(state.store.as_ref(), oid, &token).await?;

    Ok(Json(json!({ "status": "deleted" })))
}
