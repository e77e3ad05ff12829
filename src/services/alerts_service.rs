use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::error::ApiError;
use crate::models::{Alert, Direction};
use crate::services::store::AlertStore;

/// Cap on simultaneously active alerts per device token. Firing or deleting
/// an alert frees capacity.
pub const MAX_ACTIVE_ALERTS: u64 = 10;

pub struct NewAlert {
    pub token: String,
    pub symbol: String,
    pub direction: Direction,
    pub price: f64,
    pub source: String,
}

pub async fn register_alert(store: &dyn AlertStore, new: NewAlert) -> Result<Alert, ApiError> {
    // Count-then-insert: two concurrent registrations for one token can
    // overshoot the cap slightly. Accepted; the cap is a soft limit.
    let active = store.count_active(&new.token).await?;
    if active >= MAX_ACTIVE_ALERTS {
        return Err(ApiError::CapacityExceeded);
    }

    let alert = Alert {
        id: ObjectId::new(),
        token: new.token,
        symbol: new.symbol,
        direction: new.direction,
        price: new.price,
        source: new.source,
        active: true,
        created_at: Utc::now().timestamp(),
    };

    store.insert(&alert).await?;
    Ok(alert)
}

pub async fn list_alerts(store: &dyn AlertStore, token: &str) -> Result<Vec<Alert>, ApiError> {
    Ok(store.list_active(token).await?)
}

pub async fn delete_alert(
    store: &dyn AlertStore,
    id: ObjectId,
    token: &str,
) -> Result<(), ApiError> {
    // A foreign token gets the same answer as a missing id, so the endpoint
    // cannot be used to probe which ids exist.
    if store.deactivate_if_owned(id, token).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}
