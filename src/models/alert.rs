use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Feed tag alerts default to when the client does not pick one.
pub const DEFAULT_SOURCE: &str = "binance";

/// Which way the price has to cross the threshold for the alert to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    /// Wire format is exactly "Above" | "Below"; anything else is rejected.
    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "Above" => Some(Direction::Above),
            "Below" => Some(Direction::Below),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "Above",
            Direction::Below => "Below",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    // Expo device token; one device may hold several alerts
    pub token: String,
    pub symbol: String,

    pub direction: Direction,
    pub price: f64,

    // which price feed this alert is evaluated against
    pub source: String,

    pub active: bool,
    pub created_at: i64,
}

impl Alert {
    /// Threshold predicate. Boundary equality counts as a crossing.
    pub fn matches(&self, price: f64) -> bool {
        match self.direction {
            Direction::Above => price >= self.price,
            Direction::Below => price <= self.price,
        }
    }
}
