use anyhow::Result;
use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use crate::models::Alert;

/// Persistence contract for alerts.
///
/// `try_deactivate` is the linchpin: it must be a single conditional update,
/// so that two evaluators racing on the same alert cannot both observe the
/// active→inactive transition as theirs.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn insert(&self, alert: &Alert) -> Result<ObjectId>;
    async fn count_active(&self, token: &str) -> Result<u64>;
    async fn list_active(&self, token: &str) -> Result<Vec<Alert>>;
    async fn distinct_symbols(&self, source: &str) -> Result<Vec<String>>;
    async fn find_candidates(&self, symbol: &str, source: &str) -> Result<Vec<Alert>>;
    async fn try_deactivate(&self, id: ObjectId) -> Result<bool>;
    async fn deactivate_if_owned(&self, id: ObjectId, token: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct MongoAlertStore {
    db: Database,
}

impl MongoAlertStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn alerts(&self) -> Collection<Alert> {
        self.db.collection::<Alert>("alerts")
    }
}

#[async_trait]
impl AlertStore for MongoAlertStore {
    async fn insert(&self, alert: &Alert) -> Result<ObjectId> {
        self.alerts().insert_one(alert, None).await?;
        Ok(alert.id)
    }

    async fn count_active(&self, token: &str) -> Result<u64> {
        let n = self
            .alerts()
            .count_documents(doc! { "token": token, "active": true }, None)
            .await?;
        Ok(n)
    }

    async fn list_active(&self, token: &str) -> Result<Vec<Alert>> {
        let find_opts = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mut cursor = self
            .alerts()
            .find(doc! { "token": token, "active": true }, find_opts)
            .await?;

        let mut items: Vec<Alert> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }

        Ok(items)
    }

    async fn distinct_symbols(&self, source: &str) -> Result<Vec<String>> {
        let values = self
            .alerts()
            .distinct("symbol", doc! { "active": true, "source": source }, None)
            .await?;

        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect())
    }

    async fn find_candidates(&self, symbol: &str, source: &str) -> Result<Vec<Alert>> {
        let mut cursor = self
            .alerts()
            .find(
                doc! { "active": true, "symbol": symbol, "source": source },
                None,
            )
            .await?;

        let mut items: Vec<Alert> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }

        Ok(items)
    }

    async fn try_deactivate(&self, id: ObjectId) -> Result<bool> {
        // Conditional update keyed on `active: true`; matched_count says
        // whether this call performed the flip or lost the race.
        let res = self
            .alerts()
            .update_one(
                doc! { "_id": id, "active": true },
                doc! { "$set": { "active": false } },
                None,
            )
            .await?;

        Ok(res.matched_count > 0)
    }

    async fn deactivate_if_owned(&self, id: ObjectId, token: &str) -> Result<bool> {
        let res = self
            .alerts()
            .update_one(
                doc! { "_id": id, "token": token, "active": true },
                doc! { "$set": { "active": false } },
                None,
            )
            .await?;

        Ok(res.matched_count > 0)
    }
}
