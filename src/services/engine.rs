use std::sync::Arc;

use anyhow::Result;

use crate::services::expo::PushSink;
use crate::services::store::AlertStore;

/// Single authority over alert state transitions. The background poller and
/// the webhook both hand their (symbol, price) observations to `evaluate`.
#[derive(Clone)]
pub struct AlertEngine {
    store: Arc<dyn AlertStore>,
    pusher: Arc<dyn PushSink>,
}

impl AlertEngine {
    pub fn new(store: Arc<dyn AlertStore>, pusher: Arc<dyn PushSink>) -> Self {
        Self { store, pusher }
    }

    /// Fires every active alert on `symbol`+`source` whose threshold the
    /// given price has reached, and returns how many this call fired.
    ///
    /// The per-record compare-and-set in `try_deactivate` decides races: when
    /// the poller and a webhook evaluate the same symbol at overlapping
    /// times, only the caller whose update flips `active` sends the push.
    /// Callers must pass the symbol already uppercased.
    pub async fn evaluate(&self, symbol: &str, price: f64, source: &str) -> Result<u64> {
        let candidates = self.store.find_candidates(symbol, source).await?;

        let mut fired = 0u64;
        for alert in candidates {
            if !alert.matches(price) {
                continue;
            }

            // Lost the race to a concurrent evaluation: already handled there.
            if !self.store.try_deactivate(alert.id).await? {
                continue;
            }
            fired += 1;

            let title = format!("{symbol} Alert!");
            let body = format!("Price {price} crossed {}", alert.price);
            if let Err(e) = self.pusher.send(&alert.token, &title, &body).await {
                // The alert stays fired even if the push is lost.
                tracing::warn!(symbol = %symbol, "push delivery failed: {e}");
            }
        }

        Ok(fired)
    }
}
