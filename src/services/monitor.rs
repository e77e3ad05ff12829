use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use crate::services::binance::PriceSource;
use crate::services::engine::AlertEngine;
use crate::services::store::AlertStore;

/// Feed tag the background poller evaluates against.
pub const POLL_SOURCE: &str = "binance";

/// Spawns the perpetual polling cycle. It runs until `shutdown` is signalled;
/// a failed tick is logged and the next tick retries from scratch.
pub fn spawn_price_poller(
    store: Arc<dyn AlertStore>,
    prices: Arc<dyn PriceSource>,
    engine: AlertEngine,
    interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = run_tick(store.as_ref(), prices.as_ref(), &engine).await {
                        tracing::warn!("poll tick failed: {e:#}");
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("price poller stopping");
                    break;
                }
            }
        }
    })
}

/// One pass over every symbol that still has an active polled alert. A symbol
/// whose fetch or evaluation fails is skipped; the next tick is the retry.
pub async fn run_tick(
    store: &dyn AlertStore,
    prices: &dyn PriceSource,
    engine: &AlertEngine,
) -> anyhow::Result<()> {
    let symbols = store.distinct_symbols(POLL_SOURCE).await?;

    for symbol in symbols {
        let price = match prices.get_price(&symbol).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(symbol = %symbol, "price fetch failed: {e}");
                continue;
            }
        };

        if !price.is_finite() || price < 0.0 {
            tracing::warn!(symbol = %symbol, price, "ignoring bogus price");
            continue;
        }

        match engine.evaluate(&symbol, price, POLL_SOURCE).await {
            Ok(n) if n > 0 => tracing::info!(symbol = %symbol, fired = n, "alerts fired"),
            Ok(_) => {}
            Err(e) => tracing::warn!(symbol = %symbol, "evaluation failed: {e:#}"),
        }
    }

    Ok(())
}
