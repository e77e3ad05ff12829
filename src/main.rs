use std::net::SocketAddr;
use std::sync::Arc;

use mongodb::Client;
use tokio::sync::watch;

use priceping::services::binance::{BinanceClient, PriceSource};
use priceping::services::db_init;
use priceping::services::engine::AlertEngine;
use priceping::services::expo::{ExpoPushClient, PushSink};
use priceping::services::monitor;
use priceping::services::store::{AlertStore, MongoAlertStore};
use priceping::{AppState, config, routes};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!("could not create indexes: {e:#}");
    }

    let store: Arc<dyn AlertStore> = Arc::new(MongoAlertStore::new(db));
    let prices: Arc<dyn PriceSource> = Arc::new(BinanceClient::new());
    let pusher: Arc<dyn PushSink> = Arc::new(ExpoPushClient::new());

    let engine = AlertEngine::new(store.clone(), pusher);

    let (stop_tx, stop_rx) = watch::channel(false);
    let poller = monitor::spawn_price_poller(
        store.clone(),
        prices,
        engine.clone(),
        settings.poll_interval_secs,
        stop_rx,
    );

    let state = AppState {
        settings: settings.clone(),
        store,
        engine,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().unwrap(),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // Stop the poller only after the HTTP side has drained.
    let _ = stop_tx.send(true);
    let _ = poller.await;
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
}
