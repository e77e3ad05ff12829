
use std::sync::Arc;

use priceping::models::Direction;
use priceping::services::engine::AlertEngine;

use mock_store::{FailingSink, MockStore, RecordingSink, mk_alert};

fn mk_engine(store: &MockStore, sink: &RecordingSink) -> AlertEngine {
    AlertEngine::new(Arc::new(store.clone()), Arc::new(sink.clone()))
}

#[tokio::test]
async fn above_alert_fires_once_at_inclusive_boundary() {
    let store = MockStore::new();
    let sink = RecordingSink::default();
    let alert = mk_alert("tok-1", "ETHUSD", Direction::Above, 3000.0, "binance");
    let id = alert.id;
    store.insert_direct(alert).await;

    let engine = mk_engine(&store, &sink);

    // Short of the threshold: nothing happens.
    assert_eq!(engine.evaluate("ETHUSD", 2999.0, "binance").await.unwrap(), 0);
    assert!(store.get(id).await.unwrap().active);
    assert!(sink.sent.lock().await.is_empty());

    // Exactly at the threshold counts as a crossing.
    assert_eq!(engine.evaluate("ETHUSD", 3000.0, "binance").await.unwrap(), 1);
    assert!(!store.get(id).await.unwrap().active);
    assert_eq!(sink.sent.lock().await.len(), 1);

    // Already fired: excluded from every later candidate set.
    assert_eq!(engine.evaluate("ETHUSD", 3500.0, "binance").await.unwrap(), 0);
    assert_eq!(sink.sent.lock().await.len(), 1);
}

#[tokio::test]
async fn below_alert_fires_at_inclusive_boundary() {
    let store = MockStore::new();
    let sink = RecordingSink::default();
    let alert = mk_alert("tok-1", "BTCUSDT", Direction::Below, 40000.0, "binance");
    let id = alert.id;
    store.insert_direct(alert).await;

    let engine = mk_engine(&store, &sink);

    assert_eq!(
        engine.evaluate("BTCUSDT", 40001.0, "binance").await.unwrap(),
        0
    );
    assert!(store.get(id).await.unwrap().active);

    assert_eq!(
        engine.evaluate("BTCUSDT", 40000.0, "binance").await.unwrap(),
        1
    );
    assert!(!store.get(id).await.unwrap().active);
}

#[tokio::test]
async fn candidate_set_is_scoped_to_symbol_and_source() {
    let store = MockStore::new();
    let sink = RecordingSink::default();
    let polled = mk_alert("tok-1", "ETHUSD", Direction::Above, 3000.0, "binance");
    let other_symbol = mk_alert("tok-1", "BTCUSDT", Direction::Above, 3000.0, "binance");
    let polled_id = polled.id;
    let other_id = other_symbol.id;
    store.insert_direct(polled).await;
    store.insert_direct(other_symbol).await;

    let engine = mk_engine(&store, &sink);

    // Same symbol, wrong source: not a candidate.
    assert_eq!(
        engine
            .evaluate("ETHUSD", 5000.0, "tradingview")
            .await
            .unwrap(),
        0
    );
    assert!(store.get(polled_id).await.unwrap().active);

    // Right source fires only the matching symbol.
    assert_eq!(engine.evaluate("ETHUSD", 5000.0, "binance").await.unwrap(), 1);
    assert!(store.get(other_id).await.unwrap().active);
}

#[tokio::test]
async fn concurrent_evaluations_fire_at_most_once() {
    let store = MockStore::new();
    let sink = RecordingSink::default();
    let alert = mk_alert("tok-1", "BTCUSDT", Direction::Above, 50000.0, "binance");
    let id = alert.id;
    store.insert_direct(alert).await;

    let engine = mk_engine(&store, &sink);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.evaluate("BTCUSDT", 51000.0, "binance").await.unwrap()
        }));
    }

    let mut total = 0;
    for h in handles {
        total += h.await.unwrap();
    }

    // Exactly one evaluator wins the compare-and-set, and only the winner
    // attempts delivery.
    assert_eq!(total, 1);
    assert_eq!(sink.sent.lock().await.len(), 1);
    assert!(!store.get(id).await.unwrap().active);
}

#[tokio::test]
async fn delivery_failure_does_not_unfire_the_alert() {
    let store = MockStore::new();
    let sink = FailingSink::default();
    let alert = mk_alert("tok-1", "ETHUSD", Direction::Above, 3000.0, "binance");
    let id = alert.id;
    store.insert_direct(alert).await;

    let engine = AlertEngine::new(Arc::new(store.clone()), Arc::new(sink.clone()));

    // The push is attempted and fails; the match still counts and sticks.
    assert_eq!(engine.evaluate("ETHUSD", 3100.0, "binance").await.unwrap(), 1);
    assert_eq!(*sink.attempts.lock().await, 1);
    assert!(!store.get(id).await.unwrap().active);

    assert_eq!(engine.evaluate("ETHUSD", 3200.0, "binance").await.unwrap(), 0);
    assert_eq!(*sink.attempts.lock().await, 1);
}

#[tokio::test]
async fn every_matching_alert_fires_independently() {
    let store = MockStore::new();
    let sink = RecordingSink::default();
    store
        .insert_direct(mk_alert("tok-1", "ETHUSD", Direction::Above, 3000.0, "binance"))
        .await;
    store
        .insert_direct(mk_alert("tok-2", "ETHUSD", Direction::Above, 3050.0, "binance"))
        .await;
    store
        .insert_direct(mk_alert("tok-3", "ETHUSD", Direction::Below, 2000.0, "binance"))
        .await;

    let engine = mk_engine(&store, &sink);

    // Both Above alerts are reached; the Below alert is not.
    assert_eq!(engine.evaluate("ETHUSD", 3100.0, "binance").await.unwrap(), 2);

    let sent = sink.sent.lock().await;
    assert_eq!(sent.len(), 2);
    let tokens: Vec<&str> = sent.iter().map(|(t, _, _)| t.as_str()).collect();
    assert!(tokens.contains(&"tok-1"));
    assert!(tokens.contains(&"tok-2"));
}

#[tokio::test]
async fn push_message_names_symbol_and_prices() {
    let store = MockStore::new();
    let sink = RecordingSink::default();
    store
        .insert_direct(mk_alert("tok-1", "ETHUSD", Direction::Above, 3000.0, "binance"))
        .await;

    let engine = mk_engine(&store, &sink);
    engine.evaluate("ETHUSD", 3050.0, "binance").await.unwrap();

    let sent = sink.sent.lock().await;
    let (token, title, body) = &sent[0];
    assert_eq!(token, "tok-1");
    assert_eq!(title, "ETHUSD Alert!");
    assert_eq!(body, "Price 3050 crossed 3000");
}
