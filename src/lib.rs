//! Library entrypoint for priceping.
//!
//! The binary stays thin; everything lives here so integration tests under
//! `tests/` can import the app state, routers, controllers and services.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod controllers;
pub mod routes;

use services::engine::AlertEngine;
use services::store::AlertStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: Arc<dyn AlertStore>,
    pub engine: AlertEngine,
}
