use axum::{Router, routing::get};

use crate::{AppState, controllers::home_controller};

pub mod alerts_routes;
pub mod webhook_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = alerts_routes::add_routes(router);
    let router = webhook_routes::add_routes(router);

    router
        .route("/health", get(home_controller::health))
        .fallback(home_controller::not_found)
        .with_state(state)
}
