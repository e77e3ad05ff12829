use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{AppState, controllers::alerts_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/register_alert", post(alerts_controller::post_register_alert))
        .route("/alerts", get(alerts_controller::get_alerts))
        .route("/alert/:id", delete(alerts_controller::delete_alert))
}
