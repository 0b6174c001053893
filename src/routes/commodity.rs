//! Commodity order route definitions

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::*;
use crate::state::AppState;

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders", get(list_orders))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id/approve", post(approve_order))
        .route("/api/orders/:id/reject", post(reject_order))
        .route("/api/orders/:id/schedule", get(get_order_schedule))
        .route("/api/orders/:id/schedule/stats", get(order_schedule_stats))
        .route(
            "/api/orders/:id/schedule/export",
            get(export_order_schedule),
        )
        .route(
            "/api/orders/:id/schedule/:seq/payment",
            post(record_order_deduction),
        )
}
