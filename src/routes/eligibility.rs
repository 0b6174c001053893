//! Eligibility route definitions

use axum::routing::get;
use axum::Router;

use crate::handlers::*;
use crate::state::AppState;

pub fn eligibility_routes() -> Router<AppState> {
    Router::new().route("/api/eligibility/:product", get(check_eligibility))
}
