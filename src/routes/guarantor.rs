//! Guarantor approval link routes
//!
//! Unauthenticated: the token in the path is the credential.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::*;
use crate::state::AppState;

pub fn guarantor_routes() -> Router<AppState> {
    Router::new()
        .route("/api/guarantor/:token", get(view_approval))
        .route("/api/guarantor/:token/respond", post(respond_approval))
}
