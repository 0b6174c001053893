//! Loan route definitions

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::*;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/loans", post(submit_loan))
        .route("/api/loans", get(list_loans))
        .route("/api/loans/mine", get(my_loans))
        .route("/api/loans/:id", get(get_loan))
        .route("/api/loans/:id/guarantors", get(loan_guarantors))
        .route("/api/loans/:id/approve", post(approve_loan))
        .route("/api/loans/:id/reject", post(reject_loan))
        .route("/api/loans/:id/activate", post(activate_loan))
        .route("/api/loans/:id/close", post(close_loan))
        .route("/api/loans/:id/schedule", get(get_loan_schedule))
        .route("/api/loans/:id/schedule/stats", get(loan_schedule_stats))
        .route("/api/loans/:id/schedule/export", get(export_loan_schedule))
        .route(
            "/api/loans/:id/schedule/:seq/payment",
            post(record_loan_payment),
        )
}
