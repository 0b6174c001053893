//! Eligibility check handler

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::eligibility::{EligibilityDecision, EligibilityService};
use crate::error::ApiError;
use crate::loan::LoanProduct;
use crate::middleware::Session;
use crate::models::ApiResponse;

/// GET /api/eligibility/:product - Check the caller's standing for a product
///
/// Always answers with a decision; lookup problems surface as an ineligible
/// decision with guidance, not as an error.
pub async fn check_eligibility(
    State(eligibility_service): State<Arc<EligibilityService>>,
    session: Session,
    Path(product): Path<LoanProduct>,
) -> Result<Json<ApiResponse<EligibilityDecision>>, ApiError> {
    let decision = eligibility_service
        .evaluate(session.member_id, product)
        .await;

    Ok(Json(ApiResponse::ok(decision)))
}
