//! Guarantor approval link handlers
//!
//! These endpoints are unauthenticated by design: possession of the token
//! is the guarantor's only credential.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::guarantor::{ApprovalView, GuarantorDecision, GuarantorService, RespondRequest};
use crate::loan::{LoanService, LoanStatus};
use crate::models::ApiResponse;

/// Outcome of a guarantor response, including where it left the loan
#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub recorded: bool,
    pub decision: &'static str,
    pub loan_status: LoanStatus,
}

/// GET /api/guarantor/:token - Resolve an approval link
pub async fn view_approval(
    State(guarantor_service): State<Arc<GuarantorService>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<ApprovalView>>, ApiError> {
    let approval = guarantor_service.resolve_by_token(&token).await?;

    Ok(Json(ApiResponse::ok(ApprovalView::from(&approval))))
}

/// POST /api/guarantor/:token/respond - Record the guarantor's decision
///
/// An approval triggers the loan's quorum recheck; a rejection records the
/// reason and leaves the count untouched.
pub async fn respond_approval(
    State(guarantor_service): State<Arc<GuarantorService>>,
    State(loan_service): State<Arc<LoanService>>,
    Path(token): Path<String>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<ApiResponse<RespondResponse>>, ApiError> {
    let approval = guarantor_service
        .record_response(&token, request.decision, request.reason)
        .await?;

    let loan = match request.decision {
        GuarantorDecision::Approved => loan_service.recheck_quorum(approval.loan_id).await?,
        GuarantorDecision::Rejected => loan_service.get(approval.loan_id).await?,
    };

    let decision = match request.decision {
        GuarantorDecision::Approved => "approved",
        GuarantorDecision::Rejected => "rejected",
    };

    Ok(Json(ApiResponse::ok(RespondResponse {
        recorded: true,
        decision,
        loan_status: loan.status,
    })))
}
