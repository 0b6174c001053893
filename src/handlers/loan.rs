//! Loan lifecycle API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::guarantor::{GuarantorApproval, GuarantorService};
use crate::loan::{
    DecisionRequest, ListLoansQuery, Loan, LoanService, LoanWithTerms, ReasonRequest,
    SubmitLoanRequest, SubmitLoanResponse,
};
use crate::middleware::{AdminSession, Session};
use crate::models::{ApiResponse, MemberRole};

/// POST /api/loans - Submit a loan application
pub async fn submit_loan(
    State(loan_service): State<Arc<LoanService>>,
    session: Session,
    Json(request): Json<SubmitLoanRequest>,
) -> Result<Json<ApiResponse<SubmitLoanResponse>>, ApiError> {
    let (loan, guarantor_requests) = loan_service.submit(session.member_id, request).await?;

    Ok(Json(ApiResponse::ok(SubmitLoanResponse {
        loan,
        guarantor_requests,
    })))
}

/// GET /api/loans/mine - The borrower's own loans
///
/// Applications still gathering guarantors or under review are not in this
/// list; that filter is portal policy.
pub async fn my_loans(
    State(loan_service): State<Arc<LoanService>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<LoanWithTerms>>>, ApiError> {
    let loans = loan_service.list_for_member(session.member_id).await?;
    let loans = loans.into_iter().map(LoanWithTerms::from_loan).collect();

    Ok(Json(ApiResponse::ok(loans)))
}

/// GET /api/loans - Admin loan list with filters
pub async fn list_loans(
    State(loan_service): State<Arc<LoanService>>,
    _admin: AdminSession,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<ApiResponse<Vec<Loan>>>, ApiError> {
    let loans = loan_service.list(query).await?;

    Ok(Json(ApiResponse::ok(loans)))
}

/// GET /api/loans/:id - Get a single loan
pub async fn get_loan(
    State(loan_service): State<Arc<LoanService>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LoanWithTerms>>, ApiError> {
    let loan = loan_service.get(id).await?;

    if session.role != MemberRole::Admin {
        if loan.borrower_id != session.member_id || !loan.status.member_visible() {
            return Err(ApiError::NotFound("Loan not found".to_string()));
        }
    }

    Ok(Json(ApiResponse::ok(LoanWithTerms::from_loan(loan))))
}

/// GET /api/loans/:id/guarantors - Approval rows for a loan (admin)
pub async fn loan_guarantors(
    State(guarantor_service): State<Arc<GuarantorService>>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<GuarantorApproval>>>, ApiError> {
    let approvals = guarantor_service.list_for_loan(id).await?;

    Ok(Json(ApiResponse::ok(approvals)))
}

/// POST /api/loans/:id/approve - Admin approval
pub async fn approve_loan(
    State(loan_service): State<Arc<LoanService>>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = loan_service
        .approve(id, session.member_id, request.note)
        .await?;

    Ok(Json(ApiResponse::ok(loan)))
}

/// POST /api/loans/:id/reject - Admin rejection
pub async fn reject_loan(
    State(loan_service): State<Arc<LoanService>>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    Json(request): Json<ReasonRequest>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = loan_service
        .reject(id, session.member_id, request.reason)
        .await?;

    Ok(Json(ApiResponse::ok(loan)))
}

/// POST /api/loans/:id/activate - Admin activation; materializes the
/// repayment calendar
pub async fn activate_loan(
    State(loan_service): State<Arc<LoanService>>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = loan_service
        .activate(id, session.member_id, request.note)
        .await?;

    Ok(Json(ApiResponse::ok(loan)))
}

/// POST /api/loans/:id/close - Admin closure
pub async fn close_loan(
    State(loan_service): State<Arc<LoanService>>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = loan_service
        .close(id, session.member_id, request.note)
        .await?;

    Ok(Json(ApiResponse::ok(loan)))
}
