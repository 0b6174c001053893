//! Loan repayment schedule handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::loan::{Loan, LoanService};
use crate::middleware::{AdminSession, Session};
use crate::models::{ApiResponse, MemberRole};
use crate::schedule::{
    InstallmentEntry, PlanKind, RecordPaymentRequest, ScheduleService, ScheduleStatistics,
};

async fn visible_loan(
    loan_service: &LoanService,
    session: &Session,
    loan_id: Uuid,
) -> Result<Loan, ApiError> {
    let loan = loan_service.get(loan_id).await?;
    if session.role != MemberRole::Admin {
        if loan.borrower_id != session.member_id || !loan.status.member_visible() {
            return Err(ApiError::NotFound("Loan not found".to_string()));
        }
    }
    Ok(loan)
}

/// GET /api/loans/:id/schedule - Repayment calendar with overdue sweep
pub async fn get_loan_schedule(
    State(loan_service): State<Arc<LoanService>>,
    State(schedule_service): State<Arc<ScheduleService>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<InstallmentEntry>>>, ApiError> {
    visible_loan(&loan_service, &session, id).await?;

    let entries = schedule_service.fetch(PlanKind::Loan, id).await?;

    Ok(Json(ApiResponse::ok(entries)))
}

/// GET /api/loans/:id/schedule/stats - Aggregate repayment statistics
pub async fn loan_schedule_stats(
    State(loan_service): State<Arc<LoanService>>,
    State(schedule_service): State<Arc<ScheduleService>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ScheduleStatistics>>, ApiError> {
    visible_loan(&loan_service, &session, id).await?;

    let stats = schedule_service.statistics(PlanKind::Loan, id).await?;

    Ok(Json(ApiResponse::ok(stats)))
}

/// POST /api/loans/:id/schedule/:seq/payment - Record a gateway payment
/// against one installment (admin deduction processing)
pub async fn record_loan_payment(
    State(schedule_service): State<Arc<ScheduleService>>,
    AdminSession(session): AdminSession,
    Path((id, seq)): Path<(Uuid, i32)>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<ApiResponse<InstallmentEntry>>, ApiError> {
    let entry = schedule_service
        .record_payment(PlanKind::Loan, id, seq, request, session.member_id)
        .await?;

    Ok(Json(ApiResponse::ok(entry)))
}

/// GET /api/loans/:id/schedule/export - Download the schedule as CSV
pub async fn export_loan_schedule(
    State(loan_service): State<Arc<LoanService>>,
    State(schedule_service): State<Arc<ScheduleService>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    visible_loan(&loan_service, &session, id).await?;

    let csv = schedule_service.export_csv(PlanKind::Loan, id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"loan-{}-schedule.csv\"", id),
            ),
        ],
        csv,
    ))
}
