//! Commodity order API handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::commodity::{
    CommodityOrder, CommodityService, CreateOrderRequest, ListOrdersQuery,
};
use crate::error::ApiError;
use crate::loan::ReasonRequest;
use crate::middleware::{AdminSession, Session};
use crate::models::{ApiResponse, MemberRole};
use crate::schedule::{
    InstallmentEntry, PlanKind, RecordPaymentRequest, ScheduleService, ScheduleStatistics,
};

async fn visible_order(
    commodity_service: &CommodityService,
    session: &Session,
    order_id: Uuid,
) -> Result<CommodityOrder, ApiError> {
    let order = commodity_service.get(order_id).await?;
    if session.role != MemberRole::Admin && order.member_id != session.member_id {
        return Err(ApiError::NotFound("Order not found".to_string()));
    }
    Ok(order)
}

/// POST /api/orders - Place a commodity order
pub async fn create_order(
    State(commodity_service): State<Arc<CommodityService>>,
    session: Session,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<CommodityOrder>>, ApiError> {
    let order = commodity_service.submit(session.member_id, request).await?;

    Ok(Json(ApiResponse::ok(order)))
}

/// GET /api/orders - List orders
///
/// Members only ever see their own orders; admins may filter freely.
pub async fn list_orders(
    State(commodity_service): State<Arc<CommodityService>>,
    session: Session,
    Query(mut query): Query<ListOrdersQuery>,
) -> Result<Json<ApiResponse<Vec<CommodityOrder>>>, ApiError> {
    if session.role != MemberRole::Admin {
        query.member_id = Some(session.member_id);
    }

    let orders = commodity_service.list(query).await?;

    Ok(Json(ApiResponse::ok(orders)))
}

/// GET /api/orders/:id - Get a single order
pub async fn get_order(
    State(commodity_service): State<Arc<CommodityService>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CommodityOrder>>, ApiError> {
    let order = visible_order(&commodity_service, &session, id).await?;

    Ok(Json(ApiResponse::ok(order)))
}

/// POST /api/orders/:id/approve - Admin approval; materializes the
/// deduction calendar
pub async fn approve_order(
    State(commodity_service): State<Arc<CommodityService>>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CommodityOrder>>, ApiError> {
    let order = commodity_service.approve(id, session.member_id).await?;

    Ok(Json(ApiResponse::ok(order)))
}

/// POST /api/orders/:id/reject - Admin rejection
pub async fn reject_order(
    State(commodity_service): State<Arc<CommodityService>>,
    AdminSession(session): AdminSession,
    Path(id): Path<Uuid>,
    Json(request): Json<ReasonRequest>,
) -> Result<Json<ApiResponse<CommodityOrder>>, ApiError> {
    let order = commodity_service
        .reject(id, session.member_id, request.reason)
        .await?;

    Ok(Json(ApiResponse::ok(order)))
}

/// GET /api/orders/:id/schedule - Deduction calendar with overdue sweep
pub async fn get_order_schedule(
    State(commodity_service): State<Arc<CommodityService>>,
    State(schedule_service): State<Arc<ScheduleService>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<InstallmentEntry>>>, ApiError> {
    visible_order(&commodity_service, &session, id).await?;

    let entries = schedule_service.fetch(PlanKind::Commodity, id).await?;

    Ok(Json(ApiResponse::ok(entries)))
}

/// GET /api/orders/:id/schedule/stats - Aggregate deduction statistics
pub async fn order_schedule_stats(
    State(commodity_service): State<Arc<CommodityService>>,
    State(schedule_service): State<Arc<ScheduleService>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ScheduleStatistics>>, ApiError> {
    visible_order(&commodity_service, &session, id).await?;

    let stats = schedule_service
        .statistics(PlanKind::Commodity, id)
        .await?;

    Ok(Json(ApiResponse::ok(stats)))
}

/// POST /api/orders/:id/schedule/:seq/payment - Record a deduction (admin)
pub async fn record_order_deduction(
    State(commodity_service): State<Arc<CommodityService>>,
    AdminSession(session): AdminSession,
    Path((id, seq)): Path<(Uuid, i32)>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<ApiResponse<InstallmentEntry>>, ApiError> {
    let entry = commodity_service
        .record_deduction(id, seq, request, session.member_id)
        .await?;

    Ok(Json(ApiResponse::ok(entry)))
}

/// GET /api/orders/:id/schedule/export - Download the schedule as CSV
pub async fn export_order_schedule(
    State(commodity_service): State<Arc<CommodityService>>,
    State(schedule_service): State<Arc<ScheduleService>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    visible_order(&commodity_service, &session, id).await?;

    let csv = schedule_service.export_csv(PlanKind::Commodity, id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"order-{}-schedule.csv\"", id),
            ),
        ],
        csv,
    ))
}
