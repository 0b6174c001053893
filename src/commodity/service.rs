//! Commodity order service
//!
//! Order submission and the admin decision flow. An approved order gets its
//! deduction calendar from the same installment schedule engine the loan
//! lifecycle uses; recording deductions walks that schedule and completes
//! the order when nothing is left to pay.

use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::commodity::model::{CommodityOrder, CreateOrderRequest, ListOrdersQuery, OrderStatus};
use crate::error::ApiError;
use crate::money;
use crate::notify::Notifier;
use crate::schedule::{InstallmentEntry, PlanKind, RecordPaymentRequest, ScheduleService};

/// Commodity order service
pub struct CommodityService {
    db_pool: PgPool,
    schedule: Arc<ScheduleService>,
    notifier: Notifier,
}

impl CommodityService {
    pub fn new(db_pool: PgPool, schedule: Arc<ScheduleService>, notifier: Notifier) -> Self {
        Self {
            db_pool,
            schedule,
            notifier,
        }
    }

    /// Place an order. Lands in `pending_approval`; no schedule exists yet.
    pub async fn submit(
        &self,
        member_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<CommodityOrder, ApiError> {
        request.validate().map_err(ApiError::ValidationError)?;

        let (member_name,): (String,) =
            sqlx::query_as("SELECT full_name FROM members WHERE id = $1")
                .bind(member_id)
                .fetch_optional(&self.db_pool)
                .await?
                .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

        let order = sqlx::query_as::<_, CommodityOrder>(
            r#"
            INSERT INTO commodity_orders (
                id, member_id, member_name, item_description, total_amount,
                duration_months, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(&member_name)
        .bind(request.item_description.trim())
        .bind(request.total_amount)
        .bind(request.duration_months)
        .bind(OrderStatus::PendingApproval)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        Ok(order)
    }

    /// Admin approval: the order goes live and its deduction calendar is
    /// materialized over the order total, first deduction on the last day of
    /// next month.
    pub async fn approve(&self, order_id: Uuid, admin_id: Uuid) -> Result<CommodityOrder, ApiError> {
        let order = self.get(order_id).await?;
        if order.status != OrderStatus::PendingApproval {
            return Err(ApiError::Conflict(format!(
                "Cannot approve an order in status {:?}",
                order.status
            )));
        }

        let updated = sqlx::query_as::<_, CommodityOrder>(
            "UPDATE commodity_orders SET status = $1, approved_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(OrderStatus::Approved)
        .bind(Utc::now())
        .bind(order_id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(order = %order_id, admin = %admin_id, "Commodity order approved");

        let first_due = money::first_deduction_date(Utc::now().date_naive());
        self.schedule
            .materialize(
                PlanKind::Commodity,
                updated.id,
                updated.total_amount,
                updated.duration_months as u32,
                first_due,
            )
            .await?;

        if let Err(e) = self
            .notifier
            .notify(
                updated.member_id,
                "Commodity order approved",
                &format!(
                    "Your order for {} ({}) was approved. First deduction on {}.",
                    updated.item_description,
                    money::format_naira(updated.total_amount),
                    money::format_date(first_due)
                ),
            )
            .await
        {
            tracing::warn!(order = %order_id, error = %e, "Order approval notification failed");
        }

        Ok(updated)
    }

    /// Admin rejection. Terminal; no schedule is created.
    pub async fn reject(
        &self,
        order_id: Uuid,
        admin_id: Uuid,
        reason: String,
    ) -> Result<CommodityOrder, ApiError> {
        if reason.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "A rejection reason is required".to_string(),
            ));
        }

        let order = self.get(order_id).await?;
        if order.status != OrderStatus::PendingApproval {
            return Err(ApiError::Conflict(format!(
                "Cannot reject an order in status {:?}",
                order.status
            )));
        }

        let updated = sqlx::query_as::<_, CommodityOrder>(
            "UPDATE commodity_orders SET status = $1, rejected_at = $2, rejection_reason = $3 WHERE id = $4 RETURNING *",
        )
        .bind(OrderStatus::Rejected)
        .bind(Utc::now())
        .bind(reason.trim())
        .bind(order_id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(order = %order_id, admin = %admin_id, "Commodity order rejected");

        if let Err(e) = self
            .notifier
            .notify(
                updated.member_id,
                "Commodity order rejected",
                &format!("Your order for {} was rejected.", updated.item_description),
            )
            .await
        {
            tracing::warn!(order = %order_id, error = %e, "Order rejection notification failed");
        }

        Ok(updated)
    }

    /// Record a deduction against an approved order's schedule and complete
    /// the order once nothing remains unpaid.
    pub async fn record_deduction(
        &self,
        order_id: Uuid,
        seq: i32,
        request: RecordPaymentRequest,
        processed_by: Uuid,
    ) -> Result<InstallmentEntry, ApiError> {
        let order = self.get(order_id).await?;
        if order.status != OrderStatus::Approved {
            return Err(ApiError::Conflict(format!(
                "Cannot record a deduction for an order in status {:?}",
                order.status
            )));
        }

        let entry = self
            .schedule
            .record_payment(PlanKind::Commodity, order_id, seq, request, processed_by)
            .await?;

        let stats = self
            .schedule
            .statistics(PlanKind::Commodity, order_id)
            .await?;
        if stats.paid_count == stats.total_count {
            sqlx::query("UPDATE commodity_orders SET status = $1 WHERE id = $2")
                .bind(OrderStatus::Completed)
                .bind(order_id)
                .execute(&self.db_pool)
                .await?;
        }

        Ok(entry)
    }

    /// Get an order by id
    pub async fn get(&self, order_id: Uuid) -> Result<CommodityOrder, ApiError> {
        sqlx::query_as::<_, CommodityOrder>("SELECT * FROM commodity_orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))
    }

    /// List orders with filtering and pagination
    pub async fn list(&self, query: ListOrdersQuery) -> Result<Vec<CommodityOrder>, ApiError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM commodity_orders WHERE 1=1");

        if let Some(status) = query.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }
        if let Some(member_id) = query.member_id {
            query_builder.push(" AND member_id = ");
            query_builder.push_bind(member_id);
        }

        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset as i64);

        let orders = query_builder
            .build_query_as::<CommodityOrder>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(orders)
    }
}
