//! Commodity installment order models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Commodity order status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingApproval,
    Approved,
    Rejected,
    Completed,
}

/// A commodity purchased on installments.
///
/// Orders share the installment schedule engine with loans; approval
/// materializes the order's deduction calendar over the order total.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct CommodityOrder {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub item_description: String,
    pub total_amount: i64,
    pub duration_months: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Request DTO for placing a commodity order
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub item_description: String,
    pub total_amount: i64,
    pub duration_months: i32,
}

impl CreateOrderRequest {
    /// Validate request
    pub fn validate(&self) -> Result<(), String> {
        if self.item_description.trim().is_empty() {
            return Err("Item description is required".to_string());
        }
        if self.total_amount <= 0 {
            return Err("Order total must be greater than 0".to_string());
        }
        if self.duration_months <= 0 || self.duration_months > 24 {
            return Err("Installment period must be between 1 and 24 months".to_string());
        }
        Ok(())
    }
}

/// Query parameters for listing orders
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub member_id: Option<Uuid>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}
