//! Installment schedule models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Which kind of plan a schedule belongs to
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "plan_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Loan,
    Commodity,
}

/// Installment status. `Overdue` is a derived fact (due date passed while
/// still pending) recomputed on every read; the swept value is persisted so
/// admin list queries can filter on it.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "installment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

/// One scheduled payment within a repayment plan
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct InstallmentEntry {
    pub id: Uuid,
    pub plan_kind: PlanKind,
    pub plan_id: Uuid,
    pub seq: i32,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub paid_date: Option<NaiveDate>,
    pub paid_amount: Option<i64>,
    pub payment_reference: Option<String>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Request body for recording a payment against a schedule entry.
///
/// `payment_reference` carries the gateway's provider-assigned reference.
/// The paid amount is recorded as supplied; partial and over payments are
/// accepted as-is.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub paid_amount: i64,
    pub paid_date: Option<NaiveDate>,
    pub payment_reference: String,
}

impl RecordPaymentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.paid_amount <= 0 {
            return Err("Paid amount must be greater than 0".to_string());
        }
        if self.payment_reference.trim().is_empty() {
            return Err("Payment reference is required".to_string());
        }
        Ok(())
    }
}

/// Aggregate statistics over a schedule
#[derive(Debug, Serialize, PartialEq)]
pub struct ScheduleStatistics {
    pub total_amount: i64,
    pub paid_amount: i64,
    pub remaining_amount: i64,
    pub total_count: usize,
    pub paid_count: usize,
    pub pending_count: usize,
    pub overdue_count: usize,
    /// Count-based, not amount-based: `round(100 * paid / total)`.
    pub progress_percentage: i32,
}

/// A gateway payment persisted against the ledger
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan_kind: PlanKind,
    pub plan_id: Uuid,
    pub installment_seq: i32,
    pub amount: i64,
    pub payment_reference: String,
    pub recorded_by: Uuid,
    pub recorded_at: DateTime<Utc>,
}
