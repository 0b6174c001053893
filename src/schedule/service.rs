//! Schedule persistence service
//!
//! Wraps the pure engine with the database: materializing a plan's calendar,
//! sweeping overdue status on read, recording payments with their ledger
//! entries, statistics and CSV export. There is no background sweep; overdue
//! recomputation happens when a schedule is read.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::notify::{templates, EmailSender, Notifier};
use crate::schedule::engine;
use crate::schedule::model::{
    InstallmentEntry, PlanKind, RecordPaymentRequest, ScheduleStatistics,
};

/// Installment schedule service
pub struct ScheduleService {
    db_pool: PgPool,
    email: Arc<dyn EmailSender>,
    notifier: Notifier,
}

impl ScheduleService {
    pub fn new(db_pool: PgPool, email: Arc<dyn EmailSender>, notifier: Notifier) -> Self {
        Self {
            db_pool,
            email,
            notifier,
        }
    }

    /// Materialize the full calendar for a plan. Called once, when a loan is
    /// activated or a commodity order is approved.
    pub async fn materialize(
        &self,
        plan_kind: PlanKind,
        plan_id: Uuid,
        total: i64,
        months: u32,
        start_date: NaiveDate,
    ) -> Result<Vec<InstallmentEntry>, ApiError> {
        if months == 0 {
            return Err(ApiError::ValidationError(
                "A schedule needs at least one installment".to_string(),
            ));
        }

        let entries = engine::generate(plan_kind, plan_id, total, months, start_date);

        for entry in &entries {
            sqlx::query(
                r#"
                INSERT INTO installments (id, plan_kind, plan_id, seq, amount, due_date, status)
                VALUES ($1, $2, $3, $4, $5, $6, 'pending')
                "#,
            )
            .bind(entry.id)
            .bind(entry.plan_kind)
            .bind(entry.plan_id)
            .bind(entry.seq)
            .bind(entry.amount)
            .bind(entry.due_date)
            .execute(&self.db_pool)
            .await?;
        }

        Ok(entries)
    }

    /// Fetch a plan's schedule with the overdue sweep applied.
    ///
    /// The fetch is an equality query ordered client-side; the sweep is
    /// idempotent and only changed rows are written back.
    pub async fn fetch(
        &self,
        plan_kind: PlanKind,
        plan_id: Uuid,
    ) -> Result<Vec<InstallmentEntry>, ApiError> {
        let mut entries = sqlx::query_as::<_, InstallmentEntry>(
            "SELECT * FROM installments WHERE plan_kind = $1 AND plan_id = $2",
        )
        .bind(plan_kind)
        .bind(plan_id)
        .fetch_all(&self.db_pool)
        .await?;

        entries.sort_by_key(|e| e.seq);

        let changed = engine::recompute_overdue(&mut entries, Utc::now().date_naive());
        if !changed.is_empty() {
            sqlx::query("UPDATE installments SET status = 'overdue' WHERE id = ANY($1)")
                .bind(&changed)
                .execute(&self.db_pool)
                .await?;
        }

        Ok(entries)
    }

    /// Record a payment against one installment.
    ///
    /// Re-paying a paid entry is rejected without mutating it (the guard is
    /// in the UPDATE predicate as well, so a racing double-submit cannot pay
    /// the same entry twice). The gateway reference is persisted against a
    /// new ledger entry; the confirmation email and notification are
    /// best-effort.
    pub async fn record_payment(
        &self,
        plan_kind: PlanKind,
        plan_id: Uuid,
        seq: i32,
        request: RecordPaymentRequest,
        processed_by: Uuid,
    ) -> Result<InstallmentEntry, ApiError> {
        request.validate().map_err(ApiError::ValidationError)?;

        let mut entry = sqlx::query_as::<_, InstallmentEntry>(
            "SELECT * FROM installments WHERE plan_kind = $1 AND plan_id = $2 AND seq = $3",
        )
        .bind(plan_kind)
        .bind(plan_id)
        .bind(seq)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Installment {} not found", seq)))?;

        let paid_date = request.paid_date.unwrap_or_else(|| Utc::now().date_naive());
        let now = Utc::now();

        engine::apply_payment(
            &mut entry,
            request.paid_amount,
            paid_date,
            &request.payment_reference,
            processed_by,
            now,
        )
        .map_err(ApiError::Conflict)?;

        let updated = sqlx::query_as::<_, InstallmentEntry>(
            r#"
            UPDATE installments
            SET status = 'paid', paid_date = $1, paid_amount = $2, payment_reference = $3,
                processed_by = $4, processed_at = $5
            WHERE id = $6 AND status <> 'paid'
            RETURNING *
            "#,
        )
        .bind(paid_date)
        .bind(request.paid_amount)
        .bind(&request.payment_reference)
        .bind(processed_by)
        .bind(now)
        .bind(entry.id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!("Installment {} has already been paid", seq))
        })?;

        let owner = self.plan_owner(plan_kind, plan_id).await?;

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id, member_id, plan_kind, plan_id, installment_seq, amount,
                payment_reference, recorded_by, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner.id)
        .bind(plan_kind)
        .bind(plan_id)
        .bind(seq)
        .bind(request.paid_amount)
        .bind(&request.payment_reference)
        .bind(processed_by)
        .bind(now)
        .execute(&self.db_pool)
        .await?;

        if plan_kind == PlanKind::Loan {
            // Read-then-write on the shared loan document, same as the quorum
            // counter; last write wins.
            sqlx::query("UPDATE loans SET total_repaid = total_repaid + $1 WHERE id = $2")
                .bind(request.paid_amount)
                .bind(plan_id)
                .execute(&self.db_pool)
                .await?;
        }

        let message = templates::payment_confirmation(
            &owner.email,
            &owner.name,
            seq,
            request.paid_amount,
            &request.payment_reference,
        );
        if let Err(e) = self.email.send(message).await {
            tracing::warn!(plan = %plan_id, seq, error = %e, "Payment confirmation email failed");
        }
        if let Err(e) = self
            .notifier
            .notify(
                owner.id,
                "Payment recorded",
                &format!(
                    "Your payment of {} for installment {} has been recorded.",
                    crate::money::format_naira(request.paid_amount),
                    seq
                ),
            )
            .await
        {
            tracing::warn!(plan = %plan_id, seq, error = %e, "Payment notification failed");
        }

        Ok(updated)
    }

    /// Aggregate statistics for a plan's schedule, post-sweep.
    pub async fn statistics(
        &self,
        plan_kind: PlanKind,
        plan_id: Uuid,
    ) -> Result<ScheduleStatistics, ApiError> {
        let entries = self.fetch(plan_kind, plan_id).await?;
        Ok(engine::statistics(&entries))
    }

    /// CSV export of a plan's schedule, post-sweep.
    pub async fn export_csv(
        &self,
        plan_kind: PlanKind,
        plan_id: Uuid,
    ) -> Result<String, ApiError> {
        let entries = self.fetch(plan_kind, plan_id).await?;
        Ok(engine::export_csv(&entries))
    }

    async fn plan_owner(&self, plan_kind: PlanKind, plan_id: Uuid) -> Result<PlanOwner, ApiError> {
        let query = match plan_kind {
            PlanKind::Loan => {
                r#"
                SELECT m.id, m.full_name, m.email
                FROM loans l JOIN members m ON m.id = l.borrower_id
                WHERE l.id = $1
                "#
            }
            PlanKind::Commodity => {
                r#"
                SELECT m.id, m.full_name, m.email
                FROM commodity_orders o JOIN members m ON m.id = o.member_id
                WHERE o.id = $1
                "#
            }
        };

        let (id, name, email): (Uuid, String, String) = sqlx::query_as(query)
            .bind(plan_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))?;

        Ok(PlanOwner { id, name, email })
    }
}

struct PlanOwner {
    id: Uuid,
    name: String,
    email: String,
}
