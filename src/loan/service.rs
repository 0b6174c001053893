//! Loan lifecycle service
//!
//! Owns the loan document's status transitions and the side effects each
//! transition triggers. Submission gates through the eligibility evaluator
//! and fans guarantor requests out through the guarantor workflow; admin
//! decisions and activation drive the installment schedule engine.
//!
//! Every notification and email along the way is best-effort: a committed
//! status transition is reported successful even when a side effect fails.

use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::eligibility::EligibilityService;
use crate::error::ApiError;
use crate::guarantor::{FanOutOutcome, GuarantorService};
use crate::loan::model::{
    transition_allowed, ListLoansQuery, Loan, LoanStatus, SubmitLoanRequest,
};
use crate::models::Member;
use crate::money;
use crate::notify::{templates, EmailSender, Notifier};
use crate::schedule::{PlanKind, ScheduleService};

/// Loan lifecycle service
pub struct LoanService {
    db_pool: PgPool,
    eligibility: EligibilityService,
    guarantors: Arc<GuarantorService>,
    schedule: Arc<ScheduleService>,
    email: Arc<dyn EmailSender>,
    notifier: Notifier,
}

impl LoanService {
    pub fn new(
        db_pool: PgPool,
        eligibility: EligibilityService,
        guarantors: Arc<GuarantorService>,
        schedule: Arc<ScheduleService>,
        email: Arc<dyn EmailSender>,
        notifier: Notifier,
    ) -> Self {
        Self {
            db_pool,
            eligibility,
            guarantors,
            schedule,
            email,
            notifier,
        }
    }

    /// Submit a loan application.
    ///
    /// Validation and the eligibility gate run before any write, so a
    /// failure here creates no partial state. On success the loan lands in
    /// `awaiting_guarantors` with one approval request fanned out per chosen
    /// guarantor.
    pub async fn submit(
        &self,
        borrower_id: Uuid,
        request: SubmitLoanRequest,
    ) -> Result<(Loan, Vec<FanOutOutcome>), ApiError> {
        request.validate().map_err(ApiError::ValidationError)?;

        let borrower = self.fetch_member(borrower_id).await?;

        let decision = self.eligibility.evaluate(borrower_id, request.product).await;
        if !decision.eligible {
            return Err(ApiError::ValidationError(decision.message));
        }
        if request.amount > decision.max_amount {
            return Err(ApiError::ValidationError(format!(
                "Requested amount exceeds your limit of {}",
                money::format_naira(decision.max_amount)
            )));
        }

        let mut guarantor_ids = request.guarantor_ids.clone();
        guarantor_ids.sort();
        guarantor_ids.dedup();
        if guarantor_ids.len() != request.guarantor_ids.len() {
            return Err(ApiError::ValidationError(
                "Each guarantor can only be chosen once".to_string(),
            ));
        }
        if guarantor_ids.contains(&borrower_id) {
            return Err(ApiError::ValidationError(
                "You cannot guarantee your own loan".to_string(),
            ));
        }

        let guarantors = self.fetch_members(&request.guarantor_ids).await?;
        if guarantors.len() != request.guarantor_ids.len() {
            return Err(ApiError::ValidationError(
                "One or more chosen guarantors could not be found".to_string(),
            ));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (
                id, borrower_id, borrower_name, product, amount, duration_months,
                interest_rate, purpose, monthly_salary, documents,
                guarantors_required, guarantors_approved, status, total_repaid, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, $12, 0, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(borrower.id)
        .bind(&borrower.full_name)
        .bind(request.product)
        .bind(request.amount)
        .bind(request.duration_months)
        .bind(request.product.annual_rate_percent())
        .bind(request.purpose.trim())
        .bind(request.monthly_salary)
        .bind(&request.documents)
        .bind(guarantors.len() as i32)
        .bind(LoanStatus::AwaitingGuarantors)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        let outcomes = self.guarantors.request_approvals(&loan, &guarantors).await;

        self.notify_admins(
            "New loan application",
            &format!(
                "{} applied for {} ({})",
                loan.borrower_name,
                money::format_naira(loan.amount),
                loan.product.label()
            ),
        )
        .await;

        Ok((loan, outcomes))
    }

    /// Recompute the approved-guarantor count and advance the loan once
    /// quorum is met.
    ///
    /// Read-then-write without optimistic concurrency, as in the portal this
    /// backend serves: two guarantors approving at once can briefly write a
    /// stale count, but every recheck recounts from the approvals table, so
    /// the stored count converges.
    pub async fn recheck_quorum(&self, loan_id: Uuid) -> Result<Loan, ApiError> {
        let loan = self.get(loan_id).await?;

        let approved = self.guarantors.approved_count(loan_id).await?;

        let mut updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET guarantors_approved = $1 WHERE id = $2 RETURNING *",
        )
        .bind(approved as i32)
        .bind(loan_id)
        .fetch_one(&self.db_pool)
        .await?;

        if loan.status == LoanStatus::AwaitingGuarantors
            && self.guarantors.quorum_satisfied(loan_id).await?
        {
            updated = sqlx::query_as::<_, Loan>(
                "UPDATE loans SET status = $1 WHERE id = $2 RETURNING *",
            )
            .bind(LoanStatus::PendingAdminReview)
            .bind(loan_id)
            .fetch_one(&self.db_pool)
            .await?;

            self.notify_admins(
                "Loan ready for review",
                &format!(
                    "{}'s loan of {} has all guarantor approvals and awaits a decision.",
                    updated.borrower_name,
                    money::format_naira(updated.amount)
                ),
            )
            .await;
        }

        Ok(updated)
    }

    /// Admin approval of a reviewed loan.
    pub async fn approve(
        &self,
        loan_id: Uuid,
        admin_id: Uuid,
        note: Option<String>,
    ) -> Result<Loan, ApiError> {
        let loan = self.get(loan_id).await?;
        self.ensure_transition(&loan, LoanStatus::Approved)?;

        let updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $1, approved_at = $2, approval_note = $3 WHERE id = $4 RETURNING *",
        )
        .bind(LoanStatus::Approved)
        .bind(Utc::now())
        .bind(&note)
        .bind(loan_id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(loan = %loan_id, admin = %admin_id, "Loan approved");

        self.send_decision(&updated, true, note.as_deref()).await;

        Ok(updated)
    }

    /// Admin rejection of a reviewed loan. Terminal.
    pub async fn reject(
        &self,
        loan_id: Uuid,
        admin_id: Uuid,
        reason: String,
    ) -> Result<Loan, ApiError> {
        if reason.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "A rejection reason is required".to_string(),
            ));
        }

        let loan = self.get(loan_id).await?;
        self.ensure_transition(&loan, LoanStatus::Rejected)?;

        let updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $1, rejected_at = $2, rejection_reason = $3 WHERE id = $4 RETURNING *",
        )
        .bind(LoanStatus::Rejected)
        .bind(Utc::now())
        .bind(reason.trim())
        .bind(loan_id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(loan = %loan_id, admin = %admin_id, "Loan rejected");

        self.send_decision(&updated, false, Some(reason.trim())).await;

        Ok(updated)
    }

    /// Admin activation: the loan goes live and the repayment calendar is
    /// materialized from principal, rate and duration.
    pub async fn activate(
        &self,
        loan_id: Uuid,
        admin_id: Uuid,
        note: Option<String>,
    ) -> Result<Loan, ApiError> {
        let loan = self.get(loan_id).await?;
        self.ensure_transition(&loan, LoanStatus::Active)?;

        let updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $1, activated_at = $2, activation_note = $3 WHERE id = $4 RETURNING *",
        )
        .bind(LoanStatus::Active)
        .bind(Utc::now())
        .bind(&note)
        .bind(loan_id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(loan = %loan_id, admin = %admin_id, "Loan activated");

        // Status update and schedule materialization are sequential writes,
        // not a transaction; a failure here is surfaced to the admin while
        // the activation stands.
        let months = updated.duration_months as u32;
        let total = money::total_payable(updated.amount, updated.interest_rate, months);
        let first_due = money::first_deduction_date(Utc::now().date_naive());
        self.schedule
            .materialize(PlanKind::Loan, updated.id, total, months, first_due)
            .await?;

        let borrower = self.fetch_member(updated.borrower_id).await?;
        let message = templates::loan_activated(
            &borrower.email,
            &borrower.full_name,
            updated.amount,
            updated.duration_months,
            first_due,
        );
        if let Err(e) = self.email.send(message).await {
            tracing::warn!(loan = %loan_id, error = %e, "Activation email failed");
        }
        if let Err(e) = self
            .notifier
            .notify(
                updated.borrower_id,
                "Loan activated",
                &format!(
                    "Your loan of {} is active. First deduction on {}.",
                    money::format_naira(updated.amount),
                    money::format_date(first_due)
                ),
            )
            .await
        {
            tracing::warn!(loan = %loan_id, error = %e, "Activation notification failed");
        }

        Ok(updated)
    }

    /// Admin closure of an active loan. Terminal.
    pub async fn close(
        &self,
        loan_id: Uuid,
        admin_id: Uuid,
        reason: Option<String>,
    ) -> Result<Loan, ApiError> {
        let loan = self.get(loan_id).await?;
        self.ensure_transition(&loan, LoanStatus::Closed)?;

        let updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $1, closed_at = $2, closure_reason = $3 WHERE id = $4 RETURNING *",
        )
        .bind(LoanStatus::Closed)
        .bind(Utc::now())
        .bind(&reason)
        .bind(loan_id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(loan = %loan_id, admin = %admin_id, "Loan closed");

        if let Err(e) = self
            .notifier
            .notify(
                updated.borrower_id,
                "Loan closed",
                &format!(
                    "Your loan of {} has been closed.",
                    money::format_naira(updated.amount)
                ),
            )
            .await
        {
            tracing::warn!(loan = %loan_id, error = %e, "Closure notification failed");
        }

        Ok(updated)
    }

    /// Get a loan by id
    pub async fn get(&self, loan_id: Uuid) -> Result<Loan, ApiError> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(loan_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Loan not found".to_string()))
    }

    /// Admin list with filters and pagination
    pub async fn list(&self, query: ListLoansQuery) -> Result<Vec<Loan>, ApiError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM loans WHERE 1=1");

        if let Some(status) = query.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }
        if let Some(borrower_id) = query.borrower_id {
            query_builder.push(" AND borrower_id = ");
            query_builder.push_bind(borrower_id);
        }

        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset as i64);

        let loans = query_builder
            .build_query_as::<Loan>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(loans)
    }

    /// The borrower's own list.
    ///
    /// Only active, closed and rejected loans appear here; applications
    /// still gathering guarantors or under review are hidden from the
    /// borrower by policy. Do not widen this filter.
    pub async fn list_for_member(&self, member_id: Uuid) -> Result<Vec<Loan>, ApiError> {
        let mut loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE borrower_id = $1 AND status IN ('active', 'closed', 'rejected')",
        )
        .bind(member_id)
        .fetch_all(&self.db_pool)
        .await?;

        loans.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(loans)
    }

    fn ensure_transition(&self, loan: &Loan, to: LoanStatus) -> Result<(), ApiError> {
        if !transition_allowed(loan.status, to) {
            return Err(ApiError::Conflict(format!(
                "Cannot move a loan from {:?} to {:?}",
                loan.status, to
            )));
        }
        Ok(())
    }

    async fn send_decision(&self, loan: &Loan, approved: bool, note: Option<&str>) {
        let borrower = match self.fetch_member(loan.borrower_id).await {
            Ok(member) => member,
            Err(e) => {
                tracing::warn!(loan = %loan.id, error = %e, "Borrower lookup for decision email failed");
                return;
            }
        };

        let message = templates::loan_decision(
            &borrower.email,
            &borrower.full_name,
            approved,
            loan.amount,
            note,
        );
        if let Err(e) = self.email.send(message).await {
            tracing::warn!(loan = %loan.id, error = %e, "Decision email failed");
        }

        let title = if approved {
            "Loan application approved"
        } else {
            "Loan application rejected"
        };
        if let Err(e) = self.notifier.notify(loan.borrower_id, title, title).await {
            tracing::warn!(loan = %loan.id, error = %e, "Decision notification failed");
        }
    }

    async fn notify_admins(&self, title: &str, body: &str) {
        match self.notifier.admin_recipients().await {
            Ok(admins) => self.notifier.notify_all(&admins, title, body).await,
            Err(e) => tracing::warn!(error = %e, "Admin recipient lookup failed"),
        }
    }

    async fn fetch_member(&self, member_id: Uuid) -> Result<Member, ApiError> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(member_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))
    }

    async fn fetch_members(&self, ids: &[Uuid]) -> Result<Vec<Member>, ApiError> {
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(members)
    }
}
