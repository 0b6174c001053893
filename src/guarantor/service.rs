//! Guarantor approval workflow
//!
//! Issues per-guarantor approval requests with bearer tokens, resolves the
//! tokenized links guarantors open, records their single terminal response
//! and aggregates the approval count the loan lifecycle checks quorum
//! against.

use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::guarantor::model::{
    ApprovalStatus, FanOutOutcome, GuarantorApproval, GuarantorDecision, APPROVAL_WINDOW_HOURS,
};
use crate::loan::model::Loan;
use crate::models::Member;
use crate::notify::{templates, EmailSender, Notifier};

/// Generate an unguessable bearer token: 128 bits of CSPRNG output, hex
/// encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Guarantor approval workflow service
pub struct GuarantorService {
    db_pool: PgPool,
    email: Arc<dyn EmailSender>,
    notifier: Notifier,
    portal_base_url: String,
}

impl GuarantorService {
    pub fn new(
        db_pool: PgPool,
        email: Arc<dyn EmailSender>,
        notifier: Notifier,
        portal_base_url: String,
    ) -> Self {
        Self {
            db_pool,
            email,
            notifier,
            portal_base_url,
        }
    }

    /// Fan approval requests out to the requested guarantors.
    ///
    /// One row per guarantor, each with a fresh token and a 72-hour expiry,
    /// written independently. The invitation email per guarantor is
    /// best-effort: a send failure is logged, the created record stands, and
    /// the remaining guarantors are still processed. Callers receive one
    /// outcome per guarantor and must tolerate partial fan-out.
    pub async fn request_approvals(
        &self,
        loan: &Loan,
        guarantors: &[Member],
    ) -> Vec<FanOutOutcome> {
        let mut outcomes = Vec::with_capacity(guarantors.len());

        for guarantor in guarantors {
            let token = generate_token();
            let now = Utc::now();
            let expires_at = now + Duration::hours(APPROVAL_WINDOW_HOURS);

            let inserted = sqlx::query(
                r#"
                INSERT INTO guarantor_approvals (
                    id, loan_id, guarantor_id, guarantor_name, guarantor_member_number,
                    guarantor_email, applicant_name, loan_amount, loan_purpose,
                    status, token, created_at, expires_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10, $11, $12)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(loan.id)
            .bind(guarantor.id)
            .bind(&guarantor.full_name)
            .bind(&guarantor.member_number)
            .bind(&guarantor.email)
            .bind(&loan.borrower_name)
            .bind(loan.amount)
            .bind(&loan.purpose)
            .bind(&token)
            .bind(now)
            .bind(expires_at)
            .execute(&self.db_pool)
            .await;

            if let Err(e) = inserted {
                tracing::error!(
                    loan = %loan.id,
                    guarantor = %guarantor.id,
                    error = %e,
                    "Failed to create guarantor approval record"
                );
                outcomes.push(FanOutOutcome::RecordFailed {
                    guarantor_id: guarantor.id,
                    error: e.to_string(),
                });
                continue;
            }

            let link = self.approval_link(&token);
            let message = templates::guarantor_invitation(
                &guarantor.email,
                &guarantor.full_name,
                &loan.borrower_name,
                loan.amount,
                &loan.purpose,
                &link,
            );

            match self.email.send(message).await {
                Ok(()) => outcomes.push(FanOutOutcome::Created {
                    guarantor_id: guarantor.id,
                }),
                Err(e) => {
                    // The record stands and the link is still valid; the
                    // guarantor can be reached through other channels.
                    tracing::warn!(
                        loan = %loan.id,
                        guarantor = %guarantor.id,
                        error = %e,
                        "Guarantor invitation email failed"
                    );
                    outcomes.push(FanOutOutcome::EmailFailed {
                        guarantor_id: guarantor.id,
                    });
                }
            }
        }

        outcomes
    }

    /// The URL a guarantor opens; the token is the only credential.
    pub fn approval_link(&self, token: &str) -> String {
        format!("{}/guarantor/{}", self.portal_base_url, token)
    }

    /// Resolve an approval link for an unauthenticated guarantor.
    ///
    /// The three failure cases stay distinct: an unknown token is an invalid
    /// link, a responded request reports which way it went, and an expired
    /// request is reported expired even though its stored status still reads
    /// `pending`.
    pub async fn resolve_by_token(&self, token: &str) -> Result<GuarantorApproval, ApiError> {
        let approval = sqlx::query_as::<_, GuarantorApproval>(
            "SELECT * FROM guarantor_approvals WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("This approval link is not valid.".to_string()))?;

        match approval.status {
            ApprovalStatus::Approved => {
                return Err(ApiError::AlreadyResponded(
                    "You have already approved this request.".to_string(),
                ));
            }
            ApprovalStatus::Rejected => {
                return Err(ApiError::AlreadyResponded(
                    "You have already declined this request.".to_string(),
                ));
            }
            ApprovalStatus::Pending => {}
        }

        if approval.is_expired(Utc::now()) {
            return Err(ApiError::LinkExpired(
                "This approval link has expired.".to_string(),
            ));
        }

        Ok(approval)
    }

    /// Record the guarantor's terminal response.
    ///
    /// Writes the status exactly once; rejection requires a non-empty reason.
    /// The quorum recheck on approval is the loan lifecycle's job and is
    /// triggered by the caller.
    pub async fn record_response(
        &self,
        token: &str,
        decision: GuarantorDecision,
        reason: Option<String>,
    ) -> Result<GuarantorApproval, ApiError> {
        let approval = self.resolve_by_token(token).await?;

        let (status, reason) = match decision {
            GuarantorDecision::Approved => (ApprovalStatus::Approved, None),
            GuarantorDecision::Rejected => {
                let reason = reason.map(|r| r.trim().to_string()).unwrap_or_default();
                if reason.is_empty() {
                    return Err(ApiError::ValidationError(
                        "A reason is required when declining a guarantor request.".to_string(),
                    ));
                }
                (ApprovalStatus::Rejected, Some(reason))
            }
        };

        let updated = sqlx::query_as::<_, GuarantorApproval>(
            r#"
            UPDATE guarantor_approvals
            SET status = $1, rejection_reason = $2, responded_at = $3
            WHERE id = $4 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(&reason)
        .bind(Utc::now())
        .bind(approval.id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| {
            ApiError::AlreadyResponded("This request has already been responded to.".to_string())
        })?;

        // Best-effort heads-up to the applicant; the response itself stands
        // regardless.
        let title = match status {
            ApprovalStatus::Approved => "A guarantor approved your loan request",
            _ => "A guarantor declined your loan request",
        };
        if let Ok(Some((borrower_id,))) =
            sqlx::query_as::<_, (Uuid,)>("SELECT borrower_id FROM loans WHERE id = $1")
                .bind(updated.loan_id)
                .fetch_optional(&self.db_pool)
                .await
        {
            if let Err(e) = self
                .notifier
                .notify(
                    borrower_id,
                    title,
                    &format!("{} has responded to your guarantor request.", updated.guarantor_name),
                )
                .await
            {
                tracing::warn!(loan = %updated.loan_id, error = %e, "Failed to notify applicant");
            }
        }

        Ok(updated)
    }

    /// Count of approvals currently recorded for a loan.
    pub async fn approved_count(&self, loan_id: Uuid) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM guarantor_approvals WHERE loan_id = $1 AND status = 'approved'",
        )
        .bind(loan_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(count)
    }

    /// Quorum check: approved count against the loan's `guarantors_required`
    /// snapshot taken at submission. Rejections are not counted against the
    /// loan; they simply never add to the approved count.
    pub async fn quorum_satisfied(&self, loan_id: Uuid) -> Result<bool, ApiError> {
        let (required,): (i32,) =
            sqlx::query_as("SELECT guarantors_required FROM loans WHERE id = $1")
                .bind(loan_id)
                .fetch_one(&self.db_pool)
                .await?;

        let approved = self.approved_count(loan_id).await?;

        Ok(approved >= required as i64)
    }

    /// All approval rows for a loan, for admin review screens.
    pub async fn list_for_loan(&self, loan_id: Uuid) -> Result<Vec<GuarantorApproval>, ApiError> {
        let mut approvals = sqlx::query_as::<_, GuarantorApproval>(
            "SELECT * FROM guarantor_approvals WHERE loan_id = $1",
        )
        .bind(loan_id)
        .fetch_all(&self.db_pool)
        .await?;

        // Equality fetch, ordered client-side
        approvals.sort_by_key(|a| a.created_at);

        Ok(approvals)
    }
}
