//! Guarantor approval models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Hours a guarantor has to respond before the link goes stale.
pub const APPROVAL_WINDOW_HOURS: i64 = 72;

/// Guarantor approval status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// One approval request per (loan, guarantor) pair.
///
/// The token is a bearer credential: possession is the only thing needed to
/// act on the request, no login involved. Expiry is judged against
/// `expires_at` at read time; the stored status stays `pending` even after
/// the window passes.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct GuarantorApproval {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub guarantor_id: Uuid,
    pub guarantor_name: String,
    pub guarantor_member_number: String,
    pub guarantor_email: String,
    pub applicant_name: String,
    pub loan_amount: i64,
    pub loan_purpose: String,
    pub status: ApprovalStatus,
    pub token: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl GuarantorApproval {
    /// Whether the 72-hour response window has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// A request is actionable only while pending and unexpired.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.status == ApprovalStatus::Pending && !self.is_expired(now)
    }
}

/// Guarantor's decision on an approval request
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuarantorDecision {
    Approved,
    Rejected,
}

/// Request body for responding to an approval link
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub decision: GuarantorDecision,
    pub reason: Option<String>,
}

/// Per-guarantor outcome of the approval fan-out.
///
/// The fan-out is N independent writes followed by N best-effort emails, not
/// a transaction; callers get one outcome per requested guarantor and must
/// tolerate partial results.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FanOutOutcome {
    Created { guarantor_id: Uuid },
    EmailFailed { guarantor_id: Uuid },
    RecordFailed { guarantor_id: Uuid, error: String },
}

/// What an unauthenticated guarantor sees when opening the link
#[derive(Debug, Serialize)]
pub struct ApprovalView {
    pub applicant_name: String,
    pub loan_amount: i64,
    pub loan_amount_formatted: String,
    pub loan_purpose: String,
    pub guarantor_name: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&GuarantorApproval> for ApprovalView {
    fn from(approval: &GuarantorApproval) -> Self {
        Self {
            applicant_name: approval.applicant_name.clone(),
            loan_amount: approval.loan_amount,
            loan_amount_formatted: crate::money::format_naira(approval.loan_amount),
            loan_purpose: approval.loan_purpose.clone(),
            guarantor_name: approval.guarantor_name.clone(),
            expires_at: approval.expires_at,
        }
    }
}
