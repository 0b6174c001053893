//! Loan models and data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Loan products offered by the society.
///
/// Fixed-relief is a fixed-amount, fixed-duration emergency product; the
/// savings-multiple tiers lend a multiple of the member's savings balance.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_product", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoanProduct {
    FixedRelief,
    SavingsDouble,
    SavingsTriple,
}

impl LoanProduct {
    /// Fixed principal for fixed-amount products.
    pub fn fixed_amount(&self) -> Option<i64> {
        match self {
            LoanProduct::FixedRelief => Some(30_000),
            _ => None,
        }
    }

    /// Savings multiplier for savings-multiple tiers.
    pub fn savings_multiplier(&self) -> Option<i64> {
        match self {
            LoanProduct::FixedRelief => None,
            LoanProduct::SavingsDouble => Some(2),
            LoanProduct::SavingsTriple => Some(3),
        }
    }

    /// Annual interest rate in percent. Fixed-relief documents its rate as
    /// flat, the tiers as per-annum; both feed the same simple-interest
    /// formula.
    pub fn annual_rate_percent(&self) -> f64 {
        match self {
            LoanProduct::FixedRelief => 5.0,
            LoanProduct::SavingsDouble => 10.0,
            LoanProduct::SavingsTriple => 12.0,
        }
    }

    /// Fixed duration for fixed-duration products.
    pub fn fixed_duration_months(&self) -> Option<i32> {
        match self {
            LoanProduct::FixedRelief => Some(3),
            _ => None,
        }
    }

    /// Longest repayment period the product allows.
    pub fn max_duration_months(&self) -> i32 {
        match self {
            LoanProduct::FixedRelief => 3,
            LoanProduct::SavingsDouble => 12,
            LoanProduct::SavingsTriple => 24,
        }
    }

    /// Months of consistent savings required before the product opens up.
    pub fn min_tenure_months(&self) -> u32 {
        match self {
            LoanProduct::FixedRelief => 0,
            LoanProduct::SavingsDouble => 3,
            LoanProduct::SavingsTriple => 6,
        }
    }

    /// Member-facing product name.
    pub fn label(&self) -> &'static str {
        match self {
            LoanProduct::FixedRelief => "Fixed Relief Loan",
            LoanProduct::SavingsDouble => "2x Savings Loan",
            LoanProduct::SavingsTriple => "3x Savings Loan",
        }
    }
}

/// Loan lifecycle status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    AwaitingGuarantors,
    PendingAdminReview,
    Approved,
    Active,
    Closed,
    Rejected,
}

impl LoanStatus {
    /// Whether a loan in this status appears in the borrower's own list.
    ///
    /// Loans still gathering guarantors or awaiting admin review are hidden
    /// from the borrower's view on purpose; admins see every status.
    pub fn member_visible(&self) -> bool {
        matches!(
            self,
            LoanStatus::Active | LoanStatus::Closed | LoanStatus::Rejected
        )
    }

    /// Terminal statuses never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Closed | LoanStatus::Rejected)
    }
}

/// The loan status transition table. Anything not listed here is refused.
pub fn transition_allowed(from: LoanStatus, to: LoanStatus) -> bool {
    matches!(
        (from, to),
        (LoanStatus::AwaitingGuarantors, LoanStatus::PendingAdminReview)
            | (LoanStatus::PendingAdminReview, LoanStatus::Approved)
            | (LoanStatus::PendingAdminReview, LoanStatus::Rejected)
            | (LoanStatus::Approved, LoanStatus::Active)
            | (LoanStatus::Active, LoanStatus::Closed)
    )
}

/// Loan model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Loan {
    pub id: Uuid,
    pub borrower_id: Uuid,
    pub borrower_name: String,
    pub product: LoanProduct,
    pub amount: i64,
    pub duration_months: i32,
    pub interest_rate: f64,
    pub purpose: String,
    pub monthly_salary: i64,
    pub documents: Vec<String>,
    pub guarantors_required: i32,
    pub guarantors_approved: i32,
    pub status: LoanStatus,
    pub total_repaid: i64,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_note: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub activated_at: Option<DateTime<Utc>>,
    pub activation_note: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closure_reason: Option<String>,
}

/// Request DTO for submitting a loan application
#[derive(Debug, Deserialize)]
pub struct SubmitLoanRequest {
    pub product: LoanProduct,
    pub amount: i64,
    pub duration_months: i32,
    pub purpose: String,
    pub monthly_salary: i64,
    pub documents: Vec<String>,
    pub guarantor_ids: Vec<Uuid>,
    pub terms_agreed: bool,
}

impl SubmitLoanRequest {
    /// Form-level validation. Runs before any write; a failure here creates
    /// no partial state.
    pub fn validate(&self) -> Result<(), String> {
        if self.amount <= 0 {
            return Err("Loan amount must be greater than 0".to_string());
        }
        if let Some(fixed) = self.product.fixed_amount() {
            if self.amount != fixed {
                return Err(format!(
                    "{} amount is fixed at {}",
                    self.product.label(),
                    crate::money::format_naira(fixed)
                ));
            }
        }
        if self.duration_months <= 0 {
            return Err("Duration must be at least one month".to_string());
        }
        if let Some(fixed) = self.product.fixed_duration_months() {
            if self.duration_months != fixed {
                return Err(format!(
                    "{} runs for exactly {} months",
                    self.product.label(),
                    fixed
                ));
            }
        }
        if self.duration_months > self.product.max_duration_months() {
            return Err(format!(
                "{} allows at most {} months",
                self.product.label(),
                self.product.max_duration_months()
            ));
        }
        if self.purpose.trim().is_empty() {
            return Err("Loan purpose is required".to_string());
        }
        if self.monthly_salary <= 0 {
            return Err("Current monthly salary must be greater than 0".to_string());
        }
        if self.documents.len() < 2 {
            return Err("At least two supporting documents are required".to_string());
        }
        if self.guarantor_ids.is_empty() {
            return Err("At least one guarantor is required".to_string());
        }
        if !self.terms_agreed {
            return Err("You must agree to the loan terms".to_string());
        }
        Ok(())
    }
}

/// Query parameters for the admin loan list
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    pub status: Option<LoanStatus>,
    pub borrower_id: Option<Uuid>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// Admin approval / activation note
#[derive(Debug, Deserialize, Default)]
pub struct DecisionRequest {
    pub note: Option<String>,
}

/// Admin rejection / closure reason
#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    pub reason: String,
}

/// Response DTO for a submitted application: the created loan plus the
/// per-guarantor fan-out outcomes (partial fan-out is reported, not hidden).
#[derive(Debug, Serialize)]
pub struct SubmitLoanResponse {
    pub loan: Loan,
    pub guarantor_requests: Vec<crate::guarantor::FanOutOutcome>,
}

/// Loan response enriched with repayment math for member screens
#[derive(Debug, Serialize)]
pub struct LoanWithTerms {
    #[serde(flatten)]
    pub loan: Loan,
    pub total_interest: f64,
    pub total_payable: i64,
    pub monthly_payment: f64,
    pub first_deduction_date: Option<NaiveDate>,
}

impl LoanWithTerms {
    pub fn from_loan(loan: Loan) -> Self {
        let months = loan.duration_months.max(1) as u32;
        let total_interest = crate::money::flat_interest(loan.amount, loan.interest_rate, months);
        let total_payable = crate::money::total_payable(loan.amount, loan.interest_rate, months);
        let monthly_payment = crate::money::monthly_payment(loan.amount, loan.interest_rate, months);
        let first_deduction_date = loan
            .activated_at
            .map(|at| crate::money::first_deduction_date(at.date_naive()));
        Self {
            loan,
            total_interest,
            total_payable,
            monthly_payment,
            first_deduction_date,
        }
    }
}
