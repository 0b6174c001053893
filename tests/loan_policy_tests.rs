//! Loan policy tests
//!
//! Pure coverage of the lifecycle rules: the transition table, the
//! member-visibility filter, submission validation, product constants, the
//! savings tenure gate and approval-link expiry semantics.

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use coopcred_server::eligibility::has_consistent_savings;
use coopcred_server::guarantor::{ApprovalStatus, GuarantorApproval};
use coopcred_server::loan::{transition_allowed, LoanProduct, LoanStatus, SubmitLoanRequest};

// ============================================================================
// Status Transition Tests
// ============================================================================

#[test]
fn test_happy_path_transitions() {
    assert!(transition_allowed(
        LoanStatus::AwaitingGuarantors,
        LoanStatus::PendingAdminReview
    ));
    assert!(transition_allowed(
        LoanStatus::PendingAdminReview,
        LoanStatus::Approved
    ));
    assert!(transition_allowed(LoanStatus::Approved, LoanStatus::Active));
    assert!(transition_allowed(LoanStatus::Active, LoanStatus::Closed));
}

#[test]
fn test_rejection_only_from_admin_review() {
    assert!(transition_allowed(
        LoanStatus::PendingAdminReview,
        LoanStatus::Rejected
    ));
    // A loan short of guarantors stalls; it is never rejected from there
    assert!(!transition_allowed(
        LoanStatus::AwaitingGuarantors,
        LoanStatus::Rejected
    ));
    assert!(!transition_allowed(LoanStatus::Approved, LoanStatus::Rejected));
    assert!(!transition_allowed(LoanStatus::Active, LoanStatus::Rejected));
}

#[test]
fn test_no_skipping_or_reversing() {
    assert!(!transition_allowed(
        LoanStatus::AwaitingGuarantors,
        LoanStatus::Approved
    ));
    assert!(!transition_allowed(
        LoanStatus::AwaitingGuarantors,
        LoanStatus::Active
    ));
    assert!(!transition_allowed(
        LoanStatus::Approved,
        LoanStatus::PendingAdminReview
    ));
    assert!(!transition_allowed(LoanStatus::Closed, LoanStatus::Active));
    assert!(!transition_allowed(LoanStatus::Rejected, LoanStatus::Approved));
}

#[test]
fn test_member_visibility_filter() {
    // Members only ever see active, closed and rejected loans of their own
    assert!(LoanStatus::Active.member_visible());
    assert!(LoanStatus::Closed.member_visible());
    assert!(LoanStatus::Rejected.member_visible());
    assert!(!LoanStatus::AwaitingGuarantors.member_visible());
    assert!(!LoanStatus::PendingAdminReview.member_visible());
}

// ============================================================================
// Product Constant Tests
// ============================================================================

#[test]
fn test_fixed_relief_constants() {
    let product = LoanProduct::FixedRelief;
    assert_eq!(product.fixed_amount(), Some(30_000));
    assert_eq!(product.fixed_duration_months(), Some(3));
    assert!((product.annual_rate_percent() - 5.0).abs() < 1e-9);
    assert_eq!(product.min_tenure_months(), 0);
}

#[test]
fn test_savings_tier_constants() {
    assert_eq!(LoanProduct::SavingsDouble.savings_multiplier(), Some(2));
    assert_eq!(LoanProduct::SavingsDouble.min_tenure_months(), 3);
    assert_eq!(LoanProduct::SavingsTriple.savings_multiplier(), Some(3));
    assert_eq!(LoanProduct::SavingsTriple.min_tenure_months(), 6);
    assert!(LoanProduct::SavingsTriple.max_duration_months() > LoanProduct::SavingsDouble.max_duration_months());
}

// ============================================================================
// Submission Validation Tests
// ============================================================================

fn valid_request() -> SubmitLoanRequest {
    SubmitLoanRequest {
        product: LoanProduct::FixedRelief,
        amount: 30_000,
        duration_months: 3,
        purpose: "School fees".to_string(),
        monthly_salary: 120_000,
        documents: vec!["payslip.pdf".to_string(), "id-card.pdf".to_string()],
        guarantor_ids: vec![Uuid::new_v4()],
        terms_agreed: true,
    }
}

#[test]
fn test_valid_request_passes() {
    assert!(valid_request().validate().is_ok());
}

#[test]
fn test_fixed_product_amount_must_match_exactly() {
    let mut request = valid_request();
    request.amount = 25_000;
    assert!(request.validate().is_err());
    request.amount = 30_001;
    assert!(request.validate().is_err());
}

#[test]
fn test_fixed_product_duration_must_match_exactly() {
    let mut request = valid_request();
    request.duration_months = 2;
    assert!(request.validate().is_err());
}

#[test]
fn test_duration_bounded_by_product_maximum() {
    let mut request = valid_request();
    request.product = LoanProduct::SavingsDouble;
    request.amount = 50_000;
    request.duration_months = 13;
    assert!(request.validate().is_err());
    request.duration_months = 12;
    assert!(request.validate().is_ok());
}

#[test]
fn test_requires_purpose_salary_documents_guarantor_and_terms() {
    let mut request = valid_request();
    request.purpose = "   ".to_string();
    assert!(request.validate().is_err());

    let mut request = valid_request();
    request.monthly_salary = 0;
    assert!(request.validate().is_err());

    let mut request = valid_request();
    request.documents = vec!["payslip.pdf".to_string()];
    assert!(request.validate().is_err());

    let mut request = valid_request();
    request.guarantor_ids = vec![];
    assert!(request.validate().is_err());

    let mut request = valid_request();
    request.terms_agreed = false;
    assert!(request.validate().is_err());
}

#[test]
fn test_rejects_non_positive_amount() {
    let mut request = valid_request();
    request.product = LoanProduct::SavingsDouble;
    request.amount = 0;
    assert!(request.validate().is_err());
    request.amount = -5_000;
    assert!(request.validate().is_err());
}

// ============================================================================
// Savings Tenure Gate Tests
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_tenure_satisfied_by_deposits_in_each_prior_month() {
    let deposits = vec![date(2025, 5, 3), date(2025, 6, 17), date(2025, 7, 30)];
    assert!(has_consistent_savings(&deposits, 3, date(2025, 8, 10)));
}

#[test]
fn test_tenure_fails_on_a_gap_month() {
    // Nothing saved in June
    let deposits = vec![date(2025, 5, 3), date(2025, 7, 30)];
    assert!(!has_consistent_savings(&deposits, 3, date(2025, 8, 10)));
}

#[test]
fn test_tenure_ignores_current_month_in_progress() {
    // No deposit yet this month; the previous three months carry the gate
    let deposits = vec![date(2025, 5, 3), date(2025, 6, 17), date(2025, 7, 30)];
    assert!(has_consistent_savings(&deposits, 3, date(2025, 8, 1)));
}

#[test]
fn test_tenure_crosses_year_boundary() {
    let deposits = vec![date(2024, 11, 5), date(2024, 12, 20), date(2025, 1, 8)];
    assert!(has_consistent_savings(&deposits, 3, date(2025, 2, 14)));
}

#[test]
fn test_zero_tenure_requirement_always_passes() {
    assert!(has_consistent_savings(&[], 0, date(2025, 8, 10)));
}

// ============================================================================
// Approval Expiry Tests
// ============================================================================

fn pending_approval(expires_in_hours: i64) -> GuarantorApproval {
    let now = Utc::now();
    GuarantorApproval {
        id: Uuid::new_v4(),
        loan_id: Uuid::new_v4(),
        guarantor_id: Uuid::new_v4(),
        guarantor_name: "Ngozi Okafor".to_string(),
        guarantor_member_number: "COOP-0042".to_string(),
        guarantor_email: "ngozi@example.com".to_string(),
        applicant_name: "Adewale Balogun".to_string(),
        loan_amount: 30_000,
        loan_purpose: "School fees".to_string(),
        status: ApprovalStatus::Pending,
        token: "deadbeefdeadbeefdeadbeefdeadbeef".to_string(),
        rejection_reason: None,
        created_at: now - Duration::hours(72 - expires_in_hours),
        expires_at: now + Duration::hours(expires_in_hours),
        responded_at: None,
    }
}

#[test]
fn test_pending_within_window_is_actionable() {
    let approval = pending_approval(24);
    assert!(!approval.is_expired(Utc::now()));
    assert!(approval.is_actionable(Utc::now()));
}

#[test]
fn test_expired_request_still_reads_pending_but_is_not_actionable() {
    let approval = pending_approval(-1);
    // The stored status has not changed; expiry is a read-time judgement
    assert_eq!(approval.status, ApprovalStatus::Pending);
    assert!(approval.is_expired(Utc::now()));
    assert!(!approval.is_actionable(Utc::now()));
}

#[test]
fn test_responded_request_is_not_actionable() {
    let mut approval = pending_approval(24);
    approval.status = ApprovalStatus::Approved;
    assert!(!approval.is_actionable(Utc::now()));
}
