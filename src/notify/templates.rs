//! Email subject/body templates
//!
//! Kept as plain functions so the workflow code reads as "build message,
//! hand to sender".

use crate::money;
use crate::notify::EmailMessage;

/// Invitation sent to each requested guarantor, embedding the approval link.
pub fn guarantor_invitation(
    to: &str,
    guarantor_name: &str,
    applicant_name: &str,
    amount: i64,
    purpose: &str,
    approval_link: &str,
) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("{} has named you as a loan guarantor", applicant_name),
        body: format!(
            "Dear {guarantor_name},\n\n\
             {applicant_name} has applied for a loan of {amount} ({purpose}) and named you \
             as a guarantor.\n\n\
             Please review and respond within 72 hours:\n{approval_link}\n\n\
             If you do not recognise this request you can ignore this email.\n",
            amount = money::format_naira(amount),
        ),
    }
}

/// Sent to the borrower when an admin decides on the application.
pub fn loan_decision(
    to: &str,
    borrower_name: &str,
    approved: bool,
    amount: i64,
    note: Option<&str>,
) -> EmailMessage {
    let verdict = if approved { "approved" } else { "rejected" };
    let mut body = format!(
        "Dear {borrower_name},\n\nYour loan application for {} has been {verdict}.\n",
        money::format_naira(amount),
    );
    if let Some(note) = note {
        body.push_str(&format!("\nNote from the loans committee: {note}\n"));
    }
    EmailMessage {
        to: to.to_string(),
        subject: format!("Your loan application has been {verdict}"),
        body,
    }
}

/// Sent to the borrower when the loan is activated and the repayment
/// calendar has been drawn up.
pub fn loan_activated(
    to: &str,
    borrower_name: &str,
    amount: i64,
    months: i32,
    first_deduction: chrono::NaiveDate,
) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your loan is now active".to_string(),
        body: format!(
            "Dear {borrower_name},\n\n\
             Your loan of {} is now active. Repayment runs over {months} monthly \
             deductions, the first on {}.\n",
            money::format_naira(amount),
            money::format_date(first_deduction),
        ),
    }
}

/// Payment confirmation for a processed installment.
pub fn payment_confirmation(
    to: &str,
    member_name: &str,
    seq: i32,
    paid_amount: i64,
    reference: &str,
) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Payment received for installment {seq}"),
        body: format!(
            "Dear {member_name},\n\n\
             We have recorded your payment of {} against installment {seq}.\n\
             Payment reference: {reference}\n",
            money::format_naira(paid_amount),
        ),
    }
}
