//! Money and schedule primitives
//!
//! Pure helpers shared by the eligibility evaluator, the loan lifecycle and
//! the installment schedule engine. Amounts are whole naira in `i64`; interest
//! is computed in `f64` and rounded to naira only when a schedule is
//! materialized. Callers are responsible for validating counts and durations
//! before calling in here.

use chrono::{Datelike, Months, NaiveDate};

/// Simple (non-compounding) interest pro-rated by duration.
///
/// `principal * rate * months / (100 * 12)`. Applied uniformly whether the
/// product documents its rate as flat or per-annum.
pub fn flat_interest(principal: i64, annual_rate_percent: f64, months: u32) -> f64 {
    principal as f64 * annual_rate_percent * months as f64 / (100.0 * 12.0)
}

/// Equal monthly payment over the full term: `(principal + interest) / months`.
pub fn monthly_payment(principal: i64, annual_rate_percent: f64, months: u32) -> f64 {
    let interest = flat_interest(principal, annual_rate_percent, months);
    (principal as f64 + interest) / months as f64
}

/// Principal plus interest, rounded to the nearest naira.
pub fn total_payable(principal: i64, annual_rate_percent: f64, months: u32) -> i64 {
    (principal as f64 + flat_interest(principal, annual_rate_percent, months)).round() as i64
}

/// Split `total` into `count` parts that sum exactly to `total`.
///
/// All parts but the last use ceiling division; the last part absorbs the
/// rounding remainder, so no naira is lost or invented.
pub fn split_total(total: i64, count: u32) -> Vec<i64> {
    let count = count as i64;
    let per = (total + count - 1) / count;
    let mut parts = vec![per; count as usize - 1];
    parts.push(total - per * (count - 1));
    parts
}

/// Advance a date by `months` calendar months.
///
/// Day-of-month is clamped to the target month's length (chrono semantics),
/// nothing more.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .expect("date within chrono range")
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .expect("valid calendar month")
}

/// First deduction date for a plan applied for on `application_date`.
///
/// Billing starts one full month after the application month closes: the due
/// date is the last day of the month *following* the application month
/// (applied any day in March, first deduction April 30).
pub fn first_deduction_date(application_date: NaiveDate) -> NaiveDate {
    let first_of_month = application_date
        .with_day(1)
        .expect("day 1 exists in every month");
    let two_months_on = add_months(first_of_month, 2);
    two_months_on.pred_opt().expect("date within chrono range")
}

/// Format a naira amount with the currency symbol and thousands separators.
pub fn format_naira(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-₦{}", grouped)
    } else {
        format!("₦{}", grouped)
    }
}

/// Format a date the way member-facing exports and emails show it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
