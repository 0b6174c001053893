//! Money and schedule primitive tests
//!
//! These validate the repayment math policies: the flat-interest identity,
//! exact-sum splitting, and the two-month-skip first deduction date.

use chrono::NaiveDate;

use coopcred_server::money::{
    add_months, first_deduction_date, flat_interest, format_date, format_naira, last_day_of_month,
    monthly_payment, split_total, total_payable,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Flat Interest Tests
// ============================================================================

#[test]
fn test_flat_interest_formula() {
    // 30,000 at 5% flat over 3 months
    assert!((flat_interest(30_000, 5.0, 3) - 375.0).abs() < 1e-9);
    // 100,000 at 10% over 6 months
    assert!((flat_interest(100_000, 10.0, 6) - 5_000.0).abs() < 1e-9);
    // 12 months is one full year of the annual rate
    assert!((flat_interest(50_000, 12.0, 12) - 6_000.0).abs() < 1e-9);
}

#[test]
fn test_monthly_payment_identity() {
    // monthly_payment * months == principal + interest, within float tolerance
    for &(principal, rate, months) in &[
        (30_000i64, 5.0f64, 3u32),
        (100_000, 10.0, 6),
        (250_000, 12.0, 24),
        (77_777, 8.5, 7),
    ] {
        let total = principal as f64 + flat_interest(principal, rate, months);
        let paid = monthly_payment(principal, rate, months) * months as f64;
        assert!(
            (total - paid).abs() < 1e-6,
            "identity failed for ({}, {}, {})",
            principal,
            rate,
            months
        );
    }
}

#[test]
fn test_total_payable_rounds_to_naira() {
    assert_eq!(total_payable(100_000, 10.0, 6), 110_000);
    assert_eq!(total_payable(30_000, 5.0, 3), 30_375);
}

// ============================================================================
// Split Tests
// ============================================================================

#[test]
fn test_split_total_sums_exactly() {
    for &(total, count) in &[(110_000i64, 6u32), (30_375, 3), (100, 7), (1, 1), (99, 100)] {
        let parts = split_total(total, count);
        assert_eq!(parts.len(), count as usize);
        assert_eq!(parts.iter().sum::<i64>(), total, "drift for {}/{}", total, count);
    }
}

#[test]
fn test_split_total_ceiling_division() {
    let parts = split_total(110_000, 6);
    // ceil(110000 / 6) = 18334 for all but the last
    for part in &parts[..5] {
        assert_eq!(*part, 18_334);
    }
    // The last entry absorbs the remainder
    assert_eq!(parts[5], 110_000 - 18_334 * 5);
    assert_eq!(parts[5], 18_330);
}

#[test]
fn test_split_total_even_division() {
    let parts = split_total(30_000, 3);
    assert_eq!(parts, vec![10_000, 10_000, 10_000]);
}

// ============================================================================
// Calendar Tests
// ============================================================================

#[test]
fn test_add_months_clamps_short_months() {
    assert_eq!(add_months(date(2025, 1, 31), 1), date(2025, 2, 28));
    // Each step is taken from the original date, not the clamped one
    assert_eq!(add_months(date(2025, 1, 31), 2), date(2025, 3, 31));
    assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
}

#[test]
fn test_last_day_of_month() {
    assert_eq!(last_day_of_month(2025, 2), date(2025, 2, 28));
    assert_eq!(last_day_of_month(2024, 2), date(2024, 2, 29));
    assert_eq!(last_day_of_month(2025, 12), date(2025, 12, 31));
}

#[test]
fn test_first_deduction_date_skips_to_end_of_next_month() {
    // Applied any day in January: first deduction is the last day of February
    assert_eq!(first_deduction_date(date(2025, 1, 1)), date(2025, 2, 28));
    assert_eq!(first_deduction_date(date(2025, 1, 15)), date(2025, 2, 28));
    assert_eq!(first_deduction_date(date(2025, 1, 31)), date(2025, 2, 28));
    // Leap year February
    assert_eq!(first_deduction_date(date(2024, 1, 10)), date(2024, 2, 29));
    // Applied in March: April 30, not March anything
    assert_eq!(first_deduction_date(date(2025, 3, 3)), date(2025, 4, 30));
    // Year rollover
    assert_eq!(first_deduction_date(date(2025, 12, 31)), date(2026, 1, 31));
}

// ============================================================================
// Formatting Tests
// ============================================================================

#[test]
fn test_format_naira() {
    assert_eq!(format_naira(0), "₦0");
    assert_eq!(format_naira(999), "₦999");
    assert_eq!(format_naira(30_000), "₦30,000");
    assert_eq!(format_naira(1_234_567), "₦1,234,567");
    assert_eq!(format_naira(-5_000), "-₦5,000");
}

#[test]
fn test_format_date() {
    assert_eq!(format_date(date(2025, 4, 30)), "30/04/2025");
}
