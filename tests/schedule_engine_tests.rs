//! Installment schedule engine tests
//!
//! Pure-engine coverage: generation invariants, the idempotent overdue
//! sweep, payment application and the CSV export shape.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use coopcred_server::schedule::engine::{
    apply_payment, export_csv, generate, recompute_overdue, statistics,
};
use coopcred_server::schedule::{InstallmentEntry, InstallmentStatus, PlanKind};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_schedule(total: i64, count: u32) -> Vec<InstallmentEntry> {
    generate(
        PlanKind::Loan,
        Uuid::new_v4(),
        total,
        count,
        date(2025, 2, 28),
    )
}

// ============================================================================
// Generation Tests
// ============================================================================

#[test]
fn test_generate_six_installments_sum_exactly() {
    // 100,000 over 6 months at 10% flat: total payable 110,000
    let entries = sample_schedule(110_000, 6);

    assert_eq!(entries.len(), 6);
    assert_eq!(entries.iter().map(|e| e.amount).sum::<i64>(), 110_000);
    for entry in &entries[..5] {
        assert_eq!(entry.amount, 18_334);
    }
    assert_eq!(entries[5].amount, 18_330);
}

#[test]
fn test_generate_sequence_is_contiguous_from_one() {
    let entries = sample_schedule(30_375, 3);
    let seqs: Vec<i32> = entries.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
}

#[test]
fn test_generate_monthly_due_dates() {
    let entries = sample_schedule(12_000, 4);
    assert_eq!(entries[0].due_date, date(2025, 2, 28));
    assert_eq!(entries[1].due_date, date(2025, 3, 28));
    assert_eq!(entries[2].due_date, date(2025, 4, 28));
    assert_eq!(entries[3].due_date, date(2025, 5, 28));
}

#[test]
fn test_generate_all_entries_start_pending() {
    let entries = sample_schedule(9_000, 3);
    assert!(entries
        .iter()
        .all(|e| e.status == InstallmentStatus::Pending && e.paid_date.is_none()));
}

// ============================================================================
// Overdue Sweep Tests
// ============================================================================

#[test]
fn test_recompute_overdue_flips_past_due_pending() {
    let mut entries = sample_schedule(12_000, 4);
    let today = date(2025, 4, 1);

    let changed = recompute_overdue(&mut entries, today);

    // Feb 28 and Mar 28 are past, Apr 28 and May 28 are not
    assert_eq!(changed.len(), 2);
    assert_eq!(entries[0].status, InstallmentStatus::Overdue);
    assert_eq!(entries[1].status, InstallmentStatus::Overdue);
    assert_eq!(entries[2].status, InstallmentStatus::Pending);
    assert_eq!(entries[3].status, InstallmentStatus::Pending);
}

#[test]
fn test_recompute_overdue_is_idempotent() {
    let mut entries = sample_schedule(12_000, 4);
    let today = date(2025, 4, 1);

    recompute_overdue(&mut entries, today);
    let snapshot: Vec<InstallmentStatus> = entries.iter().map(|e| e.status).collect();

    let changed_again = recompute_overdue(&mut entries, today);

    assert!(changed_again.is_empty());
    let after: Vec<InstallmentStatus> = entries.iter().map(|e| e.status).collect();
    assert_eq!(snapshot, after);
}

#[test]
fn test_recompute_overdue_skips_paid_entries() {
    let mut entries = sample_schedule(12_000, 4);
    apply_payment(
        &mut entries[0],
        3_000,
        date(2025, 2, 27),
        "PAY-001",
        Uuid::new_v4(),
        Utc::now(),
    )
    .unwrap();

    let changed = recompute_overdue(&mut entries, date(2025, 4, 1));

    assert_eq!(entries[0].status, InstallmentStatus::Paid);
    assert_eq!(changed.len(), 1); // only the March entry flips
}

#[test]
fn test_due_today_is_not_overdue() {
    let mut entries = sample_schedule(12_000, 4);
    let changed = recompute_overdue(&mut entries, date(2025, 2, 28));
    assert!(changed.is_empty());
}

// ============================================================================
// Payment Application Tests
// ============================================================================

#[test]
fn test_apply_payment_records_audit_fields() {
    let mut entries = sample_schedule(12_000, 4);
    let processor = Uuid::new_v4();

    apply_payment(
        &mut entries[0],
        3_000,
        date(2025, 2, 25),
        "FLW-REF-123",
        processor,
        Utc::now(),
    )
    .unwrap();

    let entry = &entries[0];
    assert_eq!(entry.status, InstallmentStatus::Paid);
    assert_eq!(entry.paid_amount, Some(3_000));
    assert_eq!(entry.paid_date, Some(date(2025, 2, 25)));
    assert_eq!(entry.payment_reference.as_deref(), Some("FLW-REF-123"));
    assert_eq!(entry.processed_by, Some(processor));
    assert!(entry.processed_at.is_some());
}

#[test]
fn test_apply_payment_rejects_paid_entry_without_mutation() {
    let mut entries = sample_schedule(12_000, 4);
    apply_payment(
        &mut entries[0],
        3_000,
        date(2025, 2, 25),
        "FLW-REF-123",
        Uuid::new_v4(),
        Utc::now(),
    )
    .unwrap();

    let before = entries[0].clone();

    let result = apply_payment(
        &mut entries[0],
        9_999,
        date(2025, 3, 1),
        "FLW-REF-456",
        Uuid::new_v4(),
        Utc::now(),
    );

    assert!(result.is_err());
    assert_eq!(entries[0].paid_amount, before.paid_amount);
    assert_eq!(entries[0].payment_reference, before.payment_reference);
    assert_eq!(entries[0].paid_date, before.paid_date);
}

#[test]
fn test_apply_payment_accepts_partial_amount_as_is() {
    let mut entries = sample_schedule(12_000, 4);
    // Scheduled 3,000 but only 1,000 arrives; recorded verbatim
    apply_payment(
        &mut entries[0],
        1_000,
        date(2025, 2, 25),
        "FLW-REF-789",
        Uuid::new_v4(),
        Utc::now(),
    )
    .unwrap();

    assert_eq!(entries[0].status, InstallmentStatus::Paid);
    assert_eq!(entries[0].paid_amount, Some(1_000));
}

#[test]
fn test_overdue_entry_can_still_be_paid() {
    let mut entries = sample_schedule(12_000, 4);
    recompute_overdue(&mut entries, date(2025, 4, 1));
    assert_eq!(entries[0].status, InstallmentStatus::Overdue);

    apply_payment(
        &mut entries[0],
        3_000,
        date(2025, 4, 2),
        "FLW-REF-LATE",
        Uuid::new_v4(),
        Utc::now(),
    )
    .unwrap();

    assert_eq!(entries[0].status, InstallmentStatus::Paid);
}

// ============================================================================
// Statistics Tests
// ============================================================================

#[test]
fn test_statistics_counts_and_progress() {
    let mut entries = sample_schedule(12_000, 4);
    apply_payment(
        &mut entries[0],
        3_000,
        date(2025, 2, 25),
        "REF-1",
        Uuid::new_v4(),
        Utc::now(),
    )
    .unwrap();
    recompute_overdue(&mut entries, date(2025, 4, 1));

    let stats = statistics(&entries);

    assert_eq!(stats.total_amount, 12_000);
    assert_eq!(stats.paid_amount, 3_000);
    assert_eq!(stats.remaining_amount, 9_000);
    assert_eq!(stats.total_count, 4);
    assert_eq!(stats.paid_count, 1);
    assert_eq!(stats.overdue_count, 1);
    assert_eq!(stats.pending_count, 2);
    // Count-based: round(100 * 1/4)
    assert_eq!(stats.progress_percentage, 25);
}

#[test]
fn test_statistics_progress_is_count_based_and_rounded() {
    let mut entries = sample_schedule(9_000, 3);
    apply_payment(
        &mut entries[0],
        5_000,
        date(2025, 2, 25),
        "REF-1",
        Uuid::new_v4(),
        Utc::now(),
    )
    .unwrap();

    // One of three paid: 33%, regardless of the amounts involved
    assert_eq!(statistics(&entries).progress_percentage, 33);

    apply_payment(
        &mut entries[1],
        5_000,
        date(2025, 3, 25),
        "REF-2",
        Uuid::new_v4(),
        Utc::now(),
    )
    .unwrap();

    assert_eq!(statistics(&entries).progress_percentage, 67);
}

#[test]
fn test_statistics_empty_schedule() {
    let stats = statistics(&[]);
    assert_eq!(stats.total_count, 0);
    assert_eq!(stats.progress_percentage, 0);
}

// ============================================================================
// CSV Export Tests
// ============================================================================

#[test]
fn test_export_csv_has_header_and_one_row_per_entry() {
    let entries = sample_schedule(120_000, 12);
    let csv = export_csv(&entries);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 13); // 1 header + 12 rows
    assert_eq!(
        lines[0],
        "Installment,Amount,Due Date,Status,Paid Date,Paid Amount"
    );

    // Rows appear in sequence order, 1 through 12
    for (i, line) in lines[1..].iter().enumerate() {
        assert!(
            line.starts_with(&format!("{},", i + 1)),
            "row {} out of order: {}",
            i + 1,
            line
        );
    }
}

#[test]
fn test_export_csv_formats_amounts_and_dates() {
    let mut entries = sample_schedule(110_000, 6);
    apply_payment(
        &mut entries[0],
        18_334,
        date(2025, 2, 25),
        "REF-1",
        Uuid::new_v4(),
        Utc::now(),
    )
    .unwrap();

    let csv = export_csv(&entries);
    let lines: Vec<&str> = csv.lines().collect();

    assert!(lines[1].contains("\"₦18,334\""));
    assert!(lines[1].contains("28/02/2025"));
    assert!(lines[1].contains("paid"));
    assert!(lines[1].contains("25/02/2025"));
    assert!(lines[6].contains("\"₦18,330\""));
}
