//! Installment schedule engine
//!
//! Pure schedule computation: generation, overdue recomputation, payment
//! application, statistics and CSV export. Persistence lives in the schedule
//! service; everything here operates on in-memory entries so the policies can
//! be tested without a database.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::money;
use crate::schedule::model::{InstallmentEntry, InstallmentStatus, PlanKind};

/// Generate a full schedule for a plan.
///
/// `total` is divided with ceiling division; the last entry absorbs the
/// rounding remainder so the entries sum exactly to `total`. Due dates step
/// forward one calendar month per entry from `start_date`. Sequence numbers
/// are contiguous from 1.
pub fn generate(
    plan_kind: PlanKind,
    plan_id: Uuid,
    total: i64,
    count: u32,
    start_date: NaiveDate,
) -> Vec<InstallmentEntry> {
    money::split_total(total, count)
        .into_iter()
        .enumerate()
        .map(|(i, amount)| InstallmentEntry {
            id: Uuid::new_v4(),
            plan_kind,
            plan_id,
            seq: i as i32 + 1,
            amount,
            due_date: money::add_months(start_date, i as u32),
            status: InstallmentStatus::Pending,
            paid_date: None,
            paid_amount: None,
            payment_reference: None,
            processed_by: None,
            processed_at: None,
        })
        .collect()
}

/// Sweep pending entries whose due date has passed into `Overdue`.
///
/// Idempotent: entries already overdue or paid pass through untouched.
/// Returns the ids of entries that changed so the caller can persist just
/// those rows.
pub fn recompute_overdue(entries: &mut [InstallmentEntry], today: NaiveDate) -> Vec<Uuid> {
    let mut changed = Vec::new();
    for entry in entries.iter_mut() {
        if entry.status == InstallmentStatus::Pending && entry.due_date < today {
            entry.status = InstallmentStatus::Overdue;
            changed.push(entry.id);
        }
    }
    changed
}

/// Apply a payment to one entry.
///
/// Re-paying a paid entry is rejected and leaves the entry untouched. The
/// paid amount is recorded as supplied; it is not required to match the
/// scheduled amount.
pub fn apply_payment(
    entry: &mut InstallmentEntry,
    paid_amount: i64,
    paid_date: NaiveDate,
    payment_reference: &str,
    processed_by: Uuid,
    processed_at: DateTime<Utc>,
) -> Result<(), String> {
    if entry.status == InstallmentStatus::Paid {
        return Err(format!("Installment {} has already been paid", entry.seq));
    }
    entry.status = InstallmentStatus::Paid;
    entry.paid_date = Some(paid_date);
    entry.paid_amount = Some(paid_amount);
    entry.payment_reference = Some(payment_reference.to_string());
    entry.processed_by = Some(processed_by);
    entry.processed_at = Some(processed_at);
    Ok(())
}

/// Aggregate statistics over a schedule.
pub fn statistics(entries: &[InstallmentEntry]) -> crate::schedule::model::ScheduleStatistics {
    let total_amount: i64 = entries.iter().map(|e| e.amount).sum();
    let paid_amount: i64 = entries
        .iter()
        .filter(|e| e.status == InstallmentStatus::Paid)
        .map(|e| e.paid_amount.unwrap_or(e.amount))
        .sum();
    let total_count = entries.len();
    let paid_count = entries
        .iter()
        .filter(|e| e.status == InstallmentStatus::Paid)
        .count();
    let pending_count = entries
        .iter()
        .filter(|e| e.status == InstallmentStatus::Pending)
        .count();
    let overdue_count = entries
        .iter()
        .filter(|e| e.status == InstallmentStatus::Overdue)
        .count();
    let progress_percentage = if total_count == 0 {
        0
    } else {
        (100.0 * paid_count as f64 / total_count as f64).round() as i32
    };

    crate::schedule::model::ScheduleStatistics {
        total_amount,
        paid_amount,
        remaining_amount: total_amount - paid_amount,
        total_count,
        paid_count,
        pending_count,
        overdue_count,
        progress_percentage,
    }
}

/// Render a schedule as CSV, one row per entry in sequence order.
pub fn export_csv(entries: &[InstallmentEntry]) -> String {
    let mut out = String::from("Installment,Amount,Due Date,Status,Paid Date,Paid Amount\n");
    for entry in entries {
        let status = match entry.status {
            InstallmentStatus::Pending => "pending",
            InstallmentStatus::Paid => "paid",
            InstallmentStatus::Overdue => "overdue",
        };
        let paid_date = entry
            .paid_date
            .map(money::format_date)
            .unwrap_or_default();
        let paid_amount = entry
            .paid_amount
            .map(money::format_naira)
            .unwrap_or_default();
        out.push_str(&format!(
            "{},\"{}\",{},{},{},\"{}\"\n",
            entry.seq,
            money::format_naira(entry.amount),
            money::format_date(entry.due_date),
            status,
            paid_date,
            paid_amount,
        ));
    }
    out
}
