//! Loan eligibility evaluator
//!
//! Decides, per product, whether a member may borrow and up to how much.
//! Read-only: it looks at the member record and savings history and returns a
//! decision. A failed savings lookup yields an ineligible decision with an
//! explanatory message instead of an error, so the application form can
//! render guidance rather than crash.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::loan::model::LoanProduct;
use crate::money;

/// Outcome of an eligibility check
#[derive(Debug, Serialize, Clone)]
pub struct EligibilityDecision {
    pub eligible: bool,
    pub message: String,
    pub max_amount: i64,
}

impl EligibilityDecision {
    fn ineligible(message: impl Into<String>) -> Self {
        Self {
            eligible: false,
            message: message.into(),
            max_amount: 0,
        }
    }
}

/// Eligibility evaluator over the savings records
#[derive(Clone)]
pub struct EligibilityService {
    db_pool: PgPool,
}

impl EligibilityService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Evaluate a member against a product.
    pub async fn evaluate(&self, member_id: Uuid, product: LoanProduct) -> EligibilityDecision {
        let fee_paid: Option<(bool,)> =
            match sqlx::query_as("SELECT registration_fee_paid FROM members WHERE id = $1")
                .bind(member_id)
                .fetch_optional(&self.db_pool)
                .await
            {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(member = %member_id, error = %e, "Member lookup failed");
                    return EligibilityDecision::ineligible(
                        "We could not verify your membership record. Please try again later.",
                    );
                }
            };

        let Some((fee_paid,)) = fee_paid else {
            return EligibilityDecision::ineligible("Member record not found.");
        };

        if !fee_paid {
            return EligibilityDecision::ineligible(
                "Complete your registration fee payment to qualify for loans.",
            );
        }

        match product {
            LoanProduct::FixedRelief => {
                let amount = product.fixed_amount().unwrap_or(0);
                EligibilityDecision {
                    eligible: true,
                    message: format!(
                        "You qualify for the {} of {}.",
                        product.label(),
                        money::format_naira(amount)
                    ),
                    max_amount: amount,
                }
            }
            LoanProduct::SavingsDouble | LoanProduct::SavingsTriple => {
                self.evaluate_savings_tier(member_id, product).await
            }
        }
    }

    async fn evaluate_savings_tier(
        &self,
        member_id: Uuid,
        product: LoanProduct,
    ) -> EligibilityDecision {
        let balance: Option<(i64,)> =
            match sqlx::query_as("SELECT balance FROM savings_accounts WHERE member_id = $1")
                .bind(member_id)
                .fetch_optional(&self.db_pool)
                .await
            {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(member = %member_id, error = %e, "Savings balance lookup failed");
                    return EligibilityDecision::ineligible(
                        "We could not check your savings balance. Please try again later.",
                    );
                }
            };

        let balance = balance.map(|(b,)| b).unwrap_or(0);

        let deposit_dates: Vec<(DateTime<Utc>,)> = match sqlx::query_as(
            "SELECT deposited_at FROM savings_deposits WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_all(&self.db_pool)
        .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(member = %member_id, error = %e, "Savings history lookup failed");
                return EligibilityDecision::ineligible(
                    "We could not check your savings history. Please try again later.",
                );
            }
        };

        let dates: Vec<NaiveDate> = deposit_dates
            .into_iter()
            .map(|(at,)| at.date_naive())
            .collect();

        let required_tenure = product.min_tenure_months();
        let tenure_ok =
            has_consistent_savings(&dates, required_tenure, Utc::now().date_naive());

        let multiplier = product.savings_multiplier().unwrap_or(1);
        let max_amount = balance * multiplier;

        if !tenure_ok {
            return EligibilityDecision::ineligible(format!(
                "The {} requires savings in each of the last {} months.",
                product.label(),
                required_tenure
            ));
        }

        if max_amount <= 0 {
            return EligibilityDecision::ineligible(
                "You need a positive savings balance to qualify for this product.",
            );
        }

        EligibilityDecision {
            eligible: true,
            message: format!(
                "You can borrow up to {} ({}x your savings balance).",
                money::format_naira(max_amount),
                multiplier
            ),
            max_amount,
        }
    }
}

/// Tenure gate for the savings-multiple tiers.
///
/// Requires at least one deposit in each of the `months` full calendar months
/// preceding `today`'s month. The month in progress is not counted against
/// the member.
pub fn has_consistent_savings(deposit_dates: &[NaiveDate], months: u32, today: NaiveDate) -> bool {
    if months == 0 {
        return true;
    }

    // 0-based month index since year 0, for easy back-stepping
    let month_index = |year: i32, month: u32| year * 12 + month as i32 - 1;
    let current = month_index(today.year(), today.month());

    (1..=months as i32).all(|back| {
        let wanted = current - back;
        deposit_dates
            .iter()
            .any(|d| month_index(d.year(), d.month()) == wanted)
    })
}
