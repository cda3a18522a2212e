//! Debt statements.
//!
//! A statement is a read-only snapshot of one debt: the reconciled balances, how far the
//! schedule has progressed and the latest payments. It returns structured data and leaves
//! formatting to the caller.

use super::{
    money::round_currency,
    reconcile::OriginResolver,
    workflow::{DebtDetails, DebtWorkflow},
};
use crate::{
    entities::{debt, debt_payment, debt_schedule},
    errors::Result,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// Number of payments included when the caller gives no limit
pub const DEFAULT_PAYMENT_LIMIT: usize = 10;

/// Snapshot of a debt's settlement progress.
#[derive(Debug, Clone, Serialize)]
pub struct DebtStatement {
    /// The reconciled debt
    pub debt: debt::Model,
    /// Amount still owed
    pub amount_remaining: Decimal,
    /// Settled share of the amount due, in percent (0-100)
    pub progress_percent: Decimal,
    /// Periods fully paid
    pub periods_paid: usize,
    /// Periods in the schedule
    pub periods_total: usize,
    /// Earliest period still waiting for money
    pub next_period: Option<debt_schedule::Model>,
    /// Most recent payments, newest first
    pub recent_payments: Vec<debt_payment::Model>,
}

/// Builds the statement for `debt_id`, including at most `payment_limit` payments
/// (ten when `None`).
pub async fn generate_debt_statement<R>(
    workflow: &DebtWorkflow<R>,
    debt_id: i64,
    payment_limit: Option<usize>,
) -> Result<DebtStatement>
where
    R: OriginResolver,
{
    let DebtDetails {
        debt,
        schedules,
        payments,
    } = workflow.get_debt(debt_id).await?;

    let periods_paid = schedules.iter().filter(|p| p.is_settled()).count();
    let periods_total = schedules.len();
    let next_period = schedules.into_iter().find(|p| p.paid_amount < p.installment);
    let recent_payments = payments
        .into_iter()
        .take(payment_limit.unwrap_or(DEFAULT_PAYMENT_LIMIT))
        .collect();

    Ok(DebtStatement {
        amount_remaining: debt.remaining(),
        progress_percent: calculate_progress(*debt.amount_paid, *debt.amount_due),
        debt,
        periods_paid,
        periods_total,
        next_period,
        recent_payments,
    })
}

/// Percentage of `amount_due` covered by `amount_paid`, clamped to 0-100.
///
/// A zero amount due reports zero progress.
#[must_use]
pub fn calculate_progress(amount_paid: Decimal, amount_due: Decimal) -> Decimal {
    if amount_due.is_zero() {
        return Decimal::ZERO;
    }

    round_currency(amount_paid / amount_due * Decimal::ONE_HUNDRED)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::workflow::NewPayment, entities::PaymentMethod, test_utils::*};
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculate_progress() {
        assert_eq!(calculate_progress(dec!(0), dec!(100)), dec!(0));
        assert_eq!(calculate_progress(dec!(50), dec!(100)), dec!(50));
        assert_eq!(calculate_progress(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(calculate_progress(dec!(120), dec!(100)), dec!(100));
        assert_eq!(calculate_progress(dec!(10), dec!(0)), dec!(0));
    }

    #[tokio::test]
    async fn test_statement_tracks_schedule_progress() -> Result<()> {
        let workflow = test_workflow().await?;
        let created = workflow.create_debt(test_new_debt(dec!(12000000))).await?;
        let debt_id = created.debt.id;

        workflow
            .submit_payment(debt_id, NewPayment::new(dec!(1500000), PaymentMethod::Cash))
            .await?;
        workflow
            .submit_payment(debt_id, NewPayment::new(dec!(200000), PaymentMethod::Cash))
            .await?;

        let statement = generate_debt_statement(&workflow, debt_id, Some(1)).await?;
        assert_eq!(statement.debt.amount_paid, dec!(1700000));
        assert_eq!(statement.amount_remaining, dec!(10300000));
        assert_eq!(statement.progress_percent, dec!(14.17));
        assert_eq!(statement.periods_total, 12);
        assert_eq!(statement.periods_paid, 1);
        assert_eq!(statement.next_period.unwrap().period_number, 2);
        assert_eq!(statement.recent_payments.len(), 1);
        assert_eq!(statement.recent_payments[0].amount, dec!(200000));
        Ok(())
    }
}
