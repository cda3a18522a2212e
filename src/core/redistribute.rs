//! Overpayment carry-forward across schedule periods.
//!
//! A confirmed amount is applied to one period; anything beyond that period's installment
//! flows into the following periods that are still short, in order. Money that no later
//! period can absorb is reported back as unapplied and never written onto an already
//! settled period.

use super::schedule::open_status;
use crate::entities::{debt_schedule, debt_schedule::ScheduleStatus};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeUtc;

/// Where a confirmed amount ended up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// `(period_number, amount)` for every period that received money, in order
    pub applied: Vec<(i32, Decimal)>,
    /// Part of the amount no period could absorb
    pub unapplied: Decimal,
}

impl Allocation {
    /// Total placed onto periods.
    #[must_use]
    pub fn applied_total(&self) -> Decimal {
        self.applied.iter().map(|(_, amount)| *amount).sum()
    }
}

/// Index of the first period that still needs money, if any.
#[must_use]
pub fn first_open_period(periods: &[debt_schedule::Model]) -> Option<usize> {
    periods.iter().position(|p| p.paid_amount < p.installment)
}

/// Applies `amount` to `periods[start]` and carries any excess forward.
///
/// The starting period receives the whole amount; if that pushes it past its installment it
/// is clamped to exactly the installment and the overpayment is walked through the later
/// periods, each topped up as far as the remainder allows. `periods` must be sorted by
/// period number.
pub fn apply_payment(
    periods: &mut [debt_schedule::Model],
    start: usize,
    amount: Decimal,
    now: DateTimeUtc,
) -> Allocation {
    let mut allocation = Allocation::default();
    let Some(first) = periods.get_mut(start) else {
        allocation.unapplied = amount;
        return allocation;
    };

    let new_paid = first.paid_amount + amount;
    let overpayment = new_paid - first.installment;
    if overpayment <= Decimal::ZERO {
        first.paid_amount = new_paid.into();
        mark_progress(first, now);
        allocation.applied.push((first.period_number, amount));
        return allocation;
    }

    let taken = (first.installment - first.paid_amount).max(Decimal::ZERO);
    first.paid_amount = first.installment;
    mark_progress(first, now);
    if taken > Decimal::ZERO {
        allocation.applied.push((first.period_number, taken));
    }

    let mut left = amount - taken;
    for period in periods.iter_mut().skip(start + 1) {
        if left <= Decimal::ZERO {
            break;
        }
        let shortfall = period.shortfall();
        if shortfall <= Decimal::ZERO {
            continue;
        }
        let portion = shortfall.min(left);
        period.paid_amount += portion;
        mark_progress(period, now);
        allocation.applied.push((period.period_number, portion));
        left -= portion;
    }

    allocation.unapplied = left.max(Decimal::ZERO);
    allocation
}

fn mark_progress(period: &mut debt_schedule::Model, now: DateTimeUtc) {
    period.status = open_status(period);
    if period.status == ScheduleStatus::Paid && period.payment_date.is_none() {
        period.payment_date = Some(now);
    }
}
