//! Schedule business logic - Amortization periods for a debt.
//!
//! Generation splits the outstanding principal into N level installments, with the last
//! period absorbing the rounding remainder so the running balance lands on exactly zero.
//! The re-levelling pass runs after every confirmed payment: settled periods are frozen and
//! whatever the open periods still have to cover is spread evenly across them again.
//!
//! Planning is done on in-memory models; the async functions only load and persist them.

use super::money::{split_evenly, sum};
use crate::{
    entities::{DebtSchedule, Money, debt, debt_schedule, debt_schedule::ScheduleStatus},
    errors::{Error, Result},
};
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};

/// One period of a freshly generated schedule, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodPlan {
    /// 1-based period number
    pub period_number: i32,
    /// Balance before this period's principal
    pub start_balance: Decimal,
    /// Principal due this period
    pub principal: Decimal,
    /// Interest due this period (always zero: no interest is accrued)
    pub interest: Decimal,
    /// `principal + interest`
    pub installment: Decimal,
    /// Balance after this period's principal, never negative
    pub end_balance: Decimal,
    /// `start_date` plus `period_number` months
    pub due_date: NaiveDate,
}

/// Plans `period_count` level periods covering `remaining`.
///
/// # Errors
/// * [`Error::NothingToSchedule`] when `remaining` is zero or negative
/// * [`Error::InvalidPeriodCount`] when `period_count` is zero
/// * [`Error::InvalidState`] when a due date falls outside the calendar
pub fn plan_schedule(
    remaining: Decimal,
    period_count: u32,
    start_date: NaiveDate,
) -> Result<Vec<PeriodPlan>> {
    if remaining <= Decimal::ZERO {
        return Err(Error::NothingToSchedule { remaining });
    }
    if period_count == 0 {
        return Err(Error::InvalidPeriodCount {
            count: period_count,
        });
    }

    let principals = split_evenly(remaining, period_count as usize);
    let mut balance = remaining;
    let mut plans = Vec::with_capacity(principals.len());

    for (month, principal) in (1..=period_count).zip(principals) {
        let end_balance = (balance - principal).max(Decimal::ZERO);
        let due_date = start_date
            .checked_add_months(Months::new(month))
            .ok_or_else(|| Error::invalid_state(format!("due date overflow at period {month}")))?;
        plans.push(PeriodPlan {
            period_number: i32::try_from(month).map_err(|_| Error::InvalidPeriodCount {
                count: period_count,
            })?,
            start_balance: balance,
            principal,
            interest: Decimal::ZERO,
            installment: principal,
            end_balance,
            due_date,
        });
        balance = end_balance;
    }

    Ok(plans)
}

/// Retrieves all periods of a debt ordered by period number.
pub async fn get_schedule_for_debt<C>(db: &C, debt_id: i64) -> Result<Vec<debt_schedule::Model>>
where
    C: ConnectionTrait,
{
    DebtSchedule::find()
        .filter(debt_schedule::Column::DebtId.eq(debt_id))
        .order_by_asc(debt_schedule::Column::PeriodNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Persists a freshly planned schedule for `debt`, covering `remaining`.
///
/// All periods start `PENDING` with nothing paid. Money received before the debt existed
/// is never folded in here; the reconciler tracks it separately.
pub async fn generate_schedule<C>(
    db: &C,
    debt: &debt::Model,
    remaining: Decimal,
    period_count: u32,
) -> Result<Vec<debt_schedule::Model>>
where
    C: ConnectionTrait,
{
    let plans = plan_schedule(remaining, period_count, debt.start_date)?;
    let mut periods = Vec::with_capacity(plans.len());

    for plan in plans {
        let period = debt_schedule::ActiveModel {
            debt_id: Set(debt.id),
            period_number: Set(plan.period_number),
            start_balance: Set(plan.start_balance.into()),
            principal: Set(plan.principal.into()),
            interest: Set(plan.interest.into()),
            installment: Set(plan.installment.into()),
            end_balance: Set(plan.end_balance.into()),
            due_date: Set(plan.due_date),
            paid_amount: Set(Money::ZERO),
            payment_date: Set(None),
            status: Set(ScheduleStatus::Pending),
            ..Default::default()
        };
        periods.push(period.insert(db).await?);
    }

    tracing::debug!(
        debt_id = debt.id,
        periods = periods.len(),
        %remaining,
        "Generated schedule"
    );
    Ok(periods)
}

/// Status an unsettled period should show for its current paid amount.
pub(crate) fn open_status(period: &debt_schedule::Model) -> ScheduleStatus {
    if period.paid_amount >= period.installment {
        ScheduleStatus::Paid
    } else if period.status == ScheduleStatus::Overdue {
        ScheduleStatus::Overdue
    } else if period.paid_amount > Decimal::ZERO {
        ScheduleStatus::Partial
    } else {
        ScheduleStatus::Pending
    }
}

/// Re-levels the open periods of a schedule and rebuilds the balance chain.
///
/// `periods` must be sorted by period number. The schedule total (sum of installments)
/// is preserved: settled periods keep their installment, and the rest of the total is
/// split evenly across the open periods with the last one absorbing the remainder. An open
/// period that has already been paid at least its new share is settled at what it was paid
/// and taken out of the split.
pub fn relevel_schedule(periods: &mut [debt_schedule::Model], now: DateTimeUtc) {
    let total = sum(periods.iter().map(|p| p.installment));
    let mut open: Vec<usize> = (0..periods.len())
        .filter(|&i| !periods[i].is_settled())
        .collect();

    while !open.is_empty() {
        let settled_total: Decimal = periods
            .iter()
            .enumerate()
            .filter(|(i, _)| !open.contains(i))
            .map(|(_, p)| p.installment.decimal())
            .sum();
        let pool = (total - settled_total).max(Decimal::ZERO);
        let shares = split_evenly(pool, open.len());

        let covered: Vec<usize> = open
            .iter()
            .zip(&shares)
            .filter(|&(&i, share)| {
                periods[i].paid_amount > Decimal::ZERO && periods[i].paid_amount >= *share
            })
            .map(|(&i, _)| i)
            .collect();

        if covered.is_empty() {
            for (&i, share) in open.iter().zip(shares) {
                let period = &mut periods[i];
                period.principal = (share - period.interest).into();
                period.installment = share.into();
                period.status = open_status(period);
            }
            break;
        }

        for i in covered {
            let period = &mut periods[i];
            period.installment = period.paid_amount;
            period.principal = (period.paid_amount - period.interest).into();
            period.status = ScheduleStatus::Paid;
            if period.payment_date.is_none() {
                period.payment_date = Some(now);
            }
            open.retain(|&j| j != i);
        }
    }

    rebuild_balances(periods);
}

/// Recomputes the start/end balance chain.
///
/// Settled periods ahead of the first open one step down by their installment from the
/// schedule total. From the first open period on, the chain restarts at what is still owed
/// (schedule total minus everything paid, partial payments included) and each period steps
/// down by its shortfall, so the last open period ends at zero. Settled periods after that
/// point owe nothing and keep the balance flat.
fn rebuild_balances(periods: &mut [debt_schedule::Model]) {
    let total = sum(periods.iter().map(|p| p.installment));
    let outstanding = (total - sum(periods.iter().map(|p| p.paid_amount))).max(Decimal::ZERO);

    let mut balance = total;
    let mut reached_open = false;
    for period in periods.iter_mut() {
        if !reached_open && !period.is_settled() {
            reached_open = true;
            balance = outstanding;
        }
        let step = if reached_open {
            period.shortfall()
        } else {
            period.installment.decimal()
        };
        period.start_balance = balance.into();
        balance = (balance - step).max(Decimal::ZERO);
        period.end_balance = balance.into();
    }
}

/// Writes back the mutable columns of each period.
pub async fn save_periods<C>(db: &C, periods: &[debt_schedule::Model]) -> Result<()>
where
    C: ConnectionTrait,
{
    for period in periods {
        let mut active: debt_schedule::ActiveModel = period.clone().into();
        active.start_balance = Set(period.start_balance);
        active.principal = Set(period.principal);
        active.installment = Set(period.installment);
        active.end_balance = Set(period.end_balance);
        active.paid_amount = Set(period.paid_amount);
        active.payment_date = Set(period.payment_date);
        active.status = Set(period.status);
        active.update(db).await?;
    }
    Ok(())
}
