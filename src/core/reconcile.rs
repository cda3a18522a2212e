//! Balance reconciliation - The single place a debt's settled amount is computed.
//!
//! The settled amount is rebuilt from scratch every time: the initial external contribution
//! (money paid on the originating transaction before the debt existed) plus either the
//! schedule periods' paid amounts or, for unscheduled debts, the confirmed payments. A small
//! gap to the amount due is snapped shut to absorb installment rounding. The status is then
//! derived from the result.
//!
//! Reconciliation only reads payments and periods and only writes the debt row, so running it
//! twice in a row changes nothing.

use super::money::sum;
use crate::{
    config::LedgerConfig,
    entities::{
        Debt, DebtPayment, DebtSchedule, debt, debt::DebtStatus, debt_payment,
        debt_payment::PaymentStatus, debt_schedule,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{Set, prelude::*};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Looks up how much was already paid on an originating external transaction.
///
/// Returns `Ok(None)` when the reference does not resolve; that is not an error and
/// counts as a zero contribution.
pub trait OriginResolver: Send + Sync {
    /// Amount already paid on the transaction identified by `reference`.
    fn paid_amount(&self, reference: &str) -> impl Future<Output = Result<Option<Decimal>>> + Send;
}

/// Resolver for deployments without an order source: nothing ever resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOrigin;

impl OriginResolver for NoOrigin {
    async fn paid_amount(&self, _reference: &str) -> Result<Option<Decimal>> {
        Ok(None)
    }
}

/// Resolver backed by a fixed reference → amount map.
#[derive(Debug, Clone, Default)]
pub struct FixedOrigins {
    amounts: HashMap<String, Decimal>,
}

impl FixedOrigins {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the paid amount for `reference`.
    #[must_use]
    pub fn with(mut self, reference: impl Into<String>, amount: Decimal) -> Self {
        self.amounts.insert(reference.into(), amount);
        self
    }
}

impl OriginResolver for FixedOrigins {
    async fn paid_amount(&self, reference: &str) -> Result<Option<Decimal>> {
        Ok(self.amounts.get(reference).copied())
    }
}

/// Outcome of reconciling one debt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Money paid before the debt existed
    pub initial_contribution: Decimal,
    /// Contribution plus schedule or ledger payments, before snapping
    pub candidate: Decimal,
    /// Settled amount after the rounding snap
    pub amount_paid: Decimal,
    /// Derived status
    pub status: DebtStatus,
}

/// Snaps `candidate` to `amount_due` when the two are closer than `tolerance`.
#[must_use]
pub fn settle_amount(amount_due: Decimal, candidate: Decimal, tolerance: Decimal) -> Decimal {
    if (amount_due - candidate).abs() < tolerance {
        amount_due
    } else {
        candidate
    }
}

/// Derives a debt's status from its settled amount.
///
/// `CANCELLED` is sticky. Otherwise a fully settled debt is `PAID`, an unsettled one past its
/// due date is `OVERDUE`, and anything else is `ACTIVE`.
#[must_use]
pub fn derive_status(
    current: DebtStatus,
    amount_paid: Decimal,
    amount_due: Decimal,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> DebtStatus {
    if current == DebtStatus::Cancelled {
        return DebtStatus::Cancelled;
    }
    if amount_paid >= amount_due {
        DebtStatus::Paid
    } else if due_date.is_some_and(|due| due < today) {
        DebtStatus::Overdue
    } else {
        DebtStatus::Active
    }
}

/// Resolves the money paid on the debt's originating transaction, zero when there is none.
pub async fn initial_contribution<R>(resolver: &R, debt: &debt::Model) -> Result<Decimal>
where
    R: OriginResolver,
{
    let Some(reference) = debt.origin_reference.as_deref() else {
        return Ok(Decimal::ZERO);
    };

    match resolver.paid_amount(reference).await? {
        Some(amount) if amount.is_sign_negative() => {
            warn!(
                debt_id = debt.id,
                reference,
                %amount,
                "Origin resolved to a negative amount, ignoring it"
            );
            Ok(Decimal::ZERO)
        }
        Some(amount) => Ok(amount),
        None => {
            debug!(
                debt_id = debt.id,
                reference,
                "Origin reference did not resolve"
            );
            Ok(Decimal::ZERO)
        }
    }
}

/// Computes the reconciled amount and status without writing anything.
pub async fn compute_reconciliation<C, R>(
    db: &C,
    resolver: &R,
    config: &LedgerConfig,
    debt: &debt::Model,
    today: NaiveDate,
) -> Result<Reconciliation>
where
    C: ConnectionTrait,
    R: OriginResolver,
{
    let initial = initial_contribution(resolver, debt).await?;

    let periods = DebtSchedule::find()
        .filter(debt_schedule::Column::DebtId.eq(debt.id))
        .all(db)
        .await?;

    let settled = if periods.is_empty() {
        let confirmed = DebtPayment::find()
            .filter(debt_payment::Column::DebtId.eq(debt.id))
            .filter(debt_payment::Column::Status.eq(PaymentStatus::Confirmed))
            .all(db)
            .await?;
        sum(confirmed.iter().map(|p| p.amount))
    } else {
        sum(periods.iter().map(|p| p.paid_amount))
    };

    let candidate = settled + initial;
    let amount_due = debt.amount_due.decimal();
    let amount_paid = settle_amount(amount_due, candidate, config.settlement_tolerance);
    let status = derive_status(debt.status, amount_paid, amount_due, debt.due_date, today);

    Ok(Reconciliation {
        initial_contribution: initial,
        candidate,
        amount_paid,
        status,
    })
}

/// Recomputes and persists a debt's `amount_paid` and `status`.
///
/// The row is only written when one of the two changed.
pub async fn reconcile_debt<C, R>(
    db: &C,
    resolver: &R,
    config: &LedgerConfig,
    debt_id: i64,
    today: NaiveDate,
) -> Result<debt::Model>
where
    C: ConnectionTrait,
    R: OriginResolver,
{
    let debt = Debt::find_by_id(debt_id)
        .one(db)
        .await?
        .ok_or(Error::DebtNotFound { id: debt_id })?;

    let outcome = compute_reconciliation(db, resolver, config, &debt, today).await?;
    debug!(
        debt_id,
        amount_due = %debt.amount_due,
        initial = %outcome.initial_contribution,
        candidate = %outcome.candidate,
        amount_paid = %outcome.amount_paid,
        status = ?outcome.status,
        "Reconciled debt"
    );

    if debt.amount_paid == outcome.amount_paid && debt.status == outcome.status {
        return Ok(debt);
    }

    let mut active: debt::ActiveModel = debt.into();
    active.amount_paid = Set(outcome.amount_paid.into());
    active.status = Set(outcome.status);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}
