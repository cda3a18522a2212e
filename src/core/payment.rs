//! Payment ledger data access - The append-only log of payment attempts.
//!
//! Rows are inserted once and afterwards only their status and confirmation metadata change,
//! exactly once, from `PENDING` to `CONFIRMED` or `REJECTED`. Balance effects are not applied
//! here; the workflow controller does that inside the same transaction.

use crate::{
    entities::{
        DebtPayment, debt_payment,
        debt_payment::{PaymentMethod, PaymentStatus},
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

/// Everything needed to append one payment row.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    /// Debt the payment is made against
    pub debt_id: i64,
    /// Optional earmarked period
    pub schedule_id: Option<i64>,
    /// Payment amount, strictly positive
    pub amount: Decimal,
    /// How the money moves
    pub method: PaymentMethod,
    /// Caller reference; generated when absent
    pub reference_number: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Who recorded the payment
    pub created_by: Option<String>,
}

/// Checks a payment amount against what the debt still owes.
///
/// # Errors
/// * [`Error::InvalidAmount`] for zero or negative amounts
/// * [`Error::ExceedsRemaining`] when the amount is more than `tolerance` above `remaining`
pub fn validate_amount(amount: Decimal, remaining: Decimal, tolerance: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }
    if amount - remaining > tolerance {
        return Err(Error::ExceedsRemaining { amount, remaining });
    }
    Ok(())
}

/// Builds a reference number of the form `PMT-<debt>-<yyyymmddHHMMSS>-<seq>`.
#[must_use]
pub fn generate_reference_number(debt_id: i64, sequence: u64, now: DateTimeUtc) -> String {
    format!("PMT-{debt_id}-{}-{sequence:04}", now.format("%Y%m%d%H%M%S"))
}

/// Retrieves a payment by its unique ID.
pub async fn get_payment_by_id<C>(db: &C, payment_id: i64) -> Result<Option<debt_payment::Model>>
where
    C: ConnectionTrait,
{
    DebtPayment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all payments of a debt, newest first.
pub async fn get_payments_for_debt<C>(db: &C, debt_id: i64) -> Result<Vec<debt_payment::Model>>
where
    C: ConnectionTrait,
{
    DebtPayment::find()
        .filter(debt_payment::Column::DebtId.eq(debt_id))
        .order_by_desc(debt_payment::Column::CreatedAt)
        .order_by_desc(debt_payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Appends a payment row with the given initial status.
///
/// A `CONFIRMED` row is stamped with `confirmed_by` and the confirmation time straight away;
/// the direct-pay shortcut uses that to leave an audit entry.
pub async fn append_payment<C>(
    db: &C,
    record: PaymentRecord,
    status: PaymentStatus,
    confirmed_by: Option<String>,
    now: DateTimeUtc,
) -> Result<debt_payment::Model>
where
    C: ConnectionTrait,
{
    let reference_number = match record.reference_number {
        Some(reference) if !reference.trim().is_empty() => reference.trim().to_string(),
        _ => {
            let existing = DebtPayment::find()
                .filter(debt_payment::Column::DebtId.eq(record.debt_id))
                .count(db)
                .await?;
            generate_reference_number(record.debt_id, existing + 1, now)
        }
    };

    let confirmed = status == PaymentStatus::Confirmed;
    let payment = debt_payment::ActiveModel {
        debt_id: Set(record.debt_id),
        schedule_id: Set(record.schedule_id),
        amount: Set(record.amount.into()),
        payment_date: Set(now),
        method: Set(record.method),
        reference_number: Set(reference_number),
        notes: Set(record.notes),
        created_by: Set(record.created_by),
        status: Set(status),
        confirmed_by: Set(if confirmed { confirmed_by } else { None }),
        confirmed_at: Set(confirmed.then_some(now)),
        rejection_reason: Set(None),
        created_at: Set(now),
        ..Default::default()
    };

    payment.insert(db).await.map_err(Into::into)
}

pub(crate) fn ensure_pending(payment: &debt_payment::Model) -> Result<()> {
    if payment.status == PaymentStatus::Pending {
        Ok(())
    } else {
        Err(Error::invalid_state(format!(
            "payment {} is {:?}, only PENDING payments can be confirmed or rejected",
            payment.id, payment.status
        )))
    }
}

/// Moves a pending payment to `CONFIRMED`.
pub async fn mark_confirmed<C>(
    db: &C,
    payment: debt_payment::Model,
    confirmed_by: String,
    now: DateTimeUtc,
) -> Result<debt_payment::Model>
where
    C: ConnectionTrait,
{
    ensure_pending(&payment)?;
    let mut active: debt_payment::ActiveModel = payment.into();
    active.status = Set(PaymentStatus::Confirmed);
    active.confirmed_by = Set(Some(confirmed_by));
    active.confirmed_at = Set(Some(now));
    active.update(db).await.map_err(Into::into)
}

/// Moves a pending payment to `REJECTED`, recording who rejected it and why.
pub async fn mark_rejected<C>(
    db: &C,
    payment: debt_payment::Model,
    rejected_by: String,
    reason: String,
    now: DateTimeUtc,
) -> Result<debt_payment::Model>
where
    C: ConnectionTrait,
{
    ensure_pending(&payment)?;
    let mut active: debt_payment::ActiveModel = payment.into();
    active.status = Set(PaymentStatus::Rejected);
    active.confirmed_by = Set(Some(rejected_by));
    active.confirmed_at = Set(Some(now));
    active.rejection_reason = Set(Some(reason));
    active.update(db).await.map_err(Into::into)
}
