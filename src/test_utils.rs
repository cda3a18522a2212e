//! Shared test utilities for the ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test debts and payments with sensible defaults.

use crate::{
    config::LedgerConfig,
    core::{
        payment::PaymentRecord,
        reconcile::{NoOrigin, OriginResolver},
        workflow::{DebtWorkflow, NewDebt},
    },
    entities::{
        Money, debt,
        debt::{DebtKind, DebtParties, DebtStatus},
        debt_payment,
        debt_payment::{PaymentMethod, PaymentStatus},
    },
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Workflow over a fresh in-memory database with default settings and no origins.
pub async fn test_workflow() -> Result<DebtWorkflow> {
    test_workflow_with(NoOrigin).await
}

/// Workflow over a fresh in-memory database resolving origins with `resolver`.
pub async fn test_workflow_with<R: OriginResolver>(resolver: R) -> Result<DebtWorkflow<R>> {
    let db = setup_test_db().await?;
    Ok(DebtWorkflow::new(db, LedgerConfig::default(), resolver))
}

/// A dealer debt input starting today.
///
/// # Defaults
/// * parties: dealer 1 owes manufacturer 2
/// * `interest_rate`: 0
/// * no due date, origin reference or notes
/// * `period_count`: the configured default
pub fn test_new_debt(amount_due: Decimal) -> NewDebt {
    NewDebt {
        parties: DebtParties::Dealer {
            dealer_id: 1,
            manufacturer_id: 2,
        },
        amount_due,
        interest_rate: Decimal::ZERO,
        start_date: today(),
        due_date: None,
        origin_reference: None,
        notes: None,
        period_count: None,
    }
}

/// Inserts a debt row directly, without schedule or reconciliation.
pub async fn insert_bare_debt(
    db: &DatabaseConnection,
    amount_due: Decimal,
    origin_reference: Option<&str>,
) -> Result<debt::Model> {
    let now = Utc::now();
    let debt = debt::ActiveModel {
        kind: Set(DebtKind::DealerDebt),
        debtor_id: Set(1),
        creditor_id: Set(2),
        amount_due: Set(amount_due.into()),
        amount_paid: Set(Money::ZERO),
        interest_rate: Set(Money::ZERO),
        start_date: Set(today()),
        due_date: Set(None),
        status: Set(DebtStatus::Active),
        origin_reference: Set(origin_reference.map(str::to_string)),
        notes: Set(None),
        unapplied_credit: Set(Money::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(debt.insert(db).await?)
}

/// Inserts a payment row directly with the given status.
pub async fn insert_raw_payment(
    db: &DatabaseConnection,
    debt_id: i64,
    amount: Decimal,
    status: PaymentStatus,
) -> Result<debt_payment::Model> {
    let now = Utc::now();
    let payment = debt_payment::ActiveModel {
        debt_id: Set(debt_id),
        schedule_id: Set(None),
        amount: Set(amount.into()),
        payment_date: Set(now),
        method: Set(PaymentMethod::BankTransfer),
        reference_number: Set(format!("RAW-{debt_id}-{amount}")),
        notes: Set(None),
        created_by: Set(Some("test_user".to_string())),
        status: Set(status),
        confirmed_by: Set(None),
        confirmed_at: Set(None),
        rejection_reason: Set(None),
        created_at: Set(now),
        ..Default::default()
    };
    Ok(payment.insert(db).await?)
}

/// A bank transfer payment record with no schedule binding or reference.
pub fn test_record(debt_id: i64, amount: Decimal) -> PaymentRecord {
    PaymentRecord {
        debt_id,
        schedule_id: None,
        amount,
        method: PaymentMethod::BankTransfer,
        reference_number: None,
        notes: None,
        created_by: Some("test_user".to_string()),
    }
}
