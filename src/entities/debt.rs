//! Debt entity - One obligation of a debtor toward a creditor.
//!
//! `amount_paid` is a cached value owned by the reconciler; nothing else writes it.
//! The two parties are stored as `debtor_id`/`creditor_id` and interpreted through `kind`,
//! see [`DebtParties`].

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which pair of parties a debt binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtKind {
    /// A dealer owes a manufacturer
    #[sea_orm(string_value = "DEALER_DEBT")]
    DealerDebt,
    /// A customer owes a dealer
    #[sea_orm(string_value = "CUSTOMER_DEBT")]
    CustomerDebt,
}

/// Debt lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtStatus {
    #[sea_orm(string_value = "ACTIVE")]
    #[allow(missing_docs)]
    Active,
    #[sea_orm(string_value = "PAID")]
    #[allow(missing_docs)]
    Paid,
    /// Past its due date and not settled; recomputed on every reconciliation
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    /// Explicitly closed; reconciliation never leaves this state
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl DebtStatus {
    /// Whether payments may still be recorded against a debt in this status.
    #[must_use]
    pub const fn accepts_payments(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// The two parties bound by a debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtParties {
    /// Dealer owes manufacturer
    Dealer {
        /// Paying dealer
        dealer_id: i64,
        /// Receiving manufacturer
        manufacturer_id: i64,
    },
    /// Customer owes dealer
    Customer {
        /// Paying customer
        customer_id: i64,
        /// Receiving dealer
        dealer_id: i64,
    },
}

impl DebtParties {
    /// Splits the parties into their stored `(kind, debtor_id, creditor_id)` form.
    #[must_use]
    pub const fn into_columns(self) -> (DebtKind, i64, i64) {
        match self {
            Self::Dealer {
                dealer_id,
                manufacturer_id,
            } => (DebtKind::DealerDebt, dealer_id, manufacturer_id),
            Self::Customer {
                customer_id,
                dealer_id,
            } => (DebtKind::CustomerDebt, customer_id, dealer_id),
        }
    }
}

/// Debt database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    /// Unique identifier for the debt
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Which parties `debtor_id` and `creditor_id` refer to
    pub kind: DebtKind,
    /// Paying party
    pub debtor_id: i64,
    /// Receiving party
    pub creditor_id: i64,
    /// Total owed, fixed at creation
    pub amount_due: Money,
    /// Reconciled settled amount (cached, recomputed on every mutation and read)
    pub amount_paid: Money,
    /// Interest rate in percent; the schedule generator applies zero interest
    pub interest_rate: Money,
    /// Day the obligation starts; schedule due dates count months from here
    pub start_date: Date,
    /// Final due date, if any
    pub due_date: Option<Date>,
    /// Lifecycle status derived by the reconciler
    pub status: DebtStatus,
    /// Id of the originating external transaction (e.g. the order a deposit was paid on)
    pub origin_reference: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Confirmed money that no schedule period could absorb, awaiting manual correction
    pub unapplied_credit: Money,
    /// When the debt was created
    pub created_at: DateTimeUtc,
    /// When the debt row was last written
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Amount still owed according to the cached settled amount.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.amount_due - self.amount_paid
    }

    /// Rebuilds the typed parties from the stored columns.
    #[must_use]
    pub const fn parties(&self) -> DebtParties {
        match self.kind {
            DebtKind::DealerDebt => DebtParties::Dealer {
                dealer_id: self.debtor_id,
                manufacturer_id: self.creditor_id,
            },
            DebtKind::CustomerDebt => DebtParties::Customer {
                customer_id: self.debtor_id,
                dealer_id: self.creditor_id,
            },
        }
    }
}

/// Defines relationships between Debt and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One debt owns many schedule periods
    #[sea_orm(has_many = "super::debt_schedule::Entity")]
    Schedules,
    /// One debt is referenced by many payments
    #[sea_orm(has_many = "super::debt_payment::Entity")]
    Payments,
}

impl Related<super::debt_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedules.def()
    }
}

impl Related<super::debt_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parties_round_trip_through_columns() {
        let parties = DebtParties::Customer {
            customer_id: 7,
            dealer_id: 3,
        };
        let (kind, debtor, creditor) = parties.into_columns();
        assert_eq!(kind, DebtKind::CustomerDebt);
        assert_eq!((debtor, creditor), (7, 3));

        let dealer = DebtParties::Dealer {
            dealer_id: 3,
            manufacturer_id: 1,
        };
        assert_eq!(dealer.into_columns(), (DebtKind::DealerDebt, 3, 1));
    }

    #[test]
    fn test_cancelled_rejects_payments() {
        assert!(DebtStatus::Active.accepts_payments());
        assert!(DebtStatus::Overdue.accepts_payments());
        assert!(!DebtStatus::Cancelled.accepts_payments());
    }
}
