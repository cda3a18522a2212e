//! Debt payment entity - The append-only log of payment attempts.
//!
//! A payment starts `PENDING` and moves exactly once to `CONFIRMED` or `REJECTED`.
//! Only confirmed payments ever count toward a debt's settled amount.

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    #[allow(missing_docs)]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    #[allow(missing_docs)]
    Confirmed,
    #[sea_orm(string_value = "REJECTED")]
    #[allow(missing_docs)]
    Rejected,
}

/// How the money was (or will be) moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "CASH")]
    #[allow(missing_docs)]
    Cash,
    #[sea_orm(string_value = "BANK_TRANSFER")]
    #[allow(missing_docs)]
    BankTransfer,
    #[sea_orm(string_value = "CREDIT_CARD")]
    #[allow(missing_docs)]
    CreditCard,
    #[sea_orm(string_value = "CHEQUE")]
    #[allow(missing_docs)]
    Cheque,
    #[sea_orm(string_value = "OTHER")]
    #[allow(missing_docs)]
    Other,
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "debt_payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Debt this payment is made against
    pub debt_id: i64,
    /// Optional schedule period the payment is earmarked for
    pub schedule_id: Option<i64>,
    /// Amount paid
    pub amount: Money,
    /// When the payment was recorded
    pub payment_date: DateTimeUtc,
    /// How the money was moved
    pub method: PaymentMethod,
    /// Caller-supplied or generated reference, unique per payment
    pub reference_number: String,
    /// Free-text notes
    pub notes: Option<String>,
    /// Who recorded the payment
    pub created_by: Option<String>,
    /// Confirmation state
    pub status: PaymentStatus,
    /// Who confirmed or rejected the payment
    pub confirmed_by: Option<String>,
    /// When the payment was confirmed or rejected
    pub confirmed_at: Option<DateTimeUtc>,
    /// Set only on rejection
    pub rejection_reason: Option<String>,
    /// When the row was inserted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between a payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one debt and is removed with it
    #[sea_orm(
        belongs_to = "super::debt::Entity",
        from = "Column::DebtId",
        to = "super::debt::Column::Id",
        on_delete = "Cascade"
    )]
    Debt,
    /// Optional earmarked period
    #[sea_orm(
        belongs_to = "super::debt_schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::debt_schedule::Column::Id",
        on_delete = "SetNull"
    )]
    Schedule,
}

impl Related<super::debt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debt.def()
    }
}

impl Related<super::debt_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
