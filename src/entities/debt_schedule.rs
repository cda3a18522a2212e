//! Debt schedule entity - One amortization period of a debt.
//!
//! Periods are numbered 1..N without gaps. `installment` is `principal + interest`, and the
//! running `start_balance`/`end_balance` chain reaches exactly zero at the last period.

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settlement status of a single period
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    /// Nothing paid yet
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Some but not all of the installment is paid
    #[sea_orm(string_value = "PARTIAL")]
    Partial,
    /// Installment fully covered
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Past its due date and not fully covered
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
}

/// Schedule period database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "debt_schedules")]
pub struct Model {
    /// Unique identifier for the period
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning debt
    pub debt_id: i64,
    /// 1-based position within the debt's schedule
    pub period_number: i32,
    /// Outstanding balance when the period opens
    pub start_balance: Money,
    /// Share of the amount due repaid by this period
    pub principal: Money,
    /// Interest charged this period
    pub interest: Money,
    /// Amount due this period (`principal + interest`)
    pub installment: Money,
    /// Outstanding balance once the period is covered
    pub end_balance: Money,
    /// Day the installment falls due
    pub due_date: Date,
    /// Cumulative amount applied to this period
    pub paid_amount: Money,
    /// Set once the period is fully paid
    pub payment_date: Option<DateTimeUtc>,
    /// Settlement status
    pub status: ScheduleStatus,
}

impl Model {
    /// Fully paid periods are frozen by the re-levelling pass.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status == ScheduleStatus::Paid && self.paid_amount >= self.installment
    }

    /// Amount still needed to cover this period's installment.
    #[must_use]
    pub fn shortfall(&self) -> Decimal {
        (self.installment - self.paid_amount).max(Decimal::ZERO)
    }
}

/// Defines relationships between a schedule period and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each period belongs to one debt and is removed with it
    #[sea_orm(
        belongs_to = "super::debt::Entity",
        from = "Column::DebtId",
        to = "super::debt::Column::Id",
        on_delete = "Cascade"
    )]
    Debt,
    /// Payments earmarked for this period
    #[sea_orm(has_many = "super::debt_payment::Entity")]
    Payments,
}

impl Related<super::debt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debt.def()
    }
}

impl Related<super::debt_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
