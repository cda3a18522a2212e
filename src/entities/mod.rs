//! Entity module - Contains all SeaORM entity definitions for the ledger store.
//! The three tables are debts, their schedule periods, and the payment log.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod debt;
pub mod debt_payment;
pub mod debt_schedule;
pub mod money;

// Re-export specific types to avoid conflicts
pub use debt::{
    Column as DebtColumn, DebtKind, DebtParties, DebtStatus, Entity as Debt, Model as DebtModel,
};
pub use debt_payment::{
    Column as DebtPaymentColumn, Entity as DebtPayment, Model as DebtPaymentModel, PaymentMethod,
    PaymentStatus,
};
pub use debt_schedule::{
    Column as DebtScheduleColumn, Entity as DebtSchedule, Model as DebtScheduleModel,
    ScheduleStatus,
};
pub use money::Money;
