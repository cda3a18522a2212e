/// Decimal helpers for currency rounding and even splits
pub mod money;
/// Payment ledger: append, confirm and reject payment rows
pub mod payment;
/// Balance reconciliation and initial contribution lookup
pub mod reconcile;
/// Overpayment carry-forward across schedule periods
pub mod redistribute;
/// Debt statements and progress figures
pub mod report;
/// Schedule planning, persistence and re-leveling
pub mod schedule;
/// Debt workflow controller
pub mod workflow;

pub use reconcile::{FixedOrigins, NoOrigin, OriginResolver};
pub use workflow::{DebtDetails, DebtWorkflow, DirectPayment, NewDebt, NewPayment, SweepSummary};
