//! Error types for the ledger engine.
//!
//! Every failure surfaced to callers is a variant of [`Error`]. [`Error::kind`] folds the
//! variants into the coarse taxonomy a transport layer needs (not found, invalid state,
//! validation, internal). Reconciliation anomalies are not errors: they are logged and the
//! operation still succeeds.

use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse error classification used by callers to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown debt, schedule period, or payment id
    NotFound,
    /// The operation is illegal for the record's current lifecycle state
    InvalidState,
    /// The request itself is malformed (bad amount, nothing to schedule, ...)
    Validation,
    /// Storage or configuration failure
    Internal,
}

/// Unified error type for all ledger operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No debt exists with the given id
    #[error("Debt not found: {id}")]
    DebtNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// No schedule period exists with the given id
    #[error("Schedule period not found: {id}")]
    ScheduleNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// No payment exists with the given id
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// The record is not in a state that allows the requested transition
    #[error("Invalid state: {message}")]
    InvalidState {
        /// What was attempted and why it is not allowed
        message: String,
    },

    /// Amounts must be strictly positive
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// The payment would settle more than the debt still owes
    #[error("Payment of {amount} exceeds remaining balance of {remaining}")]
    ExceedsRemaining {
        /// The requested payment amount
        amount: Decimal,
        /// The debt's remaining balance at validation time
        remaining: Decimal,
    },

    /// A schedule can only be generated for a positive remaining amount
    #[error("Nothing to schedule: remaining amount is {remaining}")]
    NothingToSchedule {
        /// The non-positive remaining amount
        remaining: Decimal,
    },

    /// A schedule needs at least one period
    #[error("Invalid period count: {count}")]
    InvalidPeriodCount {
        /// The rejected period count
        count: u32,
    },

    #[error("Configuration error: {message}")]
    #[allow(missing_docs)]
    Config { message: String },

    #[error("Database error: {0}")]
    #[allow(missing_docs)]
    Database(#[from] sea_orm::DbErr),
}

impl Error {
    /// Classifies this error for the caller.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DebtNotFound { .. }
            | Self::ScheduleNotFound { .. }
            | Self::PaymentNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::InvalidAmount { .. }
            | Self::ExceedsRemaining { .. }
            | Self::NothingToSchedule { .. }
            | Self::InvalidPeriodCount { .. } => ErrorKind::Validation,
            Self::Config { .. } | Self::Database(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
