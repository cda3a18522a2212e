//! Money column type.
//!
//! SQLite has no exact decimal type: a `Decimal` column lands in a REAL and comes back
//! through `f64`, which silently changes amounts past 15 significant digits. [`Money`]
//! stores the decimal's canonical text instead and parses it back exactly.

use rust_decimal::Decimal;
use sea_orm::{
    ColIdx, DbErr, QueryResult, TryGetError, TryGetable, Value,
    sea_query::{ArrayType, ColumnType, Nullable, ValueType, ValueTypeErr},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, AddAssign, Deref, Sub, SubAssign},
    str::FromStr,
};

/// A decimal column value (currency amount or rate) persisted as exact text.
///
/// Dereferences to the inner [`Decimal`]; arithmetic with `Money` or `Decimal` operands
/// yields a plain `Decimal`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The amount as a plain decimal.
    #[must_use]
    pub const fn decimal(self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Deref for Money {
    type Target = Decimal;

    fn deref(&self) -> &Decimal {
        &self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl PartialEq<Decimal> for Money {
    fn eq(&self, other: &Decimal) -> bool {
        self.0 == *other
    }
}

impl PartialEq<Money> for Decimal {
    fn eq(&self, other: &Money) -> bool {
        *self == other.0
    }
}

impl PartialOrd<Decimal> for Money {
    fn partial_cmp(&self, other: &Decimal) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl<T: Into<Decimal>> Add<T> for Money {
    type Output = Decimal;

    fn add(self, rhs: T) -> Decimal {
        self.0 + rhs.into()
    }
}

impl<T: Into<Decimal>> Sub<T> for Money {
    type Output = Decimal;

    fn sub(self, rhs: T) -> Decimal {
        self.0 - rhs.into()
    }
}

impl Add<Money> for Decimal {
    type Output = Self;

    fn add(self, rhs: Money) -> Self {
        self + rhs.0
    }
}

impl Sub<Money> for Decimal {
    type Output = Self;

    fn sub(self, rhs: Money) -> Self {
        self - rhs.0
    }
}

impl<T: Into<Decimal>> AddAssign<T> for Money {
    fn add_assign(&mut self, rhs: T) {
        self.0 += rhs.into();
    }
}

impl<T: Into<Decimal>> SubAssign<T> for Money {
    fn sub_assign(&mut self, rhs: T) {
        self.0 -= rhs.into();
    }
}

impl From<Money> for Value {
    fn from(money: Money) -> Self {
        Self::String(Some(Box::new(money.0.to_string())))
    }
}

impl TryGetable for Money {
    fn try_get_by<I: ColIdx>(res: &QueryResult, idx: I) -> Result<Self, TryGetError> {
        let text = String::try_get_by(res, idx)?;
        Decimal::from_str(&text).map(Self).map_err(|e| {
            TryGetError::DbErr(DbErr::Type(format!("invalid money value {text:?}: {e}")))
        })
    }
}

impl ValueType for Money {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        let text = <String as ValueType>::try_from(v)?;
        Decimal::from_str(&text).map(Self).map_err(|_| ValueTypeErr)
    }

    fn type_name() -> String {
        "Money".to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::Text
    }
}

impl Nullable for Money {
    fn null() -> Value {
        Value::String(None)
    }
}
