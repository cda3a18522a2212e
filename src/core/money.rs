//! Currency arithmetic shared by the schedule, redistribution and reconciliation code.
//!
//! Amounts are `Decimal` with two places of currency precision. Rounding is half-up
//! (midpoint away from zero), which is what installment splitting expects.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for currency amounts
pub const CURRENCY_SCALE: u32 = 2;

/// Rounds to currency precision, half-up.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Splits `total` into `parts` shares rounded to currency precision.
///
/// Every share but the last is the rounded flat share (never more than what is left);
/// the last share takes whatever remains so the shares sum exactly to `total`.
/// Returns an empty vector for zero parts.
#[must_use]
pub fn split_evenly(total: Decimal, parts: usize) -> Vec<Decimal> {
    if parts == 0 {
        return Vec::new();
    }

    let flat = round_currency(total / Decimal::from(parts));
    let mut left = total;
    let mut shares = Vec::with_capacity(parts);
    for index in 0..parts {
        let share = if index + 1 == parts {
            left
        } else {
            flat.min(left).max(Decimal::ZERO)
        };
        left -= share;
        shares.push(share);
    }
    shares
}

/// Sums an iterator of amounts (plain decimals or stored [`Money`] columns).
///
/// [`Money`]: crate::entities::Money
pub fn sum<I, T>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = T>,
    T: Into<Decimal>,
{
    amounts.into_iter().map(Into::<Decimal>::into).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_currency(dec!(1.005)), dec!(1.01));
        assert_eq!(round_currency(dec!(1.004)), dec!(1.00));
        assert_eq!(round_currency(dec!(833333.333)), dec!(833333.33));
    }

    #[test]
    fn test_split_evenly_last_share_absorbs_remainder() {
        let shares = split_evenly(dec!(10000000), 3);
        assert_eq!(shares, vec![dec!(3333333.33), dec!(3333333.33), dec!(3333333.34)]);
        assert_eq!(sum(shares), dec!(10000000));
    }

    #[test]
    fn test_split_evenly_when_flat_rounds_up() {
        // 0.02 / 3 rounds to 0.01, leaving nothing for the last share
        let shares = split_evenly(dec!(0.02), 3);
        assert_eq!(shares, vec![dec!(0.01), dec!(0.01), dec!(0.00)]);

        // never hands out more than is left
        let shares = split_evenly(dec!(0.05), 12);
        assert_eq!(sum(shares.iter().copied()), dec!(0.05));
        assert!(shares.iter().all(|s| !s.is_sign_negative()));
    }

    #[test]
    fn test_split_evenly_zero_parts() {
        assert!(split_evenly(dec!(100), 0).is_empty());
    }
}
