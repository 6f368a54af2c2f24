//! Net / VAT / total derivation for a single billing period.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use leasebook_core::ValueObject;

use crate::policy::BillingPolicy;

/// Amounts printed on one invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmountBreakdown {
    pub net: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

impl AmountBreakdown {
    /// `net + vat == total` to within one cent.
    pub fn is_balanced(&self) -> bool {
        (self.net + self.vat - self.total).abs() <= Decimal::new(1, 2)
    }

    pub fn is_non_negative(&self) -> bool {
        self.net >= Decimal::ZERO && self.vat >= Decimal::ZERO && self.total >= Decimal::ZERO
    }
}

impl ValueObject for AmountBreakdown {}

/// Commercial rounding to cents.
fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Resolve amounts with the standard 12% VAT.
///
/// With `vat_inclusive` the rate is the total and net is backed out of it;
/// otherwise the rate is the net and VAT is added on top. The given rate is
/// returned untouched; only the derived figures are rounded.
///
/// Negative rates are not rejected here.
///
/// # Panics
///
/// If the derived figures do not fit in a `Decimal`, which only happens for
/// rates near `Decimal::MAX`. Use [`checked_resolve_amounts_with`] for input
/// that has not been bounded by a contract.
pub fn resolve_amounts(rate: Decimal, vat_inclusive: bool) -> AmountBreakdown {
    resolve_amounts_with(&BillingPolicy::default(), rate, vat_inclusive)
}

/// [`resolve_amounts`] under a custom policy. Panics under the same
/// conditions.
pub fn resolve_amounts_with(policy: &BillingPolicy, rate: Decimal, vat_inclusive: bool) -> AmountBreakdown {
    match checked_resolve_amounts_with(policy, rate, vat_inclusive) {
        Some(amounts) => amounts,
        None => panic!("amounts for rate {rate} overflow Decimal"),
    }
}

/// Like [`resolve_amounts_with`], returning `None` on overflow.
pub fn checked_resolve_amounts_with(
    policy: &BillingPolicy,
    rate: Decimal,
    vat_inclusive: bool,
) -> Option<AmountBreakdown> {
    // A validated policy keeps the divisor at or above one.
    let divisor = Decimal::ONE.checked_add(policy.vat_rate())?;

    if vat_inclusive {
        let total = rate;
        let net = round_half_up(total.checked_div(divisor)?);
        let vat = round_half_up(total.checked_sub(net)?);
        Some(AmountBreakdown { net, vat, total })
    } else {
        let net = rate;
        let vat = round_half_up(net.checked_mul(policy.vat_rate())?);
        let total = round_half_up(net.checked_add(vat)?);
        Some(AmountBreakdown { net, vat, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn inclusive_rate_backs_out_net() {
        let amounts = resolve_amounts(dec!(11200), true);
        assert_eq!(amounts.net, dec!(10000.00));
        assert_eq!(amounts.vat, dec!(1200.00));
        assert_eq!(amounts.total, dec!(11200.00));
    }

    #[test]
    fn exclusive_rate_adds_vat() {
        let amounts = resolve_amounts(dec!(10000), false);
        assert_eq!(amounts.net, dec!(10000.00));
        assert_eq!(amounts.vat, dec!(1200.00));
        assert_eq!(amounts.total, dec!(11200.00));
    }

    #[test]
    fn derived_figures_round_half_up() {
        // 100 / 1.12 = 89.2857... -> 89.29, VAT takes the remainder.
        let inclusive = resolve_amounts(dec!(100), true);
        assert_eq!(inclusive.net, dec!(89.29));
        assert_eq!(inclusive.vat, dec!(10.71));
        assert_eq!(inclusive.total, dec!(100));

        // 0.375 * 0.12 = 0.045 -> 0.05 (banker's rounding would give 0.04).
        let exclusive = resolve_amounts(dec!(0.375), false);
        assert_eq!(exclusive.vat, dec!(0.05));
        assert_eq!(exclusive.total, dec!(0.43));
    }

    #[test]
    fn zero_rate_is_all_zeroes() {
        let amounts = resolve_amounts(Decimal::ZERO, false);
        assert!(amounts.net.is_zero() && amounts.vat.is_zero() && amounts.total.is_zero());
        assert!(amounts.is_non_negative());
    }

    #[test]
    fn custom_policy_changes_vat() {
        let policy = BillingPolicy::new(dec!(0.20), 3).unwrap();
        let amounts = resolve_amounts_with(&policy, dec!(100), false);
        assert_eq!(amounts.vat, dec!(20.00));
        assert_eq!(amounts.total, dec!(120.00));
    }

    #[test]
    fn overflowing_rate_resolves_to_none() {
        let policy = BillingPolicy::default();
        assert!(checked_resolve_amounts_with(&policy, Decimal::MAX, false).is_none());

        // Backing net out of a total never grows it.
        let inclusive = checked_resolve_amounts_with(&policy, Decimal::MAX, true).unwrap();
        assert_eq!(inclusive.total, Decimal::MAX);
    }

    #[test]
    #[should_panic(expected = "overflow")]
    fn unchecked_resolver_panics_on_overflow() {
        resolve_amounts(Decimal::MAX, false);
    }

    fn money() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: the given rate survives unchanged and the breakdown
        /// balances to within a cent.
        #[test]
        fn given_value_is_preserved(rate in money()) {
            let inclusive = resolve_amounts(rate, true);
            prop_assert_eq!(inclusive.total, rate);
            prop_assert!(inclusive.is_balanced());
            prop_assert!(inclusive.is_non_negative());

            let exclusive = resolve_amounts(rate, false);
            prop_assert_eq!(exclusive.net, rate);
            prop_assert!(exclusive.is_balanced());
            prop_assert!(exclusive.is_non_negative());
        }
    }
}
