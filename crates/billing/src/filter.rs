use std::collections::HashSet;

use chrono::NaiveDate;

use crate::period::{BillingPeriod, PeriodKey};

/// Keep only the periods that still need an invoice.
///
/// A period is dropped when its `(start, end)` key is already in `existing`,
/// or when `include_future` is false and it starts after `up_to`. Input order
/// is preserved.
pub fn filter_new_periods(
    all_periods: &[BillingPeriod],
    existing: &HashSet<PeriodKey>,
    up_to: NaiveDate,
    include_future: bool,
) -> Vec<BillingPeriod> {
    all_periods
        .iter()
        .filter(|period| !existing.contains(&period.key()))
        .filter(|period| include_future || period.start() <= up_to)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::BillingCadence;
    use crate::period::generate_periods;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quarters_2024() -> Vec<BillingPeriod> {
        generate_periods(date(2024, 1, 1), date(2024, 12, 31), &BillingCadence::Quarterly)
    }

    #[test]
    fn already_invoiced_quarters_are_skipped() {
        let all = quarters_2024();
        let existing: HashSet<PeriodKey> = all[..2].iter().map(BillingPeriod::key).collect();

        let fresh = filter_new_periods(&all, &existing, date(2024, 1, 1), true);
        assert_eq!(fresh, all[2..].to_vec());
    }

    #[test]
    fn future_periods_wait_unless_requested() {
        let all = quarters_2024();
        let none = HashSet::new();

        let due = filter_new_periods(&all, &none, date(2024, 4, 1), false);
        assert_eq!(due.len(), 2);
        assert_eq!(due[1].start(), date(2024, 4, 1));

        let everything = filter_new_periods(&all, &none, date(2024, 4, 1), true);
        assert_eq!(everything, all);
    }

    #[test]
    fn key_match_is_exact() {
        let all = quarters_2024();
        // Same start, different end: not a duplicate.
        let existing: HashSet<PeriodKey> = [(date(2024, 1, 1), date(2024, 1, 31))].into_iter().collect();
        assert_eq!(filter_new_periods(&all, &existing, date(2024, 12, 31), false).len(), 4);
    }

    proptest! {
        /// Property: filtering twice with the same inputs changes nothing.
        #[test]
        fn filter_is_idempotent(
            mask in prop::collection::vec(any::<bool>(), 12),
            up_to_month in 1u32..=12,
            include_future in any::<bool>(),
        ) {
            let all = generate_periods(date(2024, 1, 1), date(2024, 12, 31), &BillingCadence::Monthly);
            let existing: HashSet<PeriodKey> = all
                .iter()
                .zip(&mask)
                .filter(|(_, billed)| **billed)
                .map(|(p, _)| p.key())
                .collect();
            let up_to = date(2024, up_to_month, 1);

            let once = filter_new_periods(&all, &existing, up_to, include_future);
            let twice = filter_new_periods(&once, &existing, up_to, include_future);
            prop_assert_eq!(&once, &twice);

            for pair in once.windows(2) {
                prop_assert!(pair[0].start() < pair[1].start());
            }
        }
    }
}
