//! Billing periods and the period generator.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use leasebook_core::{DomainError, DomainResult, ValueObject};

use crate::cadence::BillingCadence;

/// Identity of a billing period: `(start, end)` compared by calendar date.
pub type PeriodKey = (NaiveDate, NaiveDate);

/// One invoiced interval, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PeriodBounds")]
pub struct BillingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct PeriodBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<PeriodBounds> for BillingPeriod {
    type Error = DomainError;

    fn try_from(bounds: PeriodBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

impl BillingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(format!(
                "billing period ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn key(&self) -> PeriodKey {
        (self.start, self.end)
    }
}

impl core::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

impl ValueObject for BillingPeriod {}

/// Lazy period generator; see [`periods`].
#[derive(Debug, Clone)]
pub struct PeriodIter {
    contract_start: NaiveDate,
    contract_end: NaiveDate,
    months: u32,
    index: u32,
    done: bool,
}

impl PeriodIter {
    /// Start of the `index`-th period, anchored on the contract start so that
    /// a term starting on the 31st keeps returning to the 31st where it exists.
    fn nth_start(&self, index: u32) -> Option<NaiveDate> {
        let offset = self.months.checked_mul(index)?;
        self.contract_start.checked_add_months(Months::new(offset))
    }
}

impl Iterator for PeriodIter {
    type Item = BillingPeriod;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = match self.nth_start(self.index) {
            Some(start) if start < self.contract_end => start,
            _ => {
                self.done = true;
                return None;
            }
        };

        let natural_end = self
            .nth_start(self.index + 1)
            .and_then(|next| next.checked_sub_days(Days::new(1)));
        let end = match natural_end {
            Some(end) if end < self.contract_end => end,
            _ => self.contract_end,
        };

        self.index += 1;
        Some(BillingPeriod { start, end })
    }
}

impl core::iter::FusedIterator for PeriodIter {}

/// Lazily split `[contract_start, contract_end]` into billing periods.
///
/// Periods are contiguous and earliest-first; the last one is cut short at
/// `contract_end`. A start on or after `contract_end` ends the sequence, so an
/// empty or inverted term yields nothing.
pub fn periods(contract_start: NaiveDate, contract_end: NaiveDate, cadence: &BillingCadence) -> PeriodIter {
    PeriodIter {
        contract_start,
        contract_end,
        months: cadence.months(),
        index: 0,
        done: false,
    }
}

/// Eager form of [`periods`].
pub fn generate_periods(
    contract_start: NaiveDate,
    contract_end: NaiveDate,
    cadence: &BillingCadence,
) -> Vec<BillingPeriod> {
    periods(contract_start, contract_end, cadence).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_calendar_year_yields_twelve_months() {
        let periods = generate_periods(date(2024, 1, 1), date(2024, 12, 31), &BillingCadence::Monthly);

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0], BillingPeriod::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap());
        assert_eq!(periods[1].end(), date(2024, 2, 29));
        assert_eq!(periods[11].start(), date(2024, 12, 1));
        assert_eq!(periods[11].end(), date(2024, 12, 31));
    }

    #[test]
    fn quarterly_year_yields_four_quarters() {
        let periods = generate_periods(date(2024, 1, 1), date(2024, 12, 31), &BillingCadence::Quarterly);
        let keys: Vec<_> = periods.iter().map(BillingPeriod::key).collect();
        assert_eq!(
            keys,
            vec![
                (date(2024, 1, 1), date(2024, 3, 31)),
                (date(2024, 4, 1), date(2024, 6, 30)),
                (date(2024, 7, 1), date(2024, 9, 30)),
                (date(2024, 10, 1), date(2024, 12, 31)),
            ]
        );
    }

    #[test]
    fn last_period_is_capped_at_contract_end() {
        let periods = generate_periods(date(2024, 1, 15), date(2024, 5, 10), &BillingCadence::Quarterly);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].key(), (date(2024, 1, 15), date(2024, 4, 14)));
        assert_eq!(periods[1].key(), (date(2024, 4, 15), date(2024, 5, 10)));
    }

    #[test]
    fn start_on_contract_end_is_not_billed() {
        // The 1 Feb start equals the contract end, so only January is produced.
        let periods = generate_periods(date(2024, 1, 1), date(2024, 2, 1), &BillingCadence::Monthly);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].key(), (date(2024, 1, 1), date(2024, 1, 31)));
    }

    #[test]
    fn empty_or_inverted_term_yields_nothing() {
        let day = date(2024, 6, 1);
        assert!(generate_periods(day, day, &BillingCadence::Monthly).is_empty());
        assert!(generate_periods(day, date(2024, 5, 1), &BillingCadence::Annual).is_empty());
    }

    #[test]
    fn month_end_start_does_not_drift() {
        let periods = generate_periods(date(2024, 1, 31), date(2024, 5, 30), &BillingCadence::Monthly);
        let starts: Vec<_> = periods.iter().map(BillingPeriod::start).collect();
        assert_eq!(
            starts,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
        );
        assert_eq!(periods[0].end(), date(2024, 2, 28));
        assert_eq!(periods[3].end(), date(2024, 5, 30));
    }

    #[test]
    fn quarterly_month_end_start_is_anchored_on_contract_start() {
        // Each start is contract start + 3n months, clamped to the month end.
        // Stepping from the previous start would give 30 Jul and 30 Oct instead.
        let periods = generate_periods(date(2024, 1, 31), date(2024, 12, 31), &BillingCadence::Quarterly);
        let keys: Vec<_> = periods.iter().map(BillingPeriod::key).collect();
        assert_eq!(
            keys,
            vec![
                (date(2024, 1, 31), date(2024, 4, 29)),
                (date(2024, 4, 30), date(2024, 7, 30)),
                (date(2024, 7, 31), date(2024, 10, 30)),
                (date(2024, 10, 31), date(2024, 12, 31)),
            ]
        );
    }

    #[test]
    fn custom_cadence_uses_its_month_count() {
        let every_two = BillingCadence::custom("bi-monthly", 2).unwrap();
        let periods = generate_periods(date(2024, 1, 1), date(2024, 6, 30), &every_two);
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[2].key(), (date(2024, 5, 1), date(2024, 6, 30)));
    }

    #[test]
    fn iterator_is_restartable() {
        let iter = periods(date(2023, 3, 1), date(2025, 2, 28), &BillingCadence::SemiAnnual);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn period_rejects_inverted_bounds() {
        assert!(matches!(
            BillingPeriod::new(date(2024, 2, 1), date(2024, 1, 1)),
            Err(DomainError::Validation(_))
        ));
        let single_day = BillingPeriod::new(date(2024, 2, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(single_day.key(), (date(2024, 2, 1), date(2024, 2, 1)));
    }

    #[test]
    fn deserialized_period_is_checked() {
        let period: BillingPeriod =
            serde_json::from_str(r#"{"start":"2024-04-01","end":"2024-06-30"}"#).unwrap();
        assert_eq!(period.key(), (date(2024, 4, 1), date(2024, 6, 30)));

        let err = serde_json::from_str::<BillingPeriod>(r#"{"start":"2024-06-30","end":"2024-04-01"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("before it starts"));
    }

    fn cadence_strategy() -> impl Strategy<Value = BillingCadence> {
        prop_oneof![
            Just(BillingCadence::Monthly),
            Just(BillingCadence::Quarterly),
            Just(BillingCadence::SemiAnnual),
            Just(BillingCadence::Annual),
            (1u32..=24).prop_map(|m| BillingCadence::custom("custom", m).unwrap()),
        ]
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2000i32..2040, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .or_else(|| NaiveDate::from_ymd_opt(y, m, 28))
                .unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: periods tile the term without gaps or overlaps and never
        /// run past the contract end.
        #[test]
        fn periods_are_contiguous_and_capped(
            start in date_strategy(),
            span_days in 0i64..3_000,
            cadence in cadence_strategy(),
        ) {
            let end = start + chrono::Duration::days(span_days);
            let periods = generate_periods(start, end, &cadence);

            if end <= start {
                prop_assert!(periods.is_empty());
            } else {
                prop_assert_eq!(periods[0].start(), start);
            }

            for p in &periods {
                prop_assert!(p.start() <= p.end());
                prop_assert!(p.end() <= end);
                prop_assert!(p.start() < end);
            }
            for pair in periods.windows(2) {
                prop_assert_eq!(pair[1].start(), pair[0].end() + Days::new(1));
            }
        }
    }
}
