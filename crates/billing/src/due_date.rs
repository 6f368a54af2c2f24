use chrono::{Days, NaiveDate};

use crate::policy::BillingPolicy;

/// Payment due date for a period: three days before it starts.
///
/// Weekends and holidays are not skipped.
pub fn due_date(period_start: NaiveDate) -> NaiveDate {
    due_date_with(&BillingPolicy::default(), period_start)
}

pub fn due_date_with(policy: &BillingPolicy, period_start: NaiveDate) -> NaiveDate {
    period_start
        .checked_sub_days(Days::new(policy.due_date_offset_days()))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn due_three_days_before_period_start() {
        assert_eq!(due_date(date(2024, 4, 1)), date(2024, 3, 29));
        assert_eq!(due_date(date(2024, 1, 2)), date(2023, 12, 30));
        assert_eq!(due_date(date(2024, 3, 1)), date(2024, 2, 27));
    }

    #[test]
    fn weekends_are_not_skipped() {
        // 2024-06-04 is a Tuesday; the due date lands on Saturday.
        assert_eq!(due_date(date(2024, 6, 4)), date(2024, 6, 1));
    }

    #[test]
    fn policy_offset_is_honoured() {
        let policy = BillingPolicy::new(rust_decimal::Decimal::ZERO, 0).unwrap();
        assert_eq!(due_date_with(&policy, date(2024, 4, 1)), date(2024, 4, 1));
    }
}
