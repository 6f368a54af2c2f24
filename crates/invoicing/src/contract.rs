use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leasebook_billing::{
    BillingCadence, BillingPeriod, BillingPolicy, checked_resolve_amounts_with, generate_periods,
};
use leasebook_core::{AggregateId, DomainError, DomainResult};

use crate::client::ClientCode;

/// Lease contract identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub AggregateId);

impl ContractId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ContractId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Billing terms of a lease, as needed for invoice generation.
///
/// Construction is the validation boundary for the calculator: the rate is
/// known to be non-negative and small enough for its amounts to resolve, and
/// the term is not inverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaseContract {
    id: ContractId,
    client_code: ClientCode,
    start: NaiveDate,
    end: NaiveDate,
    cadence: BillingCadence,
    rate: Decimal,
    vat_inclusive: bool,
}

impl LeaseContract {
    pub fn new(
        id: ContractId,
        client_code: ClientCode,
        start: NaiveDate,
        end: NaiveDate,
        cadence: BillingCadence,
        rate: Decimal,
        vat_inclusive: bool,
    ) -> DomainResult<Self> {
        if rate < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "contract rate must not be negative (got {rate})"
            )));
        }
        if checked_resolve_amounts_with(&BillingPolicy::default(), rate, vat_inclusive).is_none() {
            return Err(DomainError::validation(format!(
                "contract rate {rate} is too large to add VAT to"
            )));
        }
        if end < start {
            return Err(DomainError::validation(format!(
                "contract ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self {
            id,
            client_code,
            start,
            end,
            cadence,
            rate,
            vat_inclusive,
        })
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn client_code(&self) -> &ClientCode {
        &self.client_code
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn cadence(&self) -> &BillingCadence {
        &self.cadence
    }

    /// Per-period rate; net or gross depending on [`Self::vat_inclusive`].
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn vat_inclusive(&self) -> bool {
        self.vat_inclusive
    }

    /// Every billing period of the contract term, earliest first.
    pub fn billing_periods(&self) -> Vec<BillingPeriod> {
        generate_periods(self.start, self.end, &self.cadence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(rate: Decimal, start: NaiveDate, end: NaiveDate) -> DomainResult<LeaseContract> {
        LeaseContract::new(
            ContractId::new(AggregateId::new()),
            ClientCode::new("ACME").unwrap(),
            start,
            end,
            BillingCadence::Quarterly,
            rate,
            false,
        )
    }

    #[test]
    fn negative_rate_is_rejected() {
        let err = contract(dec!(-1), date(2024, 1, 1), date(2024, 12, 31)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("negative")));
    }

    #[test]
    fn rate_without_room_for_vat_is_rejected() {
        let err = contract(Decimal::MAX, date(2024, 1, 1), date(2024, 12, 31)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("too large")));

        // Just under the bound the contract is accepted and bills without overflow.
        let largest = (Decimal::MAX / dec!(1.13)).trunc();
        let c = contract(largest, date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let amounts = leasebook_billing::resolve_amounts(c.rate(), c.vat_inclusive());
        assert_eq!(amounts.net, largest);
        assert!(amounts.total > largest);

        // A VAT-inclusive rate is the total already, so any size fits.
        let gross = LeaseContract::new(
            ContractId::new(AggregateId::new()),
            ClientCode::new("ACME").unwrap(),
            date(2024, 1, 1),
            date(2024, 12, 31),
            BillingCadence::Monthly,
            Decimal::MAX,
            true,
        );
        assert!(gross.is_ok());
    }

    #[test]
    fn inverted_term_is_rejected() {
        assert!(contract(dec!(100), date(2024, 12, 31), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn zero_length_term_is_valid_but_has_no_periods() {
        let c = contract(dec!(100), date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert!(c.billing_periods().is_empty());
    }

    #[test]
    fn billing_periods_follow_cadence() {
        let c = contract(dec!(0), date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert_eq!(c.billing_periods().len(), 4);
    }
}
