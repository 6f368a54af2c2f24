//! Fixed billing constants and the policy struct that carries them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leasebook_core::{DomainError, DomainResult};

/// VAT rate applied to every lease invoice (12%).
pub const VAT_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);

/// Invoices fall due this many days before their billing period starts.
pub const DUE_DATE_OFFSET_DAYS: u64 = 3;

/// Rates used by the amount resolver and the due-date rule.
///
/// `Default` yields [`VAT_RATE`] and [`DUE_DATE_OFFSET_DAYS`]. A deployment
/// that needs different figures builds its own policy with [`BillingPolicy::new`]
/// (or deserializes one) and calls the `*_with` variants. Both paths reject a
/// VAT rate outside `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyFields")]
pub struct BillingPolicy {
    /// VAT as a fraction (0.12 = 12%).
    vat_rate: Decimal,
    due_date_offset_days: u64,
}

/// Unchecked wire form; missing fields fall back to the defaults.
#[derive(Deserialize)]
#[serde(default)]
struct PolicyFields {
    vat_rate: Decimal,
    due_date_offset_days: u64,
}

impl Default for PolicyFields {
    fn default() -> Self {
        Self {
            vat_rate: VAT_RATE,
            due_date_offset_days: DUE_DATE_OFFSET_DAYS,
        }
    }
}

impl TryFrom<PolicyFields> for BillingPolicy {
    type Error = DomainError;

    fn try_from(fields: PolicyFields) -> Result<Self, Self::Error> {
        Self::new(fields.vat_rate, fields.due_date_offset_days)
    }
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            vat_rate: VAT_RATE,
            due_date_offset_days: DUE_DATE_OFFSET_DAYS,
        }
    }
}

impl BillingPolicy {
    pub fn new(vat_rate: Decimal, due_date_offset_days: u64) -> DomainResult<Self> {
        let policy = Self {
            vat_rate,
            due_date_offset_days,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn vat_rate(&self) -> Decimal {
        self.vat_rate
    }

    pub fn due_date_offset_days(&self) -> u64 {
        self.due_date_offset_days
    }

    /// Reject VAT rates outside `0..=1`.
    fn validate(&self) -> DomainResult<()> {
        if self.vat_rate.is_sign_negative() && !self.vat_rate.is_zero() {
            return Err(DomainError::validation("vat_rate must not be negative"));
        }
        if self.vat_rate > Decimal::ONE {
            return Err(DomainError::validation("vat_rate must not exceed 100%"));
        }
        Ok(())
    }
}
