//! Billing cadence: how many months one billing period spans.

use core::num::NonZeroU32;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use leasebook_core::{DomainError, DomainResult, ValueObject};

/// Recurrence interval at which a client is invoiced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCadence {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    /// Contract-specific terms with an explicit period length.
    Custom(CustomCadence),
}

/// Free-text billing terms with a caller-supplied period length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomCadence {
    label: String,
    months: NonZeroU32,
}

impl CustomCadence {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn months(&self) -> u32 {
        self.months.get()
    }
}

impl BillingCadence {
    /// Build a custom cadence. A zero-month period is rejected.
    pub fn custom(label: impl Into<String>, months: u32) -> DomainResult<Self> {
        let label = label.into();
        let months = NonZeroU32::new(months).ok_or_else(|| {
            DomainError::validation(format!("custom cadence '{label}' needs a positive month count"))
        })?;
        Ok(Self::Custom(CustomCadence { label, months }))
    }

    /// Number of calendar months in one billing period.
    pub fn months(&self) -> u32 {
        match self {
            BillingCadence::Monthly => 1,
            BillingCadence::Quarterly => 3,
            BillingCadence::SemiAnnual => 6,
            BillingCadence::Annual => 12,
            BillingCadence::Custom(custom) => custom.months(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BillingCadence::Monthly => "monthly",
            BillingCadence::Quarterly => "quarterly",
            BillingCadence::SemiAnnual => "semi-annual",
            BillingCadence::Annual => "annual",
            BillingCadence::Custom(custom) => custom.label(),
        }
    }

    /// Parse a stored billing-terms label, defaulting unknown labels to
    /// monthly billing.
    ///
    /// Only for legacy records whose labels were never validated; new input
    /// goes through [`FromStr`].
    pub fn from_label_lenient(label: &str) -> Self {
        match label.parse() {
            Ok(cadence) => cadence,
            Err(_) => {
                tracing::warn!(label, "unknown billing cadence, falling back to monthly");
                BillingCadence::Monthly
            }
        }
    }
}

impl FromStr for BillingCadence {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(BillingCadence::Monthly),
            "quarterly" => Ok(BillingCadence::Quarterly),
            "semi-annual" | "semi_annual" | "semiannual" => Ok(BillingCadence::SemiAnnual),
            "annual" | "annually" | "yearly" => Ok(BillingCadence::Annual),
            other => Err(DomainError::validation(format!(
                "unknown billing cadence '{other}'"
            ))),
        }
    }
}

impl core::fmt::Display for BillingCadence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl ValueObject for BillingCadence {}
