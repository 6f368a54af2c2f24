//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// A value object has no identity: two billing periods with the same start and
/// end are the same period, two amount breakdowns with the same figures are the
/// same breakdown. Value objects are immutable; to "change" one, build a new
/// one.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// struct BillingPeriod { start: NaiveDate, end: NaiveDate }
///
/// impl ValueObject for BillingPeriod {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
