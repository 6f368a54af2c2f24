//! Billing period and invoice amount calculator.
//!
//! Four stateless operations, invoked in this order by the invoice workflow:
//!
//! 1. [`generate_periods`] splits a contract term into billing periods.
//! 2. [`filter_new_periods`] drops periods that are already invoiced (or not
//!    yet due for invoicing).
//! 3. [`resolve_amounts`] derives net / VAT / total for each period.
//! 4. [`due_date`] derives the payment due date from the period start.
//!
//! Nothing here performs IO or keeps state; every function is safe to call
//! from any thread.

pub mod amounts;
pub mod cadence;
pub mod due_date;
pub mod filter;
pub mod period;
pub mod policy;

pub use amounts::{AmountBreakdown, checked_resolve_amounts_with, resolve_amounts, resolve_amounts_with};
pub use cadence::{BillingCadence, CustomCadence};
pub use due_date::{due_date, due_date_with};
pub use filter::filter_new_periods;
pub use period::{BillingPeriod, PeriodIter, PeriodKey, generate_periods, periods};
pub use policy::{BillingPolicy, DUE_DATE_OFFSET_DAYS, VAT_RATE};
