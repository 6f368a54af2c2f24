use chrono::{DateTime, Utc};

/// A fact emitted by an aggregate.
///
/// Events are immutable and versioned so that persisted payloads can evolve.
pub trait DomainEvent: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "invoicing.lease_invoice.issued").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// Business time at which the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}
