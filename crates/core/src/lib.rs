//! `leasebook-core` — domain foundation building blocks.
//!
//! Pure domain primitives shared by the billing and invoicing crates. Nothing
//! in here touches storage, HTTP or the clock.

pub mod aggregate;
pub mod error;
pub mod event;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use event::DomainEvent;
pub use id::AggregateId;
pub use value_object::ValueObject;
