//! Lease invoicing domain.
//!
//! Contracts, invoice numbering, the lease-invoice lifecycle and the
//! recurring invoice workflow that drives the billing calculator. Persistence
//! sits behind [`InvoiceStore`]; rendering and delivery are someone else's job.

pub mod client;
pub mod contract;
pub mod invoice;
pub mod number;
pub mod store;
pub mod workflow;

pub use client::ClientCode;
pub use contract::{ContractId, LeaseContract};
pub use invoice::{
    InvoiceId, InvoiceIssued, InvoiceOverdue, InvoiceSent, InvoiceStatus, IssueInvoice,
    LeaseInvoice, LeaseInvoiceCommand, LeaseInvoiceEvent, MarkOverdue, MarkSent,
    PaymentRegistered, RegisterPayment,
};
pub use number::InvoiceNumber;
pub use store::{InMemoryInvoiceStore, InvoiceStore};
pub use workflow::{GenerationRequest, generate_invoices, mark_overdue_invoices, plan_invoices};
