use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leasebook_billing::{AmountBreakdown, BillingPeriod};
use leasebook_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainEvent};

use crate::contract::ContractId;
use crate::number::InvoiceNumber;

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate root: one invoice for one billing period of a lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseInvoice {
    id: InvoiceId,
    number: Option<InvoiceNumber>,
    contract_id: Option<ContractId>,
    period: Option<BillingPeriod>,
    due_date: Option<NaiveDate>,
    amounts: AmountBreakdown,
    amount_paid: Decimal,
    status: InvoiceStatus,
    version: u64,
    created: bool,
}

impl LeaseInvoice {
    /// Create an empty, not-yet-issued aggregate instance.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            number: None,
            contract_id: None,
            period: None,
            due_date: None,
            amounts: AmountBreakdown::default(),
            amount_paid: Decimal::ZERO,
            status: InvoiceStatus::Pending,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn is_issued(&self) -> bool {
        self.created
    }

    pub fn number(&self) -> Option<&InvoiceNumber> {
        self.number.as_ref()
    }

    pub fn contract_id(&self) -> Option<ContractId> {
        self.contract_id
    }

    pub fn period(&self) -> Option<BillingPeriod> {
        self.period
    }

    pub fn billing_period_start(&self) -> Option<NaiveDate> {
        self.period.map(|p| p.start())
    }

    pub fn billing_period_end(&self) -> Option<NaiveDate> {
        self.period.map(|p| p.end())
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Net amount.
    pub fn amount(&self) -> Decimal {
        self.amounts.net
    }

    pub fn vat_amount(&self) -> Decimal {
        self.amounts.vat
    }

    pub fn total_amount(&self) -> Decimal {
        self.amounts.total
    }

    pub fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    pub fn outstanding_amount(&self) -> Decimal {
        (self.amounts.total - self.amount_paid).max(Decimal::ZERO)
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn can_accept_payment(&self) -> bool {
        self.created && self.status != InvoiceStatus::Paid && self.outstanding_amount() > Decimal::ZERO
    }

    /// Unpaid, not yet flagged, and past its due date on `as_of`.
    pub fn is_past_due(&self, as_of: NaiveDate) -> bool {
        matches!(self.status, InvoiceStatus::Pending | InvoiceStatus::Sent)
            && self.due_date.is_some_and(|due| as_of > due)
    }
}

impl AggregateRoot for LeaseInvoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub invoice_id: InvoiceId,
    pub invoice_number: InvoiceNumber,
    pub contract_id: ContractId,
    pub period: BillingPeriod,
    pub due_date: NaiveDate,
    pub amounts: AmountBreakdown,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkSent (the invoice document went out to the client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSent {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RegisterPayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPayment {
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    /// Receipt reference from the payment ledger, if any.
    pub receipt_reference: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkOverdue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkOverdue {
    pub invoice_id: InvoiceId,
    pub as_of: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseInvoiceCommand {
    IssueInvoice(IssueInvoice),
    MarkSent(MarkSent),
    RegisterPayment(RegisterPayment),
    MarkOverdue(MarkOverdue),
}

/// Event: InvoiceIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub invoice_id: InvoiceId,
    pub invoice_number: InvoiceNumber,
    pub contract_id: ContractId,
    pub period: BillingPeriod,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceSent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSent {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRegistered {
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub new_amount_paid: Decimal,
    pub receipt_reference: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceOverdue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceOverdue {
    pub invoice_id: InvoiceId,
    pub as_of: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseInvoiceEvent {
    InvoiceIssued(InvoiceIssued),
    InvoiceSent(InvoiceSent),
    PaymentRegistered(PaymentRegistered),
    InvoiceOverdue(InvoiceOverdue),
}

impl DomainEvent for LeaseInvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LeaseInvoiceEvent::InvoiceIssued(_) => "invoicing.lease_invoice.issued",
            LeaseInvoiceEvent::InvoiceSent(_) => "invoicing.lease_invoice.sent",
            LeaseInvoiceEvent::PaymentRegistered(_) => "invoicing.lease_invoice.payment_registered",
            LeaseInvoiceEvent::InvoiceOverdue(_) => "invoicing.lease_invoice.overdue",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LeaseInvoiceEvent::InvoiceIssued(e) => e.occurred_at,
            LeaseInvoiceEvent::InvoiceSent(e) => e.occurred_at,
            LeaseInvoiceEvent::PaymentRegistered(e) => e.occurred_at,
            LeaseInvoiceEvent::InvoiceOverdue(e) => e.occurred_at,
        }
    }
}

impl Aggregate for LeaseInvoice {
    type Command = LeaseInvoiceCommand;
    type Event = LeaseInvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LeaseInvoiceEvent::InvoiceIssued(e) => {
                self.id = e.invoice_id;
                self.number = Some(e.invoice_number.clone());
                self.contract_id = Some(e.contract_id);
                self.period = Some(e.period);
                self.due_date = Some(e.due_date);
                self.amounts = AmountBreakdown {
                    net: e.amount,
                    vat: e.vat_amount,
                    total: e.total_amount,
                };
                self.amount_paid = Decimal::ZERO;
                self.status = InvoiceStatus::Pending;
                self.created = true;
            }
            LeaseInvoiceEvent::InvoiceSent(_) => {
                self.status = InvoiceStatus::Sent;
            }
            LeaseInvoiceEvent::PaymentRegistered(e) => {
                self.amount_paid = e.new_amount_paid;
                if self.amount_paid >= self.amounts.total {
                    self.status = InvoiceStatus::Paid;
                }
            }
            LeaseInvoiceEvent::InvoiceOverdue(_) => {
                self.status = InvoiceStatus::Overdue;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LeaseInvoiceCommand::IssueInvoice(cmd) => self.handle_issue(cmd),
            LeaseInvoiceCommand::MarkSent(cmd) => self.handle_mark_sent(cmd),
            LeaseInvoiceCommand::RegisterPayment(cmd) => self.handle_register_payment(cmd),
            LeaseInvoiceCommand::MarkOverdue(cmd) => self.handle_mark_overdue(cmd),
        }
    }
}

impl LeaseInvoice {
    fn ensure_issued(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueInvoice) -> Result<Vec<LeaseInvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }
        if !cmd.amounts.is_non_negative() {
            return Err(DomainError::validation("invoice amounts must not be negative"));
        }
        if !cmd.amounts.is_balanced() {
            return Err(DomainError::invariant(
                "invoice total must equal amount plus VAT",
            ));
        }

        Ok(vec![LeaseInvoiceEvent::InvoiceIssued(InvoiceIssued {
            invoice_id: cmd.invoice_id,
            invoice_number: cmd.invoice_number.clone(),
            contract_id: cmd.contract_id,
            period: cmd.period,
            due_date: cmd.due_date,
            amount: cmd.amounts.net,
            vat_amount: cmd.amounts.vat,
            total_amount: cmd.amounts.total,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_sent(&self, cmd: &MarkSent) -> Result<Vec<LeaseInvoiceEvent>, DomainError> {
        self.ensure_issued(cmd.invoice_id)?;

        if self.status != InvoiceStatus::Pending {
            return Err(DomainError::invariant(format!(
                "only pending invoices can be sent (status: {})",
                self.status
            )));
        }

        Ok(vec![LeaseInvoiceEvent::InvoiceSent(InvoiceSent {
            invoice_id: cmd.invoice_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_register_payment(
        &self,
        cmd: &RegisterPayment,
    ) -> Result<Vec<LeaseInvoiceEvent>, DomainError> {
        self.ensure_issued(cmd.invoice_id)?;

        if !self.can_accept_payment() {
            return Err(DomainError::invariant(
                "cannot register payment on a fully paid invoice",
            ));
        }

        if cmd.amount <= Decimal::ZERO {
            return Err(DomainError::validation("payment amount must be positive"));
        }

        let new_amount_paid = self.amount_paid + cmd.amount;
        if new_amount_paid > self.amounts.total {
            return Err(DomainError::invariant("cannot overpay invoice"));
        }

        Ok(vec![LeaseInvoiceEvent::PaymentRegistered(PaymentRegistered {
            invoice_id: cmd.invoice_id,
            amount: cmd.amount,
            new_amount_paid,
            receipt_reference: cmd.receipt_reference.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_overdue(&self, cmd: &MarkOverdue) -> Result<Vec<LeaseInvoiceEvent>, DomainError> {
        self.ensure_issued(cmd.invoice_id)?;

        match self.status {
            InvoiceStatus::Paid => {
                return Err(DomainError::invariant("a paid invoice cannot be overdue"));
            }
            InvoiceStatus::Overdue => {
                return Err(DomainError::conflict("invoice is already overdue"));
            }
            InvoiceStatus::Pending | InvoiceStatus::Sent => {}
        }

        if !self.is_past_due(cmd.as_of) {
            return Err(DomainError::validation(format!(
                "invoice is not past due on {}",
                cmd.as_of
            )));
        }

        Ok(vec![LeaseInvoiceEvent::InvoiceOverdue(InvoiceOverdue {
            invoice_id: cmd.invoice_id,
            as_of: cmd.as_of,
            occurred_at: cmd.occurred_at,
        })])
    }
}
