//! Recurring invoice generation and overdue sweeps.
//!
//! The calculator steps run in a fixed order: periods, duplicate filter, then
//! amounts and due date per surviving period. The store is consulted for what
//! is already billed and written to only after every command was accepted by
//! its aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use leasebook_billing::{due_date, filter_new_periods, resolve_amounts};
use leasebook_core::{Aggregate, AggregateId, AggregateRoot, DomainResult, ExpectedVersion};

use crate::contract::{ContractId, LeaseContract};
use crate::invoice::{InvoiceId, IssueInvoice, LeaseInvoice, LeaseInvoiceCommand, MarkOverdue};
use crate::number::InvoiceNumber;
use crate::store::InvoiceStore;

/// Parameters of one "generate invoices for this contract" run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Periods starting after this date are skipped unless `include_future`.
    pub up_to: NaiveDate,
    pub include_future: bool,
    pub issued_at: DateTime<Utc>,
}

/// Work out which invoices a run would issue, without writing anything.
///
/// Invoice numbers continue after the client's highest existing sequence.
pub fn plan_invoices<S>(
    contract: &LeaseContract,
    store: &S,
    request: &GenerationRequest,
) -> DomainResult<Vec<IssueInvoice>>
where
    S: InvoiceStore + ?Sized,
{
    let all_periods = contract.billing_periods();
    let existing = store.existing_period_keys(contract.id())?;
    let fresh = filter_new_periods(&all_periods, &existing, request.up_to, request.include_future);

    tracing::info!(
        contract_id = %contract.id(),
        client = %contract.client_code(),
        cadence = %contract.cadence(),
        total_periods = all_periods.len(),
        already_invoiced = existing.len(),
        to_issue = fresh.len(),
        "planning lease invoices"
    );

    let mut last_number = match store.max_sequence_for_client(contract.client_code())? {
        0 => None,
        sequence => Some(InvoiceNumber::new(contract.client_code().clone(), sequence)?),
    };
    let mut commands = Vec::with_capacity(fresh.len());

    for period in fresh {
        let invoice_number = match &last_number {
            Some(last) => last.next()?,
            None => InvoiceNumber::new(contract.client_code().clone(), 1)?,
        };
        last_number = Some(invoice_number.clone());
        let amounts = resolve_amounts(contract.rate(), contract.vat_inclusive());
        let due = due_date(period.start());

        tracing::debug!(
            invoice_number = %invoice_number,
            period = %period,
            due_date = %due,
            total = %amounts.total,
            "planned invoice"
        );

        commands.push(IssueInvoice {
            invoice_id: InvoiceId::new(AggregateId::new()),
            invoice_number,
            contract_id: contract.id(),
            period,
            due_date: due,
            amounts,
            occurred_at: request.issued_at,
        });
    }

    Ok(commands)
}

/// Plan, issue and store the invoices still missing for a contract.
///
/// Re-running with the same request issues nothing new. If the store rejects
/// an insert (a concurrent run got there first) the error is returned and the
/// invoices inserted before it stay stored.
pub fn generate_invoices<S>(
    contract: &LeaseContract,
    store: &S,
    request: &GenerationRequest,
) -> DomainResult<Vec<LeaseInvoice>>
where
    S: InvoiceStore + ?Sized,
{
    let commands = plan_invoices(contract, store, request)?;

    let mut issued = Vec::with_capacity(commands.len());
    for cmd in commands {
        let mut invoice = LeaseInvoice::empty(cmd.invoice_id);
        let events = invoice.handle(&LeaseInvoiceCommand::IssueInvoice(cmd))?;
        for e in &events {
            invoice.apply(e);
        }
        issued.push(invoice);
    }

    for invoice in &issued {
        store.insert(invoice.clone())?;
    }

    tracing::info!(
        contract_id = %contract.id(),
        issued = issued.len(),
        "lease invoices issued"
    );

    Ok(issued)
}

/// Flag every unpaid invoice of a contract whose due date passed before
/// `as_of`. Returns the invoices that changed.
pub fn mark_overdue_invoices<S>(
    store: &S,
    contract_id: ContractId,
    as_of: NaiveDate,
    occurred_at: DateTime<Utc>,
) -> DomainResult<Vec<LeaseInvoice>>
where
    S: InvoiceStore + ?Sized,
{
    let mut flagged = Vec::new();

    for mut invoice in store.list_for_contract(contract_id)? {
        if !invoice.is_past_due(as_of) {
            continue;
        }

        let loaded_version = invoice.version();
        let events = invoice.handle(&LeaseInvoiceCommand::MarkOverdue(MarkOverdue {
            invoice_id: invoice.id_typed(),
            as_of,
            occurred_at,
        }))?;
        for e in &events {
            invoice.apply(e);
        }

        store.save(invoice.clone(), ExpectedVersion(loaded_version))?;
        flagged.push(invoice);
    }

    if !flagged.is_empty() {
        tracing::info!(%contract_id, %as_of, overdue = flagged.len(), "invoices marked overdue");
    }

    Ok(flagged)
}
