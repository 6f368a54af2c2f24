use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use leasebook_billing::PeriodKey;
use leasebook_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion};

use crate::client::ClientCode;
use crate::contract::ContractId;
use crate::invoice::{InvoiceId, LeaseInvoice};

/// Persistence seam for lease invoices.
///
/// The store owns the guarantee the calculator cannot give on its own: at
/// most one invoice per `(contract, billing period)`, and at most one invoice
/// per invoice number. Two concurrent generation runs for the same contract
/// may both plan the same period; the second `insert` must fail with
/// [`DomainError::Conflict`].
pub trait InvoiceStore: Send + Sync {
    /// Persist a freshly issued invoice.
    fn insert(&self, invoice: LeaseInvoice) -> DomainResult<()>;

    /// Replace a stored invoice after a lifecycle change. `expected` is the
    /// version the caller loaded.
    fn save(&self, invoice: LeaseInvoice, expected: ExpectedVersion) -> DomainResult<()>;

    fn get(&self, invoice_id: InvoiceId) -> DomainResult<LeaseInvoice>;

    /// All invoices of a contract, ordered by billing period start.
    fn list_for_contract(&self, contract_id: ContractId) -> DomainResult<Vec<LeaseInvoice>>;

    /// Period keys already invoiced for a contract.
    fn existing_period_keys(&self, contract_id: ContractId) -> DomainResult<HashSet<PeriodKey>>;

    /// Highest invoice sequence issued to a client, or 0 if none.
    fn max_sequence_for_client(&self, client: &ClientCode) -> DomainResult<u16>;
}

impl<S> InvoiceStore for Arc<S>
where
    S: InvoiceStore + ?Sized,
{
    fn insert(&self, invoice: LeaseInvoice) -> DomainResult<()> {
        (**self).insert(invoice)
    }

    fn save(&self, invoice: LeaseInvoice, expected: ExpectedVersion) -> DomainResult<()> {
        (**self).save(invoice, expected)
    }

    fn get(&self, invoice_id: InvoiceId) -> DomainResult<LeaseInvoice> {
        (**self).get(invoice_id)
    }

    fn list_for_contract(&self, contract_id: ContractId) -> DomainResult<Vec<LeaseInvoice>> {
        (**self).list_for_contract(contract_id)
    }

    fn existing_period_keys(&self, contract_id: ContractId) -> DomainResult<HashSet<PeriodKey>> {
        (**self).existing_period_keys(contract_id)
    }

    fn max_sequence_for_client(&self, client: &ClientCode) -> DomainResult<u16> {
        (**self).max_sequence_for_client(client)
    }
}

/// In-memory invoice store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    invoices: RwLock<HashMap<InvoiceId, LeaseInvoice>>,
}

fn poisoned() -> DomainError {
    DomainError::invariant("invoice store lock poisoned")
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvoiceStore for InMemoryInvoiceStore {
    fn insert(&self, invoice: LeaseInvoice) -> DomainResult<()> {
        let (Some(contract_id), Some(period), Some(number)) =
            (invoice.contract_id(), invoice.period(), invoice.number())
        else {
            return Err(DomainError::validation("only issued invoices can be stored"));
        };

        let mut invoices = self.invoices.write().map_err(|_| poisoned())?;

        if invoices.contains_key(&invoice.id_typed()) {
            return Err(DomainError::conflict(format!(
                "invoice {} already stored",
                invoice.id_typed()
            )));
        }
        for existing in invoices.values() {
            if existing.contract_id() == Some(contract_id) && existing.period() == Some(period) {
                return Err(DomainError::conflict(format!(
                    "period {period} of contract {contract_id} is already invoiced"
                )));
            }
            if existing.number() == Some(number) {
                return Err(DomainError::conflict(format!(
                    "invoice number {number} is already taken"
                )));
            }
        }

        invoices.insert(invoice.id_typed(), invoice);
        Ok(())
    }

    fn save(&self, invoice: LeaseInvoice, expected: ExpectedVersion) -> DomainResult<()> {
        let mut invoices = self.invoices.write().map_err(|_| poisoned())?;
        let stored = invoices
            .get_mut(&invoice.id_typed())
            .ok_or_else(DomainError::not_found)?;

        expected.check(stored.version())?;
        *stored = invoice;
        Ok(())
    }

    fn get(&self, invoice_id: InvoiceId) -> DomainResult<LeaseInvoice> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        invoices
            .get(&invoice_id)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    fn list_for_contract(&self, contract_id: ContractId) -> DomainResult<Vec<LeaseInvoice>> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        let mut out: Vec<LeaseInvoice> = invoices
            .values()
            .filter(|inv| inv.contract_id() == Some(contract_id))
            .cloned()
            .collect();
        out.sort_by_key(|inv| inv.period());
        Ok(out)
    }

    fn existing_period_keys(&self, contract_id: ContractId) -> DomainResult<HashSet<PeriodKey>> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        Ok(invoices
            .values()
            .filter(|inv| inv.contract_id() == Some(contract_id))
            .filter_map(|inv| inv.period().map(|p| p.key()))
            .collect())
    }

    fn max_sequence_for_client(&self, client: &ClientCode) -> DomainResult<u16> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        Ok(invoices
            .values()
            .filter_map(|inv| inv.number())
            .filter(|number| number.client() == client)
            .map(|number| number.sequence())
            .max()
            .unwrap_or(0))
    }
}
