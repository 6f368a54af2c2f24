use core::str::FromStr;

use serde::{Deserialize, Serialize};

use leasebook_core::{DomainError, DomainResult, ValueObject};

use crate::client::ClientCode;

/// Highest sequence that fits the four-digit suffix.
pub const MAX_SEQUENCE: u16 = 9999;

/// Invoice number of the form `INV-<clientCode>-<4-digit sequence>`.
///
/// The sequence is per client and starts at 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber {
    client: ClientCode,
    sequence: u16,
}

impl InvoiceNumber {
    pub fn new(client: ClientCode, sequence: u16) -> DomainResult<Self> {
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(DomainError::validation(format!(
                "invoice sequence {sequence} for client {client} is outside 1..={MAX_SEQUENCE}"
            )));
        }
        Ok(Self { client, sequence })
    }

    pub fn client(&self) -> &ClientCode {
        &self.client
    }

    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// The following number for the same client.
    pub fn next(&self) -> DomainResult<Self> {
        Self::new(self.client.clone(), self.sequence.saturating_add(1))
    }
}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "INV-{}-{:04}", self.client, self.sequence)
    }
}

impl FromStr for InvoiceNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::validation(format!("malformed invoice number '{s}'"));

        let rest = s.strip_prefix("INV-").ok_or_else(invalid)?;
        // Client codes may contain '-', so split on the last one.
        let (client, sequence) = rest.rsplit_once('-').ok_or_else(invalid)?;
        if sequence.len() != 4 || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let sequence: u16 = sequence.parse().map_err(|_| invalid())?;

        Self::new(ClientCode::new(client)?, sequence)
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InvoiceNumber> for String {
    fn from(value: InvoiceNumber) -> Self {
        value.to_string()
    }
}

impl ValueObject for InvoiceNumber {}
