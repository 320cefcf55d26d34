//! Recipient entries and validated entry sets
//!
//! An [`EntrySet`] is the normalized recipient list consumed by the
//! commitment builder and the transfer dispatcher. Construction enforces
//! the list-level invariants: non-empty, every address syntactically valid,
//! every amount representable, and no address appearing twice. Input order
//! is preserved; entry indices are list positions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::TokenAmount;
use crate::error::{EntryError, Result};

/// One allocation: a recipient address and its amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Recipient account address
    pub address: Address,
    /// Allocated amount in minimal units
    pub amount: TokenAmount,
}

impl Entry {
    /// Create an entry
    pub fn new(address: Address, amount: TokenAmount) -> Self {
        Self { address, amount }
    }
}

/// How the `amount` field of a recipient record is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountFormat {
    /// Raw minimal-unit integer string
    #[default]
    Nano,
    /// Decimal token string with up to 9 fractional digits
    Decimal,
}

/// One recipient record as supplied by the caller, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientRecord {
    /// Recipient address in either textual form
    pub address: String,
    /// Amount string, interpreted per [`AmountFormat`]
    pub amount: String,
}

/// One problem found while validating a recipient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Position of the offending record
    pub index: usize,
    /// Human-readable description
    pub message: String,
}

/// Outcome of a full validation pass over a recipient list
///
/// Unlike [`EntrySet::from_records`], which stops at the first problem,
/// the validation pass reports every offending record so an operator can
/// fix the whole list in one round.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// All problems found, in record order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True if no issues were found
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A validated, order-preserving recipient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySet {
    entries: Vec<Entry>,
}

impl EntrySet {
    /// Build from already-typed entries, enforcing list invariants
    pub fn new(entries: Vec<Entry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(EntryError::EmptyList);
        }
        let mut seen: HashMap<Address, usize> = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if seen.insert(entry.address, index).is_some() {
                return Err(EntryError::DuplicateRecipient {
                    index,
                    address: entry.address.to_raw(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Parse and validate a recipient list from JSON
    ///
    /// The input must be a JSON array of `{ "address": ..., "amount": ... }`
    /// objects; anything else is a [`EntryError::MalformedInput`].
    pub fn parse_json(json: &str, format: AmountFormat) -> Result<Self> {
        let records: Vec<RecipientRecord> = serde_json::from_str(json)
            .map_err(|e| EntryError::MalformedInput(e.to_string()))?;
        Self::from_records(&records, format)
    }

    /// Build from raw records, stopping at the first invalid one
    pub fn from_records(records: &[RecipientRecord], format: AmountFormat) -> Result<Self> {
        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let address = Address::parse(&record.address)
                .map_err(|source| EntryError::InvalidAddress { index, source })?;
            let amount = parse_amount(&record.amount, format)
                .map_err(|source| EntryError::InvalidAmount { index, source })?;
            entries.push(Entry::new(address, amount));
        }
        Self::new(entries)
    }

    /// Validate raw records, collecting every issue instead of stopping
    pub fn validate_records(records: &[RecipientRecord], format: AmountFormat) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut seen: HashMap<Address, usize> = HashMap::with_capacity(records.len());
        if records.is_empty() {
            report.issues.push(ValidationIssue {
                index: 0,
                message: "recipient list is empty".to_string(),
            });
            return report;
        }
        for (index, record) in records.iter().enumerate() {
            match Address::parse(&record.address) {
                Ok(address) => {
                    if let Some(first) = seen.insert(address, index) {
                        report.issues.push(ValidationIssue {
                            index,
                            message: format!(
                                "duplicate of recipient at index {}: {}",
                                first,
                                address.to_raw()
                            ),
                        });
                    }
                }
                Err(e) => report.issues.push(ValidationIssue {
                    index,
                    message: format!("invalid address: {}", e),
                }),
            }
            if let Err(e) = parse_amount(&record.amount, format) {
                report.issues.push(ValidationIssue {
                    index,
                    message: format!("invalid amount: {}", e),
                });
            }
        }
        report
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the set holds no entries (never true for a constructed set)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a list position
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// All entries in input order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate entries in input order
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Position of an address, if present
    pub fn index_of(&self, address: &Address) -> Option<u32> {
        self.entries
            .iter()
            .position(|e| &e.address == address)
            .map(|i| i as u32)
    }

    /// Sum of all amounts, checked against 128-bit overflow
    pub fn total_amount(&self) -> Result<TokenAmount> {
        let mut total = TokenAmount::ZERO;
        for entry in &self.entries {
            total = total
                .checked_add(entry.amount)
                .ok_or(EntryError::TotalOverflow)?;
        }
        Ok(total)
    }

    /// Consume the set, yielding the entries in input order
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

fn parse_amount(input: &str, format: AmountFormat) -> std::result::Result<TokenAmount, crate::error::AmountError> {
    match format {
        AmountFormat::Nano => TokenAmount::from_nano_str(input),
        AmountFormat::Decimal => TokenAmount::from_decimal_str(input),
    }
}
