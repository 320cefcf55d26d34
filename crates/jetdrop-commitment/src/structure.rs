//! Commitment structures and the builder that produces them
//!
//! A [`CommitmentStructure`] is an ordered index-to-entry map in a canonical
//! serialized form: two structures holding the same `(index, entry)` pairs
//! serialize to identical bytes and hash to the same root, independent of
//! process, time, or platform. The structure blob is the artifact a
//! distributor hands to claimants out-of-band; the root alone is what the
//! airdrop contract binds on-chain.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use base64::Engine;
use serde::{Deserialize, Serialize};

use jetdrop_primitives::{Address, Entry, Hash256, TokenAmount};

use crate::error::{CommitmentError, Result};
use crate::tree;

/// Version byte of the canonical structure serialization
pub const STRUCTURE_VERSION: u8 = 1;

/// Serialized width of one entry: index, workchain, account id, amount
const ENTRY_WIDTH: usize = 4 + 1 + 32 + 16;
/// Serialized width of the header: version, entry count
const HEADER_WIDTH: usize = 1 + 4;

/// The 256-bit root binding an entire allocation list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitmentRoot(Hash256);

impl CommitmentRoot {
    /// Wrap a raw hash
    pub fn from_hash(hash: Hash256) -> Self {
        Self(hash)
    }

    /// The underlying hash
    pub fn as_hash(&self) -> &Hash256 {
        &self.0
    }

    /// Hex rendering without prefix
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// Parse from hex, with or without a `0x` prefix
    pub fn from_hex(hex: &str) -> Result<Self> {
        Hash256::from_hex(hex)
            .map(Self)
            .map_err(|e| CommitmentError::malformed_structure(format!("bad root hex: {}", e)))
    }
}

impl fmt::Display for CommitmentRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0.to_hex())
    }
}

/// An ordered, read-only index-to-entry map with a canonical byte form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentStructure {
    entries: BTreeMap<u32, Entry>,
}

impl CommitmentStructure {
    fn from_ordered_entries(entries: &[Entry]) -> Self {
        let map = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i as u32, *e))
            .collect();
        Self { entries: map }
    }

    /// Number of committed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the structure holds no entries (never true once built)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at an index, if present
    pub fn entry(&self, index: u32) -> Option<&Entry> {
        self.entries.get(&index)
    }

    /// Iterate `(index, entry)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Entry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Find the index and entry for a recipient address
    pub fn find_entry_for(&self, address: &Address) -> Option<(u32, &Entry)> {
        self.iter().find(|(_, e)| &e.address == address)
    }

    /// Sum of all committed amounts, saturating at the 128-bit limit
    pub fn total_amount(&self) -> TokenAmount {
        let total = self
            .entries
            .values()
            .fold(0u128, |acc, e| acc.saturating_add(e.amount.nano()));
        TokenAmount::from_nano(total)
    }

    /// Leaf hashes in index order
    pub fn leaf_hashes(&self) -> Vec<Hash256> {
        self.iter().map(|(i, e)| tree::leaf_hash(i, e)).collect()
    }

    /// Derive the commitment root
    pub fn root(&self) -> CommitmentRoot {
        CommitmentRoot(tree::merkle_root(&self.leaf_hashes()))
    }

    /// Canonical byte serialization
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_WIDTH + self.entries.len() * ENTRY_WIDTH);
        bytes.push(STRUCTURE_VERSION);
        bytes.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for (index, entry) in self.iter() {
            bytes.extend_from_slice(&index.to_be_bytes());
            bytes.push(entry.address.workchain() as u8);
            bytes.extend_from_slice(entry.address.account_id());
            bytes.extend_from_slice(&entry.amount.nano().to_be_bytes());
        }
        bytes
    }

    /// Parse the canonical byte serialization
    ///
    /// Strict on every count: version byte, exact length, and contiguous
    /// indices starting at zero. Corrupt input errors, never panics.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_WIDTH {
            return Err(CommitmentError::malformed_structure(format!(
                "blob too short: {} bytes",
                bytes.len()
            )));
        }
        let version = bytes[0];
        if version != STRUCTURE_VERSION {
            return Err(CommitmentError::UnsupportedVersion(version));
        }
        let count = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
        if count == 0 {
            return Err(CommitmentError::EmptyEntries);
        }
        let expected_len = HEADER_WIDTH + count * ENTRY_WIDTH;
        if bytes.len() != expected_len {
            return Err(CommitmentError::malformed_structure(format!(
                "expected {} bytes for {} entries, got {}",
                expected_len,
                count,
                bytes.len()
            )));
        }

        let mut entries = BTreeMap::new();
        for i in 0..count {
            let at = HEADER_WIDTH + i * ENTRY_WIDTH;
            let record = &bytes[at..at + ENTRY_WIDTH];
            let index = u32::from_be_bytes([record[0], record[1], record[2], record[3]]);
            if index != i as u32 {
                return Err(CommitmentError::malformed_structure(format!(
                    "non-contiguous index {} at position {}",
                    index, i
                )));
            }
            let workchain = record[4] as i8;
            let mut account_id = [0u8; 32];
            account_id.copy_from_slice(&record[5..37]);
            let mut amount = [0u8; 16];
            amount.copy_from_slice(&record[37..53]);
            entries.insert(
                index,
                Entry::new(
                    Address::new(workchain, account_id),
                    TokenAmount::from_nano(u128::from_be_bytes(amount)),
                ),
            );
        }
        Ok(Self { entries })
    }

    /// Base64 rendering of the canonical bytes
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.to_bytes())
    }

    /// Parse from the base64 rendering
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        Self::from_bytes(&bytes)
    }
}

/// Builds a commitment structure and root from an ordered entry list
pub struct CommitmentBuilder;

impl CommitmentBuilder {
    /// Build the structure and derive its root
    ///
    /// Pure: the same ordered input always reproduces the same root.
    /// Indices are list positions. Duplicate addresses are rejected with
    /// the position of the second occurrence.
    pub fn build(entries: &[Entry]) -> Result<(CommitmentStructure, CommitmentRoot)> {
        if entries.is_empty() {
            return Err(CommitmentError::EmptyEntries);
        }
        let mut seen: HashMap<Address, u32> = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if seen.insert(entry.address, index as u32).is_some() {
                return Err(CommitmentError::DuplicateRecipient {
                    index: index as u32,
                    address: entry.address.to_raw(),
                });
            }
        }
        let structure = CommitmentStructure::from_ordered_entries(entries);
        let root = structure.root();
        Ok((structure, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entry(seed: u8, amount: u128) -> Entry {
        let mut id = [0u8; 32];
        id[0] = seed;
        id[16] = seed.wrapping_mul(17);
        Entry::new(Address::new(0, id), TokenAmount::from_nano(amount))
    }

    fn sample_entries() -> Vec<Entry> {
        vec![
            test_entry(1, 100),
            test_entry(2, 200),
            test_entry(3, 300),
        ]
    }

    #[test]
    fn test_build_is_deterministic() {
        let (_, root_a) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let (_, root_b) = CommitmentBuilder::build(&sample_entries()).unwrap();
        assert_eq!(root_a, root_b);
    }

    #[test]
    fn test_amount_mutation_changes_root() {
        let (_, root) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let mut mutated = sample_entries();
        mutated[1].amount = TokenAmount::from_nano(201);
        let (_, mutated_root) = CommitmentBuilder::build(&mutated).unwrap();
        assert_ne!(root, mutated_root);
    }

    #[test]
    fn test_reordering_changes_root() {
        let (_, root) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let mut swapped = sample_entries();
        swapped.swap(0, 2);
        let (_, swapped_root) = CommitmentBuilder::build(&swapped).unwrap();
        assert_ne!(root, swapped_root);
    }

    #[test]
    fn test_build_rejects_empty() {
        assert!(matches!(
            CommitmentBuilder::build(&[]).unwrap_err(),
            CommitmentError::EmptyEntries
        ));
    }

    #[test]
    fn test_build_rejects_duplicates_naming_index() {
        let entries = vec![test_entry(1, 100), test_entry(2, 200), test_entry(1, 300)];
        match CommitmentBuilder::build(&entries).unwrap_err() {
            CommitmentError::DuplicateRecipient { index, address } => {
                assert_eq!(index, 2);
                assert_eq!(address, entries[0].address.to_raw());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blob_roundtrip_preserves_root() {
        let (structure, root) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let recovered = CommitmentStructure::from_bytes(&structure.to_bytes()).unwrap();
        assert_eq!(recovered, structure);
        assert_eq!(recovered.root(), root);
    }

    #[test]
    fn test_base64_roundtrip() {
        let (structure, root) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let recovered = CommitmentStructure::from_base64(&structure.to_base64()).unwrap();
        assert_eq!(recovered.root(), root);
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let (structure, _) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let mut bytes = structure.to_bytes();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            CommitmentStructure::from_bytes(&bytes).unwrap_err(),
            CommitmentError::MalformedStructure(_)
        ));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let (structure, _) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let mut bytes = structure.to_bytes();
        bytes.push(0);
        assert!(CommitmentStructure::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let (structure, _) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let mut bytes = structure.to_bytes();
        bytes[0] = 9;
        assert!(matches!(
            CommitmentStructure::from_bytes(&bytes).unwrap_err(),
            CommitmentError::UnsupportedVersion(9)
        ));
    }

    #[test]
    fn test_find_entry_for() {
        let (structure, _) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let target = sample_entries()[1].address;
        let (index, entry) = structure.find_entry_for(&target).unwrap();
        assert_eq!(index, 1);
        assert_eq!(entry.amount, TokenAmount::from_nano(200));
        let absent = test_entry(99, 0).address;
        assert!(structure.find_entry_for(&absent).is_none());
    }

    #[test]
    fn test_total_amount() {
        let (structure, _) = CommitmentBuilder::build(&sample_entries()).unwrap();
        assert_eq!(structure.total_amount(), TokenAmount::from_nano(600));
    }

    #[test]
    fn test_root_hex_roundtrip() {
        let (_, root) = CommitmentBuilder::build(&sample_entries()).unwrap();
        let parsed = CommitmentRoot::from_hex(&root.to_hex()).unwrap();
        assert_eq!(parsed, root);
        assert!(root.to_string().starts_with("0x"));
    }
}
