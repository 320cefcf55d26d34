//! Jetdrop Primitives
//!
//! This crate provides the shared data types for the jetdrop airdrop engine:
//! - Account addresses (raw and user-friendly textual forms)
//! - Token amounts in 128-bit minimal units with decimal parsing
//! - 256-bit hashes (SHA-256) with tagged domain separation
//! - Validated recipient entry sets consumed by the commitment builder
//!   and the transfer dispatcher

pub mod address;
pub mod amount;
pub mod entry;
pub mod error;
pub mod hash;

pub use address::Address;
pub use amount::{TokenAmount, DECIMALS};
pub use entry::{AmountFormat, Entry, EntrySet, RecipientRecord, ValidationIssue, ValidationReport};
pub use error::{AddressError, AmountError, EntryError};
pub use hash::Hash256;
