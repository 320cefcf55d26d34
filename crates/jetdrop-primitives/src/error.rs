//! Error types for primitive parsing and entry-set validation

use thiserror::Error;

/// Errors from parsing a textual account address
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The input string was empty
    #[error("address is empty")]
    Empty,

    /// The workchain part of a raw-form address did not parse
    #[error("invalid workchain '{0}'")]
    InvalidWorkchain(String),

    /// The account id part of a raw-form address was not 64 hex digits
    #[error("account id must be 64 hex digits, got {0} characters")]
    InvalidAccountIdLength(usize),

    /// The account id contained non-hex characters
    #[error("account id contains invalid hex")]
    InvalidHex,

    /// The friendly form was not valid base64
    #[error("friendly address is not valid base64")]
    InvalidBase64,

    /// The friendly form decoded to the wrong number of bytes
    #[error("friendly address must decode to 36 bytes, got {0}")]
    InvalidLength(usize),

    /// The friendly form carried an unknown tag byte
    #[error("unknown address tag 0x{0:02x}")]
    UnknownTag(u8),

    /// The friendly form checksum did not match
    #[error("friendly address checksum mismatch")]
    ChecksumMismatch,
}

/// Errors from parsing a textual token amount
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input string was empty
    #[error("amount is empty")]
    Empty,

    /// The input carried a leading minus sign
    #[error("amount cannot be negative")]
    Negative,

    /// The input contained a non-digit character
    #[error("amount contains a non-digit character")]
    NotNumeric,

    /// A decimal amount had more fractional digits than the token supports
    #[error("amount has more than {max} decimal places")]
    TooManyDecimals {
        /// Maximum supported fractional digits
        max: u32,
    },

    /// The value does not fit in 128 bits of minimal units
    #[error("amount exceeds the 128-bit range")]
    Overflow,
}

/// Errors from constructing or parsing a recipient entry set
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The recipient list JSON failed to parse or was not an array
    #[error("malformed recipient list: {0}")]
    MalformedInput(String),

    /// The recipient list was empty
    #[error("recipient list is empty")]
    EmptyList,

    /// A recipient address failed to parse, with its list position
    #[error("invalid address at index {index}: {source}")]
    InvalidAddress {
        /// Position of the offending record in the input list
        index: usize,
        #[source]
        source: AddressError,
    },

    /// A recipient amount failed to parse, with its list position
    #[error("invalid amount at index {index}: {source}")]
    InvalidAmount {
        /// Position of the offending record in the input list
        index: usize,
        #[source]
        source: AmountError,
    },

    /// The same address appeared twice; the index is the second occurrence
    #[error("duplicate recipient {address} at index {index}")]
    DuplicateRecipient {
        /// Position of the offending (repeated) record
        index: usize,
        /// The repeated address in raw form
        address: String,
    },

    /// Summing all amounts overflowed the 128-bit range
    #[error("total allocation overflows the amount range")]
    TotalOverflow,
}

/// Result type for entry-set operations
pub type Result<T> = std::result::Result<T, EntryError>;
