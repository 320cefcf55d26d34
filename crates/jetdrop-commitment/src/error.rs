//! Error types for commitment building, proof generation, and verification

use thiserror::Error;

/// Errors from the commitment and proof layer
#[derive(Debug, Error)]
pub enum CommitmentError {
    /// The entry list was empty
    #[error("cannot commit to an empty entry list")]
    EmptyEntries,

    /// The same address appeared twice; the index is the second occurrence
    #[error("duplicate recipient {address} at index {index}")]
    DuplicateRecipient {
        /// Position of the offending (repeated) entry
        index: u32,
        /// The repeated address in raw form
        address: String,
    },

    /// The requested index has no entry in the structure
    #[error("index {0} not found in commitment structure")]
    IndexNotFound(u32),

    /// A serialized structure blob failed to parse
    #[error("malformed structure blob: {0}")]
    MalformedStructure(String),

    /// A serialized proof blob failed to parse
    #[error("malformed proof blob: {0}")]
    MalformedProof(String),

    /// A structure or proof blob carried an unsupported version byte
    #[error("unsupported serialization version {0}")]
    UnsupportedVersion(u8),

    /// Base64 decoding failed
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// JSON serialization or deserialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommitmentError {
    /// Helper for malformed-structure errors
    pub fn malformed_structure<S: Into<String>>(msg: S) -> Self {
        Self::MalformedStructure(msg.into())
    }

    /// Helper for malformed-proof errors
    pub fn malformed_proof<S: Into<String>>(msg: S) -> Self {
        Self::MalformedProof(msg.into())
    }
}

/// Result type for commitment operations
pub type Result<T> = std::result::Result<T, CommitmentError>;
