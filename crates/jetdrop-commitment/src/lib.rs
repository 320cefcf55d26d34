//! Jetdrop Commitment
//!
//! Deterministic allocation commitments and inclusion proofs:
//! - [`CommitmentBuilder`] turns an ordered entry list into a canonical
//!   index-to-entry structure and a single 256-bit commitment root
//! - [`generate_proof`] / [`verify_proof`] produce and check inclusion
//!   proofs for one entry against a root
//! - [`serialization`] carries proofs as binary, base64, or JSON
//!
//! The structure blob is the artifact a distributor publishes out-of-band;
//! a claimant rebuilds the structure from it, locates its own entry, and
//! generates a proof locally. No lookup service is involved.

pub mod error;
pub mod proof;
pub mod serialization;
pub mod structure;
pub mod tree;

pub use error::{CommitmentError, Result};
pub use proof::{
    generate_proof, verify_entry, verify_for_claimant, verify_proof, InclusionProof,
    PROOF_VERSION,
};
pub use serialization::{
    deserialize_proof, parse_format, serialize_proof, ProofFormat, ProofJson,
};
pub use structure::{CommitmentBuilder, CommitmentRoot, CommitmentStructure, STRUCTURE_VERSION};
