//! jetdrop - Fungible-token airdrop engine
//!
//! This crate bundles the pieces needed to run a token airdrop end to
//! end: normalize a recipient list, commit to it with a Merkle root,
//! prove and verify individual inclusion, walk a claimant through the
//! helper-account claim flow, and dispatch the transfers in batches with
//! retry scheduling.
//!
//! # Crates
//!
//! - `jetdrop-primitives`: Addresses, token amounts, entry sets, hashing
//! - `jetdrop-commitment`: Commitment structures, roots, inclusion proofs
//! - `jetdrop-client`: JSON-RPC client, wallet bridge, network traits
//! - `jetdrop-dispatch`: Batching, retry scheduling, transfer dispatch
//! - `jetdrop-claim`: Claim state machine and helper derivation
//!
//! # Example
//!
//! ```no_run
//! use jetdrop::commitment::{CommitmentBuilder, generate_proof, verify_proof};
//! use jetdrop::primitives::{Address, Entry, TokenAmount};
//!
//! let entries = vec![
//!     Entry::new(Address::new(0, [0x11; 32]), TokenAmount::from_nano(100)),
//!     Entry::new(Address::new(0, [0x22; 32]), TokenAmount::from_nano(200)),
//! ];
//! let (structure, root) = CommitmentBuilder::build(&entries).unwrap();
//! let proof = generate_proof(&structure, 1).unwrap();
//! assert!(verify_proof(&root, &proof));
//! ```

// Re-export sub-crates
pub use jetdrop_claim as claim;
pub use jetdrop_client as client;
pub use jetdrop_commitment as commitment;
pub use jetdrop_dispatch as dispatch;
pub use jetdrop_primitives as primitives;
