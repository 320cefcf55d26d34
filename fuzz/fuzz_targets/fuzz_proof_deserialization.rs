//! Fuzz target for inclusion proof deserialization
//!
//! This target ensures:
//! 1. Proof deserialization never panics on arbitrary input
//! 2. Verification of a parsed proof never panics, whatever the root
//! 3. Proof hashing is deterministic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use jetdrop_commitment::{CommitmentRoot, InclusionProof, verify_proof};
use jetdrop_primitives::Hash256;

/// Arbitrary proof bytes and a root to verify against
#[derive(Debug, Arbitrary)]
struct ProofInput {
    proof_bytes: Vec<u8>,
    root: [u8; 32],
}

fuzz_target!(|input: ProofInput| {
    // Limit input size to avoid OOM from huge sibling paths
    let proof_bytes: Vec<u8> = input.proof_bytes.into_iter().take(10_000).collect();

    let proof = match InclusionProof::from_bytes(&proof_bytes) {
        Ok(proof) => proof,
        Err(_) => {
            // Expected: most random bytes will fail deserialization
            return;
        }
    };

    // Whatever parsed must roundtrip
    let recovered = InclusionProof::from_bytes(&proof.to_bytes()).unwrap();
    assert_eq!(recovered, proof, "parsed proof should roundtrip");

    // Hashing must be deterministic
    assert_eq!(proof.proof_hash(), recovered.proof_hash());

    // Verification against an arbitrary root must never panic. Random
    // bytes cannot recompute to a chosen root, so this returns a bool,
    // almost always false.
    let root = CommitmentRoot::from_hash(Hash256::from_bytes(input.root));
    let _ = verify_proof(&root, &proof);
});
