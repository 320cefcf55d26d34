//! Proof serialization formats
//!
//! Proofs travel in three formats: raw binary (most compact), base64 text
//! (what claim payloads and files carry), and JSON with inspection fields.
//! The JSON form embeds the proof digest and the claimed entry so an
//! operator can eyeball a proof without decoding it; parsing cross-checks
//! those fields against the embedded binary proof.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{CommitmentError, Result};
use crate::proof::InclusionProof;
use crate::structure::CommitmentRoot;

/// Proof format for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofFormat {
    /// Raw binary format (most compact)
    Binary,
    /// Base64-encoded text
    Base64,
    /// JSON with inspection fields
    Json,
}

/// JSON representation of a proof
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofJson {
    /// Base64-encoded binary proof
    pub proof_b64: String,
    /// Digest of the binary proof (hex)
    pub proof_hash: String,
    /// Claimed entry index
    pub index: u32,
    /// Claimed recipient address (raw form)
    pub address: String,
    /// Claimed amount in minimal units
    pub amount: String,
    /// Commitment root the proof was generated against, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

impl ProofJson {
    /// Create from a proof, optionally recording the root it targets
    pub fn from_proof(proof: &InclusionProof, root: Option<&CommitmentRoot>) -> Self {
        Self {
            proof_b64: proof.to_base64(),
            proof_hash: proof.proof_hash().to_hex(),
            index: proof.index,
            address: proof.entry.address.to_raw(),
            amount: proof.entry.amount.nano().to_string(),
            root: root.map(|r| r.to_hex()),
        }
    }

    /// Extract and cross-check the embedded proof
    ///
    /// The inspection fields must agree with the binary proof; a mismatch
    /// means the JSON was edited after generation and is rejected.
    pub fn to_proof(&self) -> Result<InclusionProof> {
        let proof = InclusionProof::from_base64(&self.proof_b64)?;
        if proof.proof_hash().to_hex() != self.proof_hash {
            return Err(CommitmentError::malformed_proof(
                "proof hash does not match embedded proof",
            ));
        }
        if proof.index != self.index {
            return Err(CommitmentError::malformed_proof(format!(
                "index field {} does not match embedded proof index {}",
                self.index, proof.index
            )));
        }
        if proof.entry.address.to_raw() != self.address {
            return Err(CommitmentError::malformed_proof(
                "address field does not match embedded proof",
            ));
        }
        Ok(proof)
    }
}

/// Serialize a proof to the specified format
pub fn serialize_proof(
    proof: &InclusionProof,
    format: ProofFormat,
    root: Option<&CommitmentRoot>,
) -> Result<Vec<u8>> {
    match format {
        ProofFormat::Binary => Ok(proof.to_bytes()),
        ProofFormat::Base64 => Ok(proof.to_base64().into_bytes()),
        ProofFormat::Json => {
            let json = ProofJson::from_proof(proof, root);
            Ok(serde_json::to_vec_pretty(&json)?)
        }
    }
}

/// Deserialize a proof from the specified format
pub fn deserialize_proof(data: &[u8], format: ProofFormat) -> Result<InclusionProof> {
    match format {
        ProofFormat::Binary => InclusionProof::from_bytes(data),
        ProofFormat::Base64 => {
            let text = std::str::from_utf8(data)
                .map_err(|_| CommitmentError::malformed_proof("base64 text is not utf-8"))?;
            InclusionProof::from_base64(text)
        }
        ProofFormat::Json => {
            let json: ProofJson = serde_json::from_slice(data)?;
            json.to_proof()
        }
    }
}

/// Map a lowercase format name to its [`ProofFormat`]
pub fn parse_format(name: &str) -> Option<ProofFormat> {
    match name {
        "binary" | "bin" => Some(ProofFormat::Binary),
        "base64" | "b64" => Some(ProofFormat::Base64),
        "json" => Some(ProofFormat::Json),
        _ => None,
    }
}

/// Base64 decode helper shared by CLI input paths
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::generate_proof;
    use crate::structure::CommitmentBuilder;
    use jetdrop_primitives::{Address, Entry, TokenAmount};

    fn sample_proof() -> (InclusionProof, CommitmentRoot) {
        let entries: Vec<Entry> = (1u8..=4)
            .map(|i| {
                let mut id = [0u8; 32];
                id[0] = i;
                Entry::new(Address::new(0, id), TokenAmount::from_nano(i as u128 * 50))
            })
            .collect();
        let (structure, root) = CommitmentBuilder::build(&entries).unwrap();
        (generate_proof(&structure, 2).unwrap(), root)
    }

    #[test]
    fn test_all_formats_roundtrip() {
        let (proof, root) = sample_proof();
        for format in [ProofFormat::Binary, ProofFormat::Base64, ProofFormat::Json] {
            let data = serialize_proof(&proof, format, Some(&root)).unwrap();
            let recovered = deserialize_proof(&data, format).unwrap();
            assert_eq!(recovered, proof);
        }
    }

    #[test]
    fn test_json_records_root_and_hash() {
        let (proof, root) = sample_proof();
        let json = ProofJson::from_proof(&proof, Some(&root));
        assert_eq!(json.root.as_deref(), Some(root.to_hex().as_str()));
        assert_eq!(json.proof_hash, proof.proof_hash().to_hex());
        assert_eq!(json.index, 2);
    }

    #[test]
    fn test_edited_json_rejected() {
        let (proof, root) = sample_proof();
        let mut json = ProofJson::from_proof(&proof, Some(&root));
        json.index = 3;
        assert!(json.to_proof().is_err());

        let mut json = ProofJson::from_proof(&proof, None);
        json.proof_hash = "00".repeat(32);
        assert!(json.to_proof().is_err());
    }

    #[test]
    fn test_parse_format_names() {
        assert_eq!(parse_format("binary"), Some(ProofFormat::Binary));
        assert_eq!(parse_format("b64"), Some(ProofFormat::Base64));
        assert_eq!(parse_format("json"), Some(ProofFormat::Json));
        assert_eq!(parse_format("yaml"), None);
    }

    #[test]
    fn test_garbage_binary_rejected() {
        assert!(deserialize_proof(&[0xff; 40], ProofFormat::Binary).is_err());
        assert!(deserialize_proof(b"!!!", ProofFormat::Base64).is_err());
        assert!(deserialize_proof(b"{}", ProofFormat::Json).is_err());
    }
}
