//! 256-bit hashes used for commitment roots, tree nodes, and binding digests
//!
//! All hashing in jetdrop is SHA-256. Tree hashing uses a single-byte tag
//! prefix to separate leaf hashes from interior-node hashes, so a leaf image
//! can never be reinterpreted as an interior node.

use sha2::{Digest, Sha256};

/// A 256-bit hash (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Create a zero hash
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Create from bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from a hex string, with or without a `0x` prefix
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes: Vec<u8> = hex::decode(hex)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Convert to hex string (lowercase, no 0x prefix)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Compute SHA-256 over raw data
    pub fn sha256(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Compute SHA-256 over a tag byte followed by each part in order
    ///
    /// The tag provides domain separation between hash uses that would
    /// otherwise accept the same byte layout.
    pub fn sha256_tagged(tag: u8, parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([tag]);
        for part in parts {
            hasher.update(part);
        }
        let result = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl serde::Serialize for Hash256 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Hash256 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_from_hex() {
        let hex = "abcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890";
        let hash = Hash256::from_hex(hex).unwrap();
        assert_eq!(hash.to_hex(), hex);
    }

    #[test]
    fn test_hash_from_hex_with_prefix() {
        let hex = "0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890";
        let hash = Hash256::from_hex(hex).unwrap();
        assert_eq!(hash.to_hex(), &hex[2..]);
    }

    #[test]
    fn test_hash_from_hex_rejects_short_input() {
        assert!(Hash256::from_hex("abcd").is_err());
    }

    #[test]
    fn test_sha256_is_deterministic() {
        assert_eq!(Hash256::sha256(b"entries"), Hash256::sha256(b"entries"));
        assert_ne!(Hash256::sha256(b"entries"), Hash256::sha256(b"entriez"));
    }

    #[test]
    fn test_tag_separates_domains() {
        let leaf = Hash256::sha256_tagged(0x00, &[b"payload"]);
        let node = Hash256::sha256_tagged(0x01, &[b"payload"]);
        assert_ne!(leaf, node);
    }

    #[test]
    fn test_tagged_matches_concatenation() {
        let split = Hash256::sha256_tagged(0x01, &[b"left", b"right"]);
        let joined = Hash256::sha256_tagged(0x01, &[b"leftright"]);
        assert_eq!(split, joined);
    }

    #[test]
    fn test_hash_serialization() {
        let hash = Hash256::sha256(b"root");
        let json = serde_json::to_string(&hash).unwrap();
        let recovered: Hash256 = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, recovered);
    }
}
