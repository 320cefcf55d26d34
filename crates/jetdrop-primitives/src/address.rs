//! Account addresses
//!
//! An address is a workchain id plus a 256-bit account id. Two textual
//! forms are accepted everywhere an address is parsed:
//!
//! - raw: `<workchain>:<64 hex digits>`, e.g. `0:3a9f...`
//! - friendly: 48 base64 characters (standard or URL-safe alphabet)
//!   encoding 36 bytes: tag, workchain, account id, CRC-16/XMODEM checksum
//!
//! The tag byte distinguishes bounceable from non-bounceable transfers and
//! carries a test-network flag. Both properties are presentation-level:
//! they are validated on parse but do not participate in equality.

use std::fmt;
use std::str::FromStr;

use base64::Engine;

use crate::error::AddressError;

/// Tag byte for a bounceable friendly address
const TAG_BOUNCEABLE: u8 = 0x11;
/// Tag byte for a non-bounceable friendly address
const TAG_NON_BOUNCEABLE: u8 = 0x51;
/// Flag bit marking a test-network address
const FLAG_TESTNET: u8 = 0x80;

/// Byte length of a decoded friendly address
const FRIENDLY_LEN: usize = 36;

/// A workchain id plus a 256-bit account id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    workchain: i8,
    account_id: [u8; 32],
}

impl Address {
    /// Create an address from its parts
    pub const fn new(workchain: i8, account_id: [u8; 32]) -> Self {
        Self {
            workchain,
            account_id,
        }
    }

    /// The workchain id
    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    /// The 256-bit account id
    pub fn account_id(&self) -> &[u8; 32] {
        &self.account_id
    }

    /// Parse either textual form
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AddressError::Empty);
        }
        if input.contains(':') {
            Self::parse_raw(input)
        } else {
            Self::parse_friendly(input)
        }
    }

    fn parse_raw(input: &str) -> Result<Self, AddressError> {
        // parse() guarantees the separator is present
        let (wc, id) = match input.split_once(':') {
            Some(parts) => parts,
            None => return Err(AddressError::InvalidWorkchain(input.to_string())),
        };
        let workchain: i8 = wc
            .parse()
            .map_err(|_| AddressError::InvalidWorkchain(wc.to_string()))?;
        if id.len() != 64 {
            return Err(AddressError::InvalidAccountIdLength(id.len()));
        }
        let bytes = hex::decode(id).map_err(|_| AddressError::InvalidHex)?;
        let mut account_id = [0u8; 32];
        account_id.copy_from_slice(&bytes);
        Ok(Self {
            workchain,
            account_id,
        })
    }

    fn parse_friendly(input: &str) -> Result<Self, AddressError> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input)
            .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(input))
            .map_err(|_| AddressError::InvalidBase64)?;
        if decoded.len() != FRIENDLY_LEN {
            return Err(AddressError::InvalidLength(decoded.len()));
        }

        let tag = decoded[0];
        let base_tag = tag & !FLAG_TESTNET;
        if base_tag != TAG_BOUNCEABLE && base_tag != TAG_NON_BOUNCEABLE {
            return Err(AddressError::UnknownTag(tag));
        }

        let expected = crc16_xmodem(&decoded[..34]);
        let actual = u16::from_be_bytes([decoded[34], decoded[35]]);
        if expected != actual {
            return Err(AddressError::ChecksumMismatch);
        }

        let workchain = decoded[1] as i8;
        let mut account_id = [0u8; 32];
        account_id.copy_from_slice(&decoded[2..34]);
        Ok(Self {
            workchain,
            account_id,
        })
    }

    /// Render the raw form `<workchain>:<64 hex digits>`
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.account_id))
    }

    /// Render the friendly base64 form (URL-safe alphabet)
    pub fn to_friendly(&self, bounceable: bool, testnet: bool) -> String {
        let mut tag = if bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if testnet {
            tag |= FLAG_TESTNET;
        }

        let mut bytes = [0u8; FRIENDLY_LEN];
        bytes[0] = tag;
        bytes[1] = self.workchain as u8;
        bytes[2..34].copy_from_slice(&self.account_id);
        let checksum = crc16_xmodem(&bytes[..34]);
        bytes[34..36].copy_from_slice(&checksum.to_be_bytes());

        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_raw())
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// CRC-16/XMODEM over the first 34 bytes of a friendly address
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account_id() -> [u8; 32] {
        let mut id = [0u8; 32];
        for (i, byte) in id.iter_mut().enumerate() {
            *byte = (i * 7 + 3) as u8;
        }
        id
    }

    #[test]
    fn test_crc16_check_value() {
        // standard CRC-16/XMODEM check value
        assert_eq!(crc16_xmodem(b"123456789"), 0x31c3);
    }

    #[test]
    fn test_raw_roundtrip() {
        let address = Address::new(0, sample_account_id());
        let parsed = Address::parse(&address.to_raw()).unwrap();
        assert_eq!(address, parsed);
    }

    #[test]
    fn test_raw_negative_workchain() {
        let raw = format!("-1:{}", hex::encode(sample_account_id()));
        let parsed = Address::parse(&raw).unwrap();
        assert_eq!(parsed.workchain(), -1);
        assert_eq!(parsed.to_raw(), raw);
    }

    #[test]
    fn test_raw_rejects_short_account_id() {
        let err = Address::parse("0:abcd").unwrap_err();
        assert_eq!(err, AddressError::InvalidAccountIdLength(4));
    }

    #[test]
    fn test_raw_rejects_bad_hex() {
        let raw = format!("0:{}", "z".repeat(64));
        assert_eq!(Address::parse(&raw).unwrap_err(), AddressError::InvalidHex);
    }

    #[test]
    fn test_friendly_roundtrip() {
        let address = Address::new(0, sample_account_id());
        for bounceable in [true, false] {
            for testnet in [true, false] {
                let friendly = address.to_friendly(bounceable, testnet);
                assert_eq!(friendly.len(), 48);
                let parsed = Address::parse(&friendly).unwrap();
                assert_eq!(address, parsed);
            }
        }
    }

    #[test]
    fn test_friendly_and_raw_forms_agree() {
        let address = Address::new(-1, sample_account_id());
        let via_friendly = Address::parse(&address.to_friendly(true, false)).unwrap();
        let via_raw = Address::parse(&address.to_raw()).unwrap();
        assert_eq!(via_friendly, via_raw);
    }

    #[test]
    fn test_friendly_rejects_tampered_checksum() {
        let address = Address::new(0, sample_account_id());
        let friendly = address.to_friendly(true, false);
        let mut bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&friendly)
            .unwrap();
        bytes[10] ^= 0xff;
        let tampered = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes);
        assert_eq!(
            Address::parse(&tampered).unwrap_err(),
            AddressError::ChecksumMismatch
        );
    }

    #[test]
    fn test_friendly_rejects_unknown_tag() {
        let address = Address::new(0, sample_account_id());
        let friendly = address.to_friendly(true, false);
        let mut bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&friendly)
            .unwrap();
        bytes[0] = 0x22;
        let checksum = crc16_xmodem(&bytes[..34]);
        bytes[34..36].copy_from_slice(&checksum.to_be_bytes());
        let retagged = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes);
        assert_eq!(
            Address::parse(&retagged).unwrap_err(),
            AddressError::UnknownTag(0x22)
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Address::parse("  ").unwrap_err(), AddressError::Empty);
    }

    #[test]
    fn test_serde_roundtrip() {
        let address = Address::new(0, sample_account_id());
        let json = serde_json::to_string(&address).unwrap();
        let recovered: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(address, recovered);
    }

    #[test]
    fn test_serde_accepts_friendly_form() {
        let address = Address::new(0, sample_account_id());
        let json = format!("\"{}\"", address.to_friendly(true, false));
        let recovered: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(address, recovered);
    }
}
