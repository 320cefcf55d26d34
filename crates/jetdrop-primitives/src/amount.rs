//! Token amounts in minimal units
//!
//! Amounts are unsigned 128-bit integers counting minimal units ("nano"),
//! with 9 decimal places per whole token. Two textual inputs are accepted:
//! a raw minimal-unit integer string and a decimal token string ("1.5" is
//! 1_500_000_000 nano). Which one applies is decided by the caller's
//! dispatch mode, not guessed from the input.

use std::fmt;

use crate::error::AmountError;

/// Decimal places per whole token
pub const DECIMALS: u32 = 9;

/// Minimal units in one whole token
const ONE_TOKEN: u128 = 1_000_000_000;

/// An unsigned 128-bit token amount in minimal units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    /// The zero amount
    pub const ZERO: Self = Self(0);

    /// Create from minimal units
    pub const fn from_nano(nano: u128) -> Self {
        Self(nano)
    }

    /// The amount in minimal units
    pub const fn nano(&self) -> u128 {
        self.0
    }

    /// True if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a raw minimal-unit integer string
    pub fn from_nano_str(input: &str) -> Result<Self, AmountError> {
        let digits = check_digits(input)?;
        digits.parse::<u128>().map(Self).map_err(|_| AmountError::Overflow)
    }

    /// Parse a decimal token string with up to 9 fractional digits
    pub fn from_decimal_str(input: &str) -> Result<Self, AmountError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AmountError::Empty);
        }
        if input.starts_with('-') {
            return Err(AmountError::Negative);
        }

        let (whole, fraction) = match input.split_once('.') {
            Some(parts) => parts,
            None => (input, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::NotNumeric);
        }

        let whole_units: u128 = if whole.is_empty() {
            0
        } else {
            check_digits(whole)?
                .parse()
                .map_err(|_| AmountError::Overflow)?
        };

        if fraction.len() > DECIMALS as usize {
            return Err(AmountError::TooManyDecimals { max: DECIMALS });
        }
        let frac_units: u128 = if fraction.is_empty() {
            0
        } else {
            let scale = 10u128.pow(DECIMALS - fraction.len() as u32);
            let parsed: u128 = check_digits(fraction)?
                .parse()
                .map_err(|_| AmountError::Overflow)?;
            parsed * scale
        };

        whole_units
            .checked_mul(ONE_TOKEN)
            .and_then(|n| n.checked_add(frac_units))
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Checked addition in minimal units
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Render as a decimal token string with trailing zeros trimmed
    pub fn to_decimal_string(&self) -> String {
        let whole = self.0 / ONE_TOKEN;
        let frac = self.0 % ONE_TOKEN;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:09}", frac);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

/// Reject empty, signed, or non-digit input before numeric parsing
fn check_digits(input: &str) -> Result<&str, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') {
        return Err(AmountError::Negative);
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::NotNumeric);
    }
    Ok(input)
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl serde::Serialize for TokenAmount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for TokenAmount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_nano_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_parse_whole_and_fraction() {
        assert_eq!(
            TokenAmount::from_decimal_str("1.5").unwrap(),
            TokenAmount::from_nano(1_500_000_000)
        );
        assert_eq!(
            TokenAmount::from_decimal_str("0.000000001").unwrap(),
            TokenAmount::from_nano(1)
        );
        assert_eq!(
            TokenAmount::from_decimal_str("42").unwrap(),
            TokenAmount::from_nano(42_000_000_000)
        );
        assert_eq!(
            TokenAmount::from_decimal_str(".25").unwrap(),
            TokenAmount::from_nano(250_000_000)
        );
    }

    #[test]
    fn test_decimal_parse_rejects_excess_precision() {
        assert_eq!(
            TokenAmount::from_decimal_str("1.0000000001").unwrap_err(),
            AmountError::TooManyDecimals { max: DECIMALS }
        );
    }

    #[test]
    fn test_decimal_parse_rejects_garbage() {
        assert_eq!(
            TokenAmount::from_decimal_str("-3").unwrap_err(),
            AmountError::Negative
        );
        assert_eq!(
            TokenAmount::from_decimal_str("1,5").unwrap_err(),
            AmountError::NotNumeric
        );
        assert_eq!(
            TokenAmount::from_decimal_str(".").unwrap_err(),
            AmountError::NotNumeric
        );
        assert_eq!(
            TokenAmount::from_decimal_str("").unwrap_err(),
            AmountError::Empty
        );
    }

    #[test]
    fn test_nano_parse_exact() {
        assert_eq!(
            TokenAmount::from_nano_str("123456789").unwrap(),
            TokenAmount::from_nano(123_456_789)
        );
        assert!(TokenAmount::from_nano_str("1.5").is_err());
    }

    #[test]
    fn test_nano_parse_overflow() {
        // one digit past u128::MAX
        let too_big = format!("{}9", u128::MAX);
        assert_eq!(
            TokenAmount::from_nano_str(&too_big).unwrap_err(),
            AmountError::Overflow
        );
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        assert_eq!(TokenAmount::from_nano(1_500_000_000).to_string(), "1.5");
        assert_eq!(TokenAmount::from_nano(2_000_000_000).to_string(), "2");
        assert_eq!(TokenAmount::from_nano(1).to_string(), "0.000000001");
        assert_eq!(TokenAmount::ZERO.to_string(), "0");
    }

    #[test]
    fn test_checked_add() {
        let a = TokenAmount::from_nano(u128::MAX - 1);
        assert_eq!(a.checked_add(TokenAmount::from_nano(1)), Some(TokenAmount::from_nano(u128::MAX)));
        assert_eq!(a.checked_add(TokenAmount::from_nano(2)), None);
    }

    #[test]
    fn test_serde_uses_nano_string() {
        let amount = TokenAmount::from_nano(1_500_000_000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1500000000\"");
        let recovered: TokenAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, recovered);
    }
}
