// Amounts are EVM-style 256-bit unsigned integers expressed in base units
// (wei for the native currency, 10^-18 FIT for the token).

use primitive_types::U256;
use thiserror::Error;

pub type Amount = U256;

// 18 decimals for the native currency: 10^18 wei = 1 ether
pub const ETHER_DECIMALS: u8 = 18;

// 18 decimals for the FIT token
pub const TOKEN_DECIMALS: u8 = 18;

// Largest exponent for which 10^n still fits in a U256
pub const MAX_DECIMALS: u8 = 77;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid digit in amount '{0}'")]
    InvalidDigit(String),

    #[error("Too many fractional digits: {found} given, at most {max} allowed")]
    TooPrecise { max: u8, found: usize },

    #[error("Decimals {0} out of range")]
    DecimalsOutOfRange(u8),

    #[error("Amount overflow")]
    Overflow,
}

/// 10^decimals as an Amount
pub fn unit(decimals: u8) -> Result<Amount, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::DecimalsOutOfRange(decimals));
    }
    Ok(U256::exp10(decimals as usize))
}

/// Whole units scaled to base units: `whole * 10^decimals`
pub fn units(whole: u64, decimals: u8) -> Result<Amount, AmountError> {
    unit(decimals)?
        .checked_mul(Amount::from(whole))
        .ok_or(AmountError::Overflow)
}

/// Parse a decimal string such as "16187.5" into base units.
///
/// The fractional part may not carry more digits than `decimals`,
/// so the conversion never rounds.
pub fn parse_units(value: &str, decimals: u8) -> Result<Amount, AmountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Empty);
    }

    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(AmountError::InvalidDigit(value.to_owned()));
    }

    if fraction.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            max: decimals,
            found: fraction.len(),
        });
    }

    let scale = unit(decimals)?;
    let whole = if whole.is_empty() {
        Amount::zero()
    } else {
        Amount::from_dec_str(whole).map_err(|_| AmountError::Overflow)?
    };

    let mut total = whole.checked_mul(scale).ok_or(AmountError::Overflow)?;
    if !fraction.is_empty() {
        let padding = unit(decimals - fraction.len() as u8)?;
        let fraction = Amount::from_dec_str(fraction).map_err(|_| AmountError::Overflow)?;
        let fraction = fraction.checked_mul(padding).ok_or(AmountError::Overflow)?;
        total = total.checked_add(fraction).ok_or(AmountError::Overflow)?;
    }

    Ok(total)
}

/// Format base units back to a decimal string, trimming trailing zeros
pub fn format_units(value: Amount, decimals: u8) -> String {
    let scale = match unit(decimals) {
        Ok(scale) => scale,
        Err(_) => return value.to_string(),
    };

    let whole = value / scale;
    let fraction = value % scale;
    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Serde helper: (de)serialize an Amount as a decimal string of base units.
///
/// `primitive-types` uses 0x-prefixed hex by default, which is unreadable in
/// hand-edited configuration files.
pub mod dec_string {
    use super::Amount;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value)
    }

    fn parse<E: Error>(value: &str) -> Result<Amount, E> {
        Amount::from_dec_str(value.trim())
            .map_err(|e| E::custom(format!("invalid amount '{}': {:?}", value, e)))
    }

    /// Same encoding for an optional amount, absent or null as None
    pub mod option {
        use super::Amount;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<Amount>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&value.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Amount>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|value| super::parse(&value))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(units(10, 18).unwrap(), Amount::from(10_000_000_000_000_000_000u128));
        assert_eq!(units(0, 18).unwrap(), Amount::zero());
        assert_eq!(units(5, 0).unwrap(), Amount::from(5u64));
        assert_eq!(unit(78), Err(AmountError::DecimalsOutOfRange(78)));
    }

    #[test]
    fn test_parse_units_fraction() {
        // 16187.5 ether
        assert_eq!(
            parse_units("16187.5", ETHER_DECIMALS).unwrap(),
            Amount::from(16_187_500_000_000_000_000_000u128)
        );
        assert_eq!(parse_units("0.000000000000000001", 18).unwrap(), Amount::one());
        assert_eq!(parse_units(".5", 1).unwrap(), Amount::from(5u64));
        assert_eq!(parse_units("7.", 2).unwrap(), Amount::from(700u64));
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert_eq!(parse_units("", 18), Err(AmountError::Empty));
        assert_eq!(parse_units(".", 18), Err(AmountError::Empty));
        assert!(matches!(parse_units("1e5", 18), Err(AmountError::InvalidDigit(_))));
        assert!(matches!(parse_units("-1", 18), Err(AmountError::InvalidDigit(_))));
        assert_eq!(
            parse_units("1.123", 2),
            Err(AmountError::TooPrecise { max: 2, found: 3 })
        );
    }

    #[test]
    fn test_format_units() {
        let value = parse_units("16187.5", 18).unwrap();
        assert_eq!(format_units(value, 18), "16187.5");
        assert_eq!(format_units(units(1000, 18).unwrap(), 18), "1000");
        assert_eq!(format_units(Amount::one(), 18), "0.000000000000000001");
    }

    #[test]
    fn test_dec_string_serde() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Wrapper {
            #[serde(with = "dec_string")]
            value: Amount,
        }

        let wrapper = Wrapper {
            value: units(777_000_000, 18).unwrap(),
        };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(json, r#"{"value":"777000000000000000000000000"}"#);
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), wrapper);
        assert!(serde_json::from_str::<Wrapper>(r#"{"value":"12x"}"#).is_err());
    }

    #[test]
    fn test_optional_dec_string_serde() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Wrapper {
            #[serde(default, with = "dec_string::option")]
            value: Option<Amount>,
        }

        let parsed: Wrapper = serde_json::from_str(r#"{"value":"1000"}"#).unwrap();
        assert_eq!(parsed.value, Some(Amount::from(1000u64)));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"{"value":"1000"}"#);

        assert_eq!(serde_json::from_str::<Wrapper>("{}").unwrap().value, None);
        assert_eq!(serde_json::from_str::<Wrapper>(r#"{"value":null}"#).unwrap().value, None);

        let err = serde_json::from_str::<Wrapper>(r#"{"value":"1.5"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid amount '1.5'"));
    }
}
