//! Deployment configuration
//!
//! JSON document describing the token and the sale of one deployment.
//! Every field is optional and falls back to the FIT mainnet values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::MAX_DECIMALS;
use crate::sale::SaleParams;
use crate::token::TokenMetadata;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleConfig {
    pub token: TokenMetadata,
    pub sale: SaleParams,
}

impl SaleConfig {
    /// Parse and validate a config from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SaleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.symbol.is_empty() {
            return Err(ConfigError::Invalid("token symbol cannot be empty".into()));
        }
        if self.token.decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "token decimals {} above {}",
                self.token.decimals, MAX_DECIMALS
            )));
        }
        if self.sale.funding_goal > self.token.total_supply {
            return Err(ConfigError::Invalid(format!(
                "funding goal {} exceeds total supply {}",
                self.sale.funding_goal, self.token.total_supply
            )));
        }
        self.sale
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::amount::Amount;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = SaleConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SaleConfig::default());
        assert_eq!(config.token.symbol, "FIT");
        assert_eq!(config.sale.start_time, 1_512_381_600);
        assert_eq!(config.sale.end_time, 1_517_410_800);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "sale": {
                "wallet": "0x00000000000000000000000000000000000000cc",
                "start_time": 10,
                "end_time": 20,
                "rate": 1000,
                "rate_soft": 1200,
                "soft_cap": "12000",
                "funding_goal": "1000000"
            }
        }"#;
        let config = SaleConfig::from_json_str(json).unwrap();
        assert_eq!(config.sale.wallet, Address::from_low_u8(0xcc));
        assert_eq!(config.sale.soft_cap, Amount::from(12_000u64));
        assert_eq!(config.token, TokenMetadata::default());
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = SaleConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(SaleConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = SaleConfig::default();
        config.sale.funding_goal = config.token.total_supply + Amount::one();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SaleConfig::default();
        config.sale.rate = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            SaleConfig::from_json_str(r#"{"sale": {"rate": "many"}}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SaleConfig::load(Path::new("/nonexistent/sale.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
