use crate::domain::Decimal;
use crate::engine::DEFAULT_INCLUSION_RATE;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub transactions_csv: PathBuf,
    pub tax_year: Option<i32>,
    pub inclusion_rate: Decimal,
    pub asset: String,
    pub sort_input: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let transactions_csv = env_map
            .get("ACB_TRANSACTIONS_CSV")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnv("ACB_TRANSACTIONS_CSV".to_string()))?;

        let tax_year = match env_map.get("ACB_TAX_YEAR").map(|s| s.trim()) {
            None | Some("") => None,
            Some(s) => Some(s.parse::<i32>().map_err(|_| {
                ConfigError::InvalidValue(
                    "ACB_TAX_YEAR".to_string(),
                    "must be a valid year".to_string(),
                )
            })?),
        };

        let inclusion_rate = match env_map.get("ACB_INCLUSION_RATE").map(|s| s.trim()) {
            None | Some("") => DEFAULT_INCLUSION_RATE,
            Some(s) => {
                let rate = Decimal::from_str_canonical(s).map_err(|_| {
                    ConfigError::InvalidValue(
                        "ACB_INCLUSION_RATE".to_string(),
                        "must be a decimal number".to_string(),
                    )
                })?;
                if rate.is_negative() || rate > Decimal::one() {
                    return Err(ConfigError::InvalidValue(
                        "ACB_INCLUSION_RATE".to_string(),
                        format!("must be between 0 and 1, got {}", rate),
                    ));
                }
                rate
            }
        };

        let asset = env_map
            .get("ACB_ASSET")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or("BTC")
            .to_string();

        let sort_input = match env_map
            .get("ACB_SORT_INPUT")
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .as_deref()
            .unwrap_or("true")
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ACB_SORT_INPUT".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            transactions_csv,
            tax_year,
            inclusion_rate,
            asset,
            sort_input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "ACB_TRANSACTIONS_CSV".to_string(),
            "/tmp/transactions.csv".to_string(),
        );
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.transactions_csv, PathBuf::from("/tmp/transactions.csv"));
        assert_eq!(config.tax_year, None);
        assert_eq!(config.inclusion_rate, DEFAULT_INCLUSION_RATE);
        assert_eq!(config.asset, "BTC");
        assert!(config.sort_input);
    }

    #[test]
    fn test_missing_transactions_csv() {
        let mut env_map = setup_required_env();
        env_map.remove("ACB_TRANSACTIONS_CSV");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "ACB_TRANSACTIONS_CSV"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_overrides() {
        let mut env_map = setup_required_env();
        env_map.insert("ACB_TAX_YEAR".to_string(), "2024".to_string());
        env_map.insert("ACB_INCLUSION_RATE".to_string(), "0.6667".to_string());
        env_map.insert("ACB_ASSET".to_string(), "ETH".to_string());
        env_map.insert("ACB_SORT_INPUT".to_string(), "false".to_string());

        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.tax_year, Some(2024));
        assert_eq!(config.inclusion_rate.to_string(), "0.6667");
        assert_eq!(config.asset, "ETH");
        assert!(!config.sort_input);
    }

    #[test]
    fn test_blank_optional_values_fall_back_to_defaults() {
        let mut env_map = setup_required_env();
        env_map.insert("ACB_TAX_YEAR".to_string(), "".to_string());
        env_map.insert("ACB_INCLUSION_RATE".to_string(), "  ".to_string());
        env_map.insert("ACB_ASSET".to_string(), "".to_string());
        env_map.insert("ACB_SORT_INPUT".to_string(), " ".to_string());

        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.tax_year, None);
        assert_eq!(config.inclusion_rate, DEFAULT_INCLUSION_RATE);
        assert_eq!(config.asset, "BTC");
        assert!(config.sort_input);
    }

    #[test]
    fn test_invalid_tax_year() {
        let mut env_map = setup_required_env();
        env_map.insert("ACB_TAX_YEAR".to_string(), "last year".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "ACB_TAX_YEAR"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_inclusion_rate_out_of_range() {
        let mut env_map = setup_required_env();
        env_map.insert("ACB_INCLUSION_RATE".to_string(), "1.5".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "ACB_INCLUSION_RATE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_sort_input() {
        let mut env_map = setup_required_env();
        env_map.insert("ACB_SORT_INPUT".to_string(), "sometimes".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "ACB_SORT_INPUT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
