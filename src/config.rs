use dimx_core::{Error, Result};
use dimx_search::SearchConfig;
use dimx_transaction::TransactionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for both engines, as read from a JSON file.
/// Missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub transaction: TransactionConfig,
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.overfetch_factor == 0 {
            return Err(Error::InvalidConfig(
                "search.overfetch_factor must be at least 1".to_string(),
            ));
        }
        if self.search.default_min > self.search.default_max {
            return Err(Error::InvalidConfig(format!(
                "search.default_min ({}) is above search.default_max ({})",
                self.search.default_min, self.search.default_max
            )));
        }
        if self.search.cluster_cell_size.is_nan() || self.search.cluster_cell_size <= 0.0 {
            return Err(Error::InvalidConfig(
                "search.cluster_cell_size must be positive".to_string(),
            ));
        }
        self.transaction.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"search": {{"overfetch_factor": 5}}, "transaction": {{"signing_key": "k"}}}}"#
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.search.overfetch_factor, 5);
        assert_eq!(config.search.default_max, 100.0);
        assert_eq!(config.transaction.signing_key, "k");
        assert_eq!(config.transaction.payment.max_attempts, 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = EngineConfig::default();
        assert!(config.validate().is_ok());

        config.search.cluster_cell_size = 0.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = EngineConfig::default();
        config.transaction.signing_key.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(EngineConfig::load("/nonexistent/dimx.json"), Err(Error::Io(_))));
    }
}
