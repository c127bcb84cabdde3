//! Process-wide configuration, built once at startup and passed down.

use crate::error::ConfigError;
use crate::resolve::DEFAULT_FRESHNESS_DAYS;
use crate::scorer::{AuthorityScorer, OpenPageRankClient, SyntheticScorer};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_BIND: &str = "0.0.0.0:4000";
pub const DEFAULT_DB_PATH: &str = "~/.config/seoscope/seoscope.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub db_path: String,
    pub opr_api_key: Option<String>,
    /// Score domains with [`SyntheticScorer`] instead of Open PageRank.
    pub use_synthetic_score: bool,
    /// CORS origin; any origin when unset.
    pub allowed_origin: Option<String>,
    pub probe_timeout_secs: u64,
    pub scorer_timeout_secs: u64,
    pub freshness_days: i64,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
            opr_api_key: None,
            use_synthetic_score: false,
            allowed_origin: None,
            probe_timeout_secs: 10,
            scorer_timeout_secs: 10,
            freshness_days: DEFAULT_FRESHNESS_DAYS,
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_key = self
            .opr_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !self.use_synthetic_score && !has_key {
            return Err(ConfigError::MissingApiKey);
        }
        if self.freshness_days <= 0 {
            return Err(ConfigError::Invalid(format!(
                "freshness_days must be positive, got {}",
                self.freshness_days
            )));
        }
        if self.probe_timeout_secs == 0 || self.scorer_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least 1 second".to_string()));
        }
        Ok(())
    }

    /// Database path with `~` expanded.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.db_path).as_ref())
    }

    pub fn freshness(&self) -> chrono::Duration {
        chrono::Duration::days(self.freshness_days)
    }

    pub fn build_scorer(&self) -> Result<Arc<dyn AuthorityScorer>, ConfigError> {
        if self.use_synthetic_score {
            return Ok(Arc::new(SyntheticScorer::new()));
        }

        let key = self.opr_api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;
        let client = OpenPageRankClient::new(key, self.scorer_timeout_secs)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_rejected() {
        let config = AppConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));
        assert!(config.build_scorer().is_err());
    }

    #[test]
    fn test_synthetic_mode_needs_no_key() {
        let config = AppConfig {
            use_synthetic_score: true,
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.build_scorer().unwrap().is_synthetic());
    }

    #[test]
    fn test_key_builds_real_scorer() {
        let config = AppConfig {
            opr_api_key: Some("secret".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.build_scorer().unwrap().is_synthetic());
    }

    #[test]
    fn test_non_positive_freshness_is_rejected() {
        let config = AppConfig {
            use_synthetic_score: true,
            freshness_days: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_plain_database_path_is_kept() {
        let config = AppConfig {
            db_path: "/tmp/seoscope/test.db".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/seoscope/test.db"));
    }
}
