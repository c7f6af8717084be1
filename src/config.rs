use crate::error::{DisclosureError, Result};
use crate::schema::Unit;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DART_API_BASE_URL: &str = "https://opendart.fss.or.kr/api";
pub const DART_VIEWER_BASE_URL: &str = "https://dart.fss.or.kr";
pub const API_KEY_VAR: &str = "DART_API_KEY";

/// Connection settings for the regulator API and its filing viewer.
#[derive(Debug, Clone)]
pub struct DartConfig {
    /// `crtfc_key` issued by the regulator
    pub api_key: String,
    pub api_base_url: String,
    /// Host serving filing main pages and the document viewer
    pub viewer_base_url: String,
    pub timeout: Duration,
}

impl Default for DartConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DART_API_BASE_URL.to_string(),
            viewer_base_url: DART_VIEWER_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl DartConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(DisclosureError::MissingCredential(format!(
                "an API key is required (set {})",
                API_KEY_VAR
            )));
        }
        Ok(())
    }

    /// Reads the key from the environment, loading a `.env` file first if
    /// one is present.
    #[cfg(feature = "dart")]
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| {
            DisclosureError::MissingCredential(format!("{} environment variable not set", API_KEY_VAR))
        })?;
        let config = Self::new(api_key);
        config.validate()?;
        Ok(config)
    }
}

/// What to build: statement scope and reporting unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Consolidated (`CFS`) rather than separate (`OFS`) statements
    pub consolidated: bool,
    pub unit: Unit,
}

impl BuilderConfig {
    pub fn new(consolidated: bool, unit: Unit) -> Self {
        Self { consolidated, unit }
    }
}
