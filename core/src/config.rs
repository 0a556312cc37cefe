//! Client configuration.
//!
//! Credentials and the project id are supplied programmatically; there is no
//! config file. `from_env` is a convenience for binaries and scripts.

use crate::error::{ApiError, Result};
use crate::signing::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://freedcamp.com/api/v1";
pub const DEFAULT_PROJECT_ID: u64 = 3_369_926;
/// Largest page the listing endpoint serves.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

pub const ENV_API_KEY: &str = "FREEDCAMP_API_KEY";
pub const ENV_API_SECRET: &str = "FREEDCAMP_API_SECRET";
pub const ENV_PROJECT_ID: &str = "FREEDCAMP_PROJECT_ID";
pub const ENV_BASE_URL: &str = "FREEDCAMP_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub project_id: u64,
    pub base_url: String,
    pub page_size: u32,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(api_key, api_secret),
            project_id: DEFAULT_PROJECT_ID,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_project_id(mut self, project_id: u64) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Reject settings the listing scan cannot make progress with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ApiError::Config("page size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Read the configuration from `FREEDCAMP_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::Config(format!("{key} is not set")))
        };
        let mut config = Self::new(required(ENV_API_KEY)?, required(ENV_API_SECRET)?);

        if let Some(raw) = lookup(ENV_PROJECT_ID) {
            let project_id = raw
                .trim()
                .parse()
                .map_err(|e| ApiError::Config(format!("{ENV_PROJECT_ID}={raw:?}: {e}")))?;
            config = config.with_project_id(project_id);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }
}
