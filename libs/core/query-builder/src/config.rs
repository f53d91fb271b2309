use crate::pagination::DEFAULT_LIMIT;

/// Listing defaults shared by every endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingConfig {
    /// Page size when the caller sends no usable `limit`
    pub default_limit: u64,
    /// Upper bound on `limit`; `None` disables the cap
    pub max_limit: Option<u64>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
        }
    }
}

impl ListingConfig {
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn with_max_limit(mut self, max: Option<u64>) -> Self {
        self.max_limit = max;
        self
    }
}

#[cfg(feature = "config")]
impl core_config::FromEnv for ListingConfig {
    /// `LISTING_DEFAULT_LIMIT` (default 10) and `LISTING_MAX_LIMIT`
    /// (unset or `0` leaves page size uncapped).
    fn from_env() -> Result<Self, core_config::ConfigError> {
        let default_limit = core_config::env_parse_or("LISTING_DEFAULT_LIMIT", DEFAULT_LIMIT)?;
        let max_limit = core_config::env_parse_or("LISTING_MAX_LIMIT", 0_u64)?;
        Ok(Self::default()
            .with_default_limit(default_limit)
            .with_max_limit((max_limit > 0).then_some(max_limit)))
    }
}
