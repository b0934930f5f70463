//! Client configuration
//!
//! A plain struct with a `Default` matching the public endpoint, named
//! presets and chainable setters.

use crate::core::constants::{BASE_URL, USER_AGENT};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Endpoint the query string is appended to
    pub base_url: String,
    /// Optional API key added to requests that do not carry their own
    pub api_key: Option<String>,
    /// Reject requests without `center` before anything is fetched
    pub require_center: bool,
    /// Give up on a load after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: None,
            require_center: false,
            timeout: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Unified configuration presets for ClientConfig
impl ClientConfig {
    /// Validates `center` and bounds every load to 30 seconds.
    pub fn strict() -> Self {
        Self {
            require_center: true,
            timeout: Some(Duration::from_secs(30)),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_require_center(mut self, require: bool) -> Self {
        self.require_center = require;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
