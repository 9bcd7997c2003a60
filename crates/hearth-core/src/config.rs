//! Environment configuration
//!
//! Read-only options consumed across the application: API endpoint,
//! session timing, feature flags, and mapping-provider settings. The
//! struct is constructed once at startup and passed by reference to
//! consumers; there is no module-level singleton. The route resolver
//! itself never reads it.

use std::time::Duration;

/// Application feature switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Expose in-app developer tooling
    pub enable_dev_tools: bool,
    /// Emit client-side diagnostics (consumers install a `tracing`
    /// subscriber when this is set)
    pub enable_logging: bool,
}

/// Mapping-provider settings
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub api_key: String,
    pub default_zoom: u8,
    /// (latitude, longitude) the map opens on
    pub default_center: (f64, f64),
}

/// Environment configuration, initialized once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub production: bool,
    pub api_base_url: String,
    /// How long before expiry a token refresh is attempted
    pub token_refresh_buffer: Duration,
    /// Idle time after which the session is considered stale
    pub session_timeout: Duration,
    pub features: FeatureFlags,
    pub maps: MapSettings,
}

impl Default for Environment {
    /// Development defaults: local API, tooling and logging on
    fn default() -> Self {
        Self {
            production: false,
            api_base_url: "http://localhost:4000/api".to_string(),
            token_refresh_buffer: Duration::from_secs(5 * 60),
            session_timeout: Duration::from_secs(30 * 60),
            features: FeatureFlags {
                enable_dev_tools: true,
                enable_logging: true,
            },
            maps: MapSettings {
                api_key: String::new(),
                default_zoom: 12,
                default_center: (53.3498, -6.2603),
            },
        }
    }
}

impl Environment {
    /// The shipped production configuration
    pub fn production() -> Self {
        Self {
            production: true,
            api_base_url: "https://api.hearthcrm.com/v1".to_string(),
            features: FeatureFlags {
                enable_dev_tools: false,
                enable_logging: false,
            },
            ..Self::default()
        }
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn token_refresh_buffer(mut self, buffer: Duration) -> Self {
        self.token_refresh_buffer = buffer;
        self
    }

    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn map_api_key(mut self, key: impl Into<String>) -> Self {
        self.maps.api_key = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_preset() {
        let env = Environment::production();
        assert!(env.production);
        assert!(!env.features.enable_dev_tools);
        assert!(!env.features.enable_logging);
        assert_eq!(env.api_base_url, "https://api.hearthcrm.com/v1");
        assert_eq!(env.token_refresh_buffer, Duration::from_secs(300));
        assert_eq!(env.session_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn test_builder_overrides() {
        let env = Environment::production()
            .api_base_url("https://staging.hearthcrm.com/v1")
            .session_timeout(Duration::from_secs(600))
            .map_api_key("k-test");
        assert!(env.production);
        assert_eq!(env.api_base_url, "https://staging.hearthcrm.com/v1");
        assert_eq!(env.session_timeout, Duration::from_secs(600));
        assert_eq!(env.maps.api_key, "k-test");
    }
}
