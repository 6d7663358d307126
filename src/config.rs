use std::time::Duration;

use crate::{matches::TransitionPolicy, retry::RetryPolicy};

/// Runtime configuration, read from the environment with defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// In-memory repositories are used when unset
    pub database_url: Option<String>,
    pub allow_direct_completion: bool,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            allow_direct_completion: false,
            retry_max_attempts: 3,
            retry_base_delay_ms: 50,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            allow_direct_completion: lookup("ALLOW_DIRECT_COMPLETION")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.allow_direct_completion),
            retry_max_attempts: lookup("RETRY_MAX_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_max_attempts),
            retry_base_delay_ms: lookup("RETRY_BASE_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_base_delay_ms),
        }
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        TransitionPolicy::new().with_direct_completion(self.allow_direct_completion)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config_from(&[]), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/matchbook"),
            ("ALLOW_DIRECT_COMPLETION", "true"),
            ("RETRY_MAX_ATTEMPTS", "5"),
        ]);

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(config.database_url.is_some());
        assert!(config.transition_policy().allow_direct_completion);
        assert_eq!(config.retry_policy().max_attempts, 5);
    }

    #[test]
    fn ignores_unparseable_numbers() {
        let config = config_from(&[("RETRY_MAX_ATTEMPTS", "many")]);
        assert_eq!(config.retry_max_attempts, 3);
    }
}
