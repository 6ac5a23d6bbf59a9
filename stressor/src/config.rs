//! Process configuration
//!
//! Both binaries are configured from environment variables. Unset or
//! unparseable numeric values keep their defaults.

use std::env;
use std::time::Duration;

use crate::generator::{GeneratorError, Scenario, parse_weights};

const MIB: u64 = 1024 * 1024;

/// Resource-consuming server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Maximum accepted upload body, in MiB
    pub max_upload_mb: u64,
    /// Upper bound for a single `/allocate` request, in MiB
    pub max_allocate_mb: u64,
    /// Upper bound for a single `/generate` response, in MiB
    pub max_generate_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_mb: 512,
            max_allocate_mb: 4096,
            max_generate_mb: 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST")
            && !host.is_empty()
        {
            config.host = host;
        }
        if let Some(port) = lookup("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }
        if let Some(val) = lookup("MAX_UPLOAD_MB")
            && let Ok(mb) = val.parse()
        {
            config.max_upload_mb = mb;
        }
        if let Some(val) = lookup("MAX_ALLOCATE_MB")
            && let Ok(mb) = val.parse()
        {
            config.max_allocate_mb = mb;
        }
        if let Some(val) = lookup("MAX_GENERATE_MB")
            && let Ok(mb) = val.parse()
        {
            config.max_generate_mb = mb;
        }

        config
    }

    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(MIB)).unwrap_or(usize::MAX)
    }
}

/// Load generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Base URL of the target server, routes are appended verbatim
    pub base_url: String,
    /// Pause between two scenarios
    pub interval: Duration,
    /// Scenario weights; `None` picks every scenario with equal probability
    pub weights: Option<Vec<(Scenario, u32)>>,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
    /// Stop after this many scenarios (0 = run forever)
    pub max_iterations: u64,
    /// Per-request timeout (`None` = wait as long as the server takes)
    pub request_timeout: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            interval: Duration::from_secs(10),
            weights: None,
            seed: None,
            max_iterations: 0,
            request_timeout: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, GeneratorError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Fails on a malformed `SCENARIO_WEIGHTS`; any other bad value keeps its
    /// default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GeneratorError> {
        let mut config = Self::default();

        if let Some(url) = lookup("BASE_URL")
            && !url.is_empty()
        {
            config.base_url = url;
        }
        if let Some(val) = lookup("INTERVAL_SECS")
            && let Ok(secs) = val.parse::<u64>()
            && secs > 0
        {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(val) = lookup("SCENARIO_WEIGHTS")
            && !val.trim().is_empty()
        {
            config.weights = Some(parse_weights(&val)?);
        }
        if let Some(val) = lookup("GENERATOR_SEED")
            && let Ok(seed) = val.parse()
        {
            config.seed = Some(seed);
        }
        if let Some(val) = lookup("MAX_ITERATIONS")
            && let Ok(n) = val.parse()
        {
            config.max_iterations = n;
        }
        if let Some(val) = lookup("REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes(), 512 * 1024 * 1024);
    }

    #[test]
    fn test_server_config_from_lookup() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("MAX_ALLOCATE_MB", "256"),
            ("MAX_GENERATE_MB", "not-a-number"),
        ]));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_allocate_mb, 256);
        assert_eq!(config.max_generate_mb, 1024);
    }

    #[test]
    fn test_default_generator_config() {
        let config = GeneratorConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.interval, Duration::from_secs(10));
        assert!(config.weights.is_none());
        assert_eq!(config.max_iterations, 0);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_generator_config_from_lookup() {
        let config = GeneratorConfig::from_lookup(lookup_from(&[
            ("BASE_URL", "http://target:3000"),
            ("INTERVAL_SECS", "2"),
            ("SCENARIO_WEIGHTS", "memory=3, cpu=1"),
            ("GENERATOR_SEED", "42"),
            ("MAX_ITERATIONS", "5"),
            ("REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://target:3000");
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(
            config.weights,
            Some(vec![(Scenario::Memory, 3), (Scenario::Cpu, 1)])
        );
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_iterations, 5);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_zero_interval_keeps_default() {
        let config = GeneratorConfig::from_lookup(lookup_from(&[("INTERVAL_SECS", "0")])).unwrap();
        assert_eq!(config.interval, Duration::from_secs(10));
    }

    #[test]
    fn test_generator_config_rejects_unknown_scenario() {
        let result = GeneratorConfig::from_lookup(lookup_from(&[("SCENARIO_WEIGHTS", "disk=1")]));
        assert!(matches!(result, Err(GeneratorError::UnknownScenario(_))));
    }
}
