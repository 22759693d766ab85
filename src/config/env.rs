//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration. A `.env` file
//! in the working directory is loaded into the process environment first.

use std::env;

/// Environment variable prefix for gateway-only settings
const ENV_PREFIX: &str = "PORTAINER_GATEWAY";

/// Configuration read from environment variables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Portainer URL from PORTAINER_URL
    pub url: Option<String>,
    /// API key from PORTAINER_API_KEY
    pub api_key: Option<String>,
    /// Timeout from PORTAINER_TIMEOUT
    pub timeout: Option<u64>,
    /// Skip TLS verification from PORTAINER_INSECURE
    pub insecure: Option<bool>,
    /// Listen address from PORTAINER_GATEWAY_LISTEN
    pub listen: Option<String>,
    /// Log level from PORTAINER_GATEWAY_LOG
    pub log: Option<String>,
}

impl EnvConfig {
    /// Load `.env` (without overriding set variables), then read the environment
    pub fn load() -> Self {
        // A missing .env is the normal case
        let _ = dotenvy::dotenv();
        Self::load_from(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let prefixed = |name: &str| get(&format!("{ENV_PREFIX}_{name}"));

        Self {
            url: get("PORTAINER_URL"),
            api_key: get("PORTAINER_API_KEY"),
            timeout: get("PORTAINER_TIMEOUT").and_then(|v| v.parse().ok()),
            insecure: get("PORTAINER_INSECURE").map(|v| parse_bool(&v)),
            listen: prefixed("LISTEN"),
            log: prefixed("LOG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.url.is_some()
            || self.api_key.is_some()
            || self.timeout.is_some()
            || self.insecure.is_some()
            || self.listen.is_some()
            || self.log.is_some()
    }

    /// Print current environment configuration, API key masked
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  PORTAINER_URL:            {:?}", self.url);
        println!(
            "  PORTAINER_API_KEY:        {}",
            if self.api_key.is_some() { "<set>" } else { "None" }
        );
        println!("  PORTAINER_TIMEOUT:        {:?}", self.timeout);
        println!("  PORTAINER_INSECURE:       {:?}", self.insecure);
        println!("  {ENV_PREFIX}_LISTEN: {:?}", self.listen);
        println!("  {ENV_PREFIX}_LOG:    {:?}", self.log);
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Print all supported environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  PORTAINER_URL             Portainer base URL (required)");
    println!("  PORTAINER_API_KEY         Portainer API access token (required)");
    println!("  PORTAINER_TIMEOUT         Request timeout in seconds");
    println!("  PORTAINER_INSECURE        Accept invalid TLS certificates (true/false)");
    println!("  {ENV_PREFIX}_LISTEN  Address the gateway listens on");
    println!("  {ENV_PREFIX}_LOG     Log level (trace, debug, info, warn, error)");
    println!();
    println!("Variables may also be placed in a .env file in the working directory.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.url.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_load_from_lookup() {
        let config = EnvConfig::load_from(lookup(&[
            ("PORTAINER_URL", "https://portainer.local:9443"),
            ("PORTAINER_API_KEY", "ptr_abc"),
            ("PORTAINER_TIMEOUT", "60"),
            ("PORTAINER_INSECURE", "yes"),
            ("PORTAINER_GATEWAY_LISTEN", "127.0.0.1:9000"),
        ]));

        assert_eq!(config.url.as_deref(), Some("https://portainer.local:9443"));
        assert_eq!(config.api_key.as_deref(), Some("ptr_abc"));
        assert_eq!(config.timeout, Some(60));
        assert_eq!(config.insecure, Some(true));
        assert_eq!(config.listen.as_deref(), Some("127.0.0.1:9000"));
        assert!(config.has_any());
    }

    #[test]
    fn test_blank_and_invalid_values_ignored() {
        let config = EnvConfig::load_from(lookup(&[
            ("PORTAINER_URL", "   "),
            ("PORTAINER_TIMEOUT", "soon"),
            ("PORTAINER_INSECURE", "nope"),
        ]));

        assert!(config.url.is_none());
        assert!(config.timeout.is_none());
        assert_eq!(config.insecure, Some(false));
    }
}
