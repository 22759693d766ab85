//! Configuration module
//!
//! Merges the config file, environment and command-line flags into one
//! immutable [`AppConfig`], resolved once at startup.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::portainer::ClientSettings;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Values given on the command line; highest precedence
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Option<u64>,
    pub insecure: Option<bool>,
    pub listen: Option<String>,
}

/// Resolved application configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Portainer base URL
    pub portainer_url: String,

    /// Portainer API access token
    pub portainer_api_key: String,

    /// Upstream request timeout in seconds
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates from Portainer
    pub insecure_skip_verify: bool,

    /// Address the HTTP facade binds to
    pub listen: String,
}

impl AppConfig {
    /// Merge file < environment < overrides, then validate
    ///
    /// Fails when the Portainer URL or API key is missing from every source.
    pub fn resolve(file: ConfigFile, env: &EnvConfig, overrides: &Overrides) -> Result<Self> {
        let portainer_url = overrides
            .url
            .clone()
            .or_else(|| env.url.clone())
            .or(file.portainer.url)
            .context("Portainer URL is not configured (set PORTAINER_URL or --url)")?;

        let portainer_api_key = overrides
            .api_key
            .clone()
            .or_else(|| env.api_key.clone())
            .or(file.portainer.api_key)
            .context("Portainer API key is not configured (set PORTAINER_API_KEY or --api-key)")?;

        let config = Self {
            portainer_url,
            portainer_api_key,
            timeout_secs: overrides
                .timeout
                .or(env.timeout)
                .or(file.portainer.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            insecure_skip_verify: overrides
                .insecure
                .or(env.insecure)
                .or(file.portainer.insecure_skip_verify)
                .unwrap_or(false),
            listen: overrides
                .listen
                .clone()
                .or_else(|| env.listen.clone())
                .or(file.server.listen)
                .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_url(&self.portainer_url)?;

        if self.portainer_api_key.trim().is_empty() {
            anyhow::bail!("Portainer API key must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("Timeout must be greater than zero");
        }
        if self.listen.trim().is_empty() {
            anyhow::bail!("Listen address must not be empty");
        }

        Ok(())
    }

    /// Connection settings for the Portainer client
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::new(&self.portainer_url, &self.portainer_api_key)
            .with_timeout(self.timeout_secs)
            .insecure(self.insecure_skip_verify)
    }

    /// Copy safe to print, with the API key masked
    pub fn redacted(&self) -> Self {
        let key = &self.portainer_api_key;
        let masked = if key.chars().count() > 8 {
            format!("{}****", key.chars().take(4).collect::<String>())
        } else {
            "****".to_string()
        };
        Self {
            portainer_api_key: masked,
            ..self.clone()
        }
    }
}

/// Portainer URLs must be absolute http(s) URLs
pub(crate) fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid Portainer URL: {url}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!(
            "Unsupported scheme '{}' in Portainer URL: {url}",
            parsed.scheme()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(url: Option<&str>, api_key: Option<&str>) -> ConfigFile {
        let mut file = ConfigFile::default();
        file.portainer.url = url.map(String::from);
        file.portainer.api_key = api_key.map(String::from);
        file
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(
            file_with(Some("https://portainer.local"), Some("ptr_file")),
            &EnvConfig::default(),
            &Overrides::default(),
        )
        .unwrap();

        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.listen, DEFAULT_LISTEN);
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn test_resolve_precedence() {
        let env = EnvConfig {
            url: Some("https://env.local".to_string()),
            api_key: Some("ptr_env".to_string()),
            timeout: Some(10),
            ..Default::default()
        };
        let overrides = Overrides {
            api_key: Some("ptr_cli".to_string()),
            listen: Some("127.0.0.1:8080".to_string()),
            ..Default::default()
        };

        let config = AppConfig::resolve(
            file_with(Some("https://file.local"), Some("ptr_file")),
            &env,
            &overrides,
        )
        .unwrap();

        assert_eq!(config.portainer_url, "https://env.local");
        assert_eq!(config.portainer_api_key, "ptr_cli");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_url_or_key_fails() {
        let no_url = AppConfig::resolve(
            file_with(None, Some("ptr_file")),
            &EnvConfig::default(),
            &Overrides::default(),
        );
        assert!(no_url.unwrap_err().to_string().contains("URL"));

        let no_key = AppConfig::resolve(
            file_with(Some("https://portainer.local"), None),
            &EnvConfig::default(),
            &Overrides::default(),
        );
        assert!(no_key.unwrap_err().to_string().contains("API key"));
    }

    #[test]
    fn test_invalid_url_fails() {
        let result = AppConfig::resolve(
            file_with(None, Some("ptr_file")),
            &EnvConfig {
                url: Some("portainer.local".to_string()),
                ..Default::default()
            },
            &Overrides::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_client_settings_and_redaction() {
        let config = AppConfig {
            portainer_url: "https://portainer.local".to_string(),
            portainer_api_key: "ptr_0123456789".to_string(),
            timeout_secs: 12,
            insecure_skip_verify: true,
            listen: DEFAULT_LISTEN.to_string(),
        };

        let settings = config.client_settings();
        assert_eq!(settings.timeout_secs, 12);
        assert!(settings.insecure_skip_verify);

        let redacted = config.redacted();
        assert_eq!(redacted.portainer_api_key, "ptr_****");
        assert_eq!(redacted.portainer_url, config.portainer_url);
    }
}
