//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./portainer-gateway.yaml",
    "./portainer-gateway.yml",
    "./.portainer-gateway.yaml",
    "~/.config/portainer-gateway/config.yaml",
];

/// Full configuration file structure
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Upstream Portainer connection
    #[serde(default)]
    pub portainer: PortainerSection,

    /// Local HTTP server
    #[serde(default)]
    pub server: ServerSection,
}

/// `portainer:` section; every field may be supplied by env or CLI instead
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PortainerSection {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub insecure_skip_verify: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    pub listen: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            portainer: PortainerSection::default(),
            server: ServerSection::default(),
        }
    }
}

impl ConfigFile {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location, or defaults if none exists
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate what the file states; completeness is checked after merging
    pub fn validate(&self) -> Result<()> {
        if self.version != "1.0" {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        if let Some(url) = &self.portainer.url {
            super::validate_url(url)?;
        }

        if self.portainer.timeout_secs == Some(0) {
            anyhow::bail!("portainer.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            version: default_version(),
            portainer: PortainerSection {
                url: Some("https://portainer.example.com:9443".to_string()),
                api_key: Some("ptr_replace_me".to_string()),
                timeout_secs: Some(30),
                insecure_skip_verify: Some(false),
            },
            server: ServerSection {
                listen: Some(super::DEFAULT_LISTEN.to_string()),
            },
        }
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
