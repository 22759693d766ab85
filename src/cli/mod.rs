//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::config::Overrides;

/// HTTP gateway in front of the Portainer REST API
#[derive(Parser, Debug)]
#[command(name = "portainer-gateway")]
#[command(version)]
#[command(about = "Simplified HTTP facade over a Portainer server")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP gateway
    Serve(ServeArgs),

    /// Check connectivity to Portainer
    Check(ConnectionArgs),

    /// Manage configuration files
    Config(ConfigArgs),
}

/// Portainer connection flags, shared by `serve` and `check`
#[derive(ClapArgs, Debug, Default)]
pub struct ConnectionArgs {
    /// Portainer base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Portainer API access token
    #[arg(long)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,
}

impl ConnectionArgs {
    /// Flags as configuration overrides; unset flags leave lower layers alone
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            api_key: self.api_key.clone(),
            timeout: self.timeout,
            insecure: self.insecure.then_some(true),
            listen: None,
        }
    }
}

/// Arguments for serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Listen address (host:port)
    #[arg(short, long)]
    pub listen: Option<String>,
}

impl ServeArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            listen: self.listen.clone(),
            ..self.connection.overrides()
        }
    }
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "portainer-gateway.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the resolved configuration
    Show {
        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Show environment variables instead
        #[arg(short, long)]
        env: bool,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the first file found)
        file: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_args() {
        let args = Args::parse_from([
            "portainer-gateway",
            "serve",
            "--listen",
            "127.0.0.1:9000",
            "--url",
            "https://portainer.local:9443",
            "--insecure",
        ]);
        match args.command {
            Command::Serve(serve_args) => {
                let overrides = serve_args.overrides();
                assert_eq!(overrides.listen.as_deref(), Some("127.0.0.1:9000"));
                assert_eq!(overrides.url.as_deref(), Some("https://portainer.local:9443"));
                assert_eq!(overrides.insecure, Some(true));
                assert!(overrides.api_key.is_none());
                assert!(overrides.timeout.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_insecure_flag_absent_does_not_override() {
        let args = Args::parse_from(["portainer-gateway", "check", "--timeout", "5"]);
        match args.command {
            Command::Check(connection) => {
                let overrides = connection.overrides();
                assert_eq!(overrides.timeout, Some(5));
                assert!(overrides.insecure.is_none());
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "portainer-gateway",
            "config",
            "show",
            "--format",
            "json",
            "--config",
            "/tmp/gw.yaml",
            "-v",
        ]);
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("/tmp/gw.yaml"));
        match args.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Show { format, env },
            }) => {
                assert_eq!(format, "json");
                assert!(!env);
            }
            _ => panic!("Expected Config Show command"),
        }
    }

    #[test]
    fn test_config_init_defaults() {
        let args = Args::parse_from(["portainer-gateway", "config", "init"]);
        match args.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { output, force },
            }) => {
                assert_eq!(output, "portainer-gateway.yaml");
                assert!(!force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
