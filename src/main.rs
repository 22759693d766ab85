//! Portainer Gateway - simplified HTTP facade over the Portainer REST API
//!
//! Exposes Portainer stacks, Docker resources, users, teams and Kubernetes
//! objects under a small `/api/v1` surface, forwarding each call to a single
//! Portainer server with a fixed API key.
//!
//! ## Usage
//!
//! ```bash
//! # Run the gateway
//! portainer-gateway serve --url https://portainer:9443 --api-key ptr_xxx
//!
//! # Check that Portainer is reachable
//! portainer-gateway check
//!
//! # Write and inspect a config file
//! portainer-gateway config init
//! portainer-gateway config show --format json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod cli;
mod config;
mod portainer;
mod server;
mod utils;

use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig, Overrides};
use portainer::PortainerClient;
use utils::logger::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env_config = EnvConfig::load();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        env_config
            .log
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or_default()
    };
    init_logger(level);

    match args.command {
        cli::Command::Serve(serve_args) => {
            let config = load_config(args.config.as_deref(), &env_config, &serve_args.overrides())?;
            server::serve(&config).await?;
        }
        cli::Command::Check(connection) => {
            let config = load_config(args.config.as_deref(), &env_config, &connection.overrides())?;
            check_connection(&config).await?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, args.config.as_deref(), &env_config)?;
        }
    }

    Ok(())
}

/// Resolve the configuration from file, environment and flags
fn load_config(
    path: Option<&str>,
    env_config: &EnvConfig,
    overrides: &Overrides,
) -> Result<AppConfig> {
    let file = match path {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };
    AppConfig::resolve(file, env_config, overrides)
}

async fn check_connection(config: &AppConfig) -> Result<()> {
    let client = PortainerClient::new(config.client_settings())
        .context("Failed to create Portainer client")?;

    info!("Checking {}", client.base_url());
    let endpoints = client.get_endpoints().await.map_err(|e| {
        let hint = if e.is_transport() {
            "is the URL reachable?"
        } else if matches!(e.status(), Some(401) | Some(403)) {
            "is the API key valid?"
        } else if e.is_not_found() {
            "does the URL point at the Portainer server root?"
        } else {
            "unexpected response"
        };
        anyhow::Error::new(e).context(format!("Check against {} failed: {hint}", client.base_url()))
    })?;

    let count = endpoints.as_array().map(Vec::len).unwrap_or(0);
    println!("✓ Connected to {}", client.base_url());
    println!("  Endpoints: {count}");
    Ok(())
}

fn manage_config(args: cli::ConfigArgs, path: Option<&str>, env_config: &EnvConfig) -> Result<()> {
    use std::path::Path;

    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            let config = ConfigFile::example();
            config.save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to set your Portainer URL and API key.");
        }

        cli::ConfigAction::Show { format, env } => {
            if env {
                if !env_config.has_any() {
                    println!("No gateway environment variables are set.\n");
                }
                env_config.print_summary();
                println!();
                config::print_env_help();
            } else {
                let config = load_config(path, env_config, &Overrides::default())?.redacted();
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .or_else(|| path.map(str::to_string))
                .or_else(|| ConfigFile::find().map(|p| p.to_string_lossy().to_string()))
                .unwrap_or_else(|| "./portainer-gateway.yaml".to_string());

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e}");
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
