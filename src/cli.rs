//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// Casdoor OAuth2/OIDC demo gateway
#[derive(Parser, Debug)]
#[command(name = "casdoor-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides `PORT` and the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "GATEWAY_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "GATEWAY_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "GATEWAY_LOG_FORMAT")]
    pub log_format: Option<String>,
}
