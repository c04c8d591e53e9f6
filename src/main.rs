//! Casdoor Gateway - OAuth2/OIDC authorization-code flow demo server

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use casdoor_gateway::{
    cli::Cli,
    config::Config,
    gateway::{AppState, Gateway},
    oauth::CasdoorClient,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host.clone_from(host);
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let casdoor = &config.casdoor;
    let missing = casdoor.missing_fields();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Casdoor settings are incomplete; sign-in will not work");
    }

    let (redirect_uri, defaulted) = casdoor.resolve_redirect_uri();
    if defaulted {
        warn!(redirect_uri = %redirect_uri, "CASDOOR_REDIRECT_URI is empty, using default");
    }

    let provider = Arc::new(CasdoorClient::new(casdoor));
    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %provider.endpoint(),
        organization = %provider.organization(),
        application = %provider.application(),
        "Starting Casdoor gateway"
    );

    let state = Arc::new(
        AppState::new(provider, redirect_uri).with_expected_state(casdoor.application.clone()),
    );

    let gateway = match Gateway::bind(&config.server, state).await {
        Ok(g) => g,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = gateway.run().await {
        error!("Gateway error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Gateway shutdown complete");
    ExitCode::SUCCESS
}
