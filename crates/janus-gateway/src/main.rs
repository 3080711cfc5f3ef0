//! Janus Gateway - Entry point
//!
//! This is the main binary for the Janus authenticating reverse proxy.

use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use janus_gateway::{GatewayConfig, GatewayServer};

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("janus-gateway {}", janus_gateway::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Janus Gateway - Authenticating reverse proxy

USAGE:
    janus-gateway [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    JANUS_GATEWAY_LISTEN_ADDR         Gateway listen address (default: 127.0.0.1)
    JANUS_GATEWAY_LISTEN_PORT         Gateway listen port (default: 8080)
    JANUS_GATEWAY_UPSTREAM_URL        Upstream service URL (required)
    JANUS_GATEWAY_UPSTREAM_TIMEOUT    Upstream timeout in seconds (default: 30)
    JANUS_GATEWAY_INTROSPECT_URL      Session authority introspection URL (required)
    JANUS_GATEWAY_LOGIN_URL           Login page URL for browser redirects (required)
    JANUS_GATEWAY_CLIENT_ID           Service client ID sent to the authority
    JANUS_GATEWAY_CLIENT_SECRET       Service client secret sent to the authority
    JANUS_GATEWAY_INTROSPECT_TIMEOUT  Introspection timeout in seconds (default: 3)
    JANUS_GATEWAY_PUBLIC_PATHS        Comma-separated paths served without auth

EXAMPLES:
    # Run with configuration file
    janus-gateway --config /etc/janus/gateway.toml

    # Run with environment variables
    JANUS_GATEWAY_UPSTREAM_URL=http://localhost:3000 \
    JANUS_GATEWAY_INTROSPECT_URL=https://auth.example/introspect \
    JANUS_GATEWAY_LOGIN_URL=https://auth.example/login \
    janus-gateway
"
    );
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "janus_gateway=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Parse arguments
    let args = Args::parse();

    // Load configuration
    let config = match args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            match GatewayConfig::from_file(&path) {
                Ok(config) => config.with_env_overrides(),
                Err(e) => {
                    error!("Failed to load configuration: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            info!("Using default configuration with environment overrides");
            GatewayConfig::default().with_env_overrides()
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("Starting Janus gateway v{}", janus_gateway::VERSION);
    info!(
        "Listening on {}:{}",
        config.server.listen_addr, config.server.listen_port
    );
    info!("Upstream: {}", config.server.upstream_url);

    // Create and run server
    let server = match GatewayServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
