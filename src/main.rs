use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use clap::Parser;
use http::{Method, header::CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use anyhow::anyhow;

use scholar_gateway::{ServerConfig, routes, state::AppState};

/// Scholar Gateway - real-time voice relay server
#[derive(Parser, Debug)]
#[command(name = "scholar-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file or environment
    let config = if let Some(config_path) = cli.config {
        println!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    config.validate().map_err(|e| anyhow!(e.to_string()))?;

    let address = config.address();
    let cors_origins = config.cors_allowed_origins.clone();
    println!("Starting server on {address}");

    // Create application state
    let app_state = Arc::new(AppState::new(config));

    // Configure CORS
    let cors_layer = if let Some(ref origins) = cors_origins {
        if origins == "*" {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(false)
        } else {
            // Parse comma-separated origins
            let origins: Vec<http::HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(true)
        }
    } else {
        // No CORS configured - same-origin only. Set CORS_ALLOWED_ORIGINS to
        // enable cross-origin access.
        info!("CORS not configured, defaulting to same-origin only");
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(false)
    };

    // Combine all routes: health + live relay
    let app = routes::api::create_api_router()
        .merge(routes::live::create_live_router())
        .with_state(app_state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http());

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    println!("Server listening on http://{}", socket_addr);

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
