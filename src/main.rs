use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use anyhow::anyhow;

use autospeak_bridge::{ServerConfig, routes, state::AppState};

/// AutoSpeak Bridge - local text-to-speech HTTP bridge
#[derive(Parser, Debug)]
#[command(name = "autospeak-bridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Port to bind on the loopback interface (overrides PORT)
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Directory for synthesized audio artifacts (overrides AUDIO_DIR)
    #[arg(long = "audio-dir", value_name = "DIR")]
    audio_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from environment, then apply CLI overrides
    let mut config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(audio_dir) = cli.audio_dir {
        config.audio_dir = audio_dir;
    }

    // Initialize tracing with the configured verbosity
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).map_err(|e| {
                anyhow!("Invalid LOG_LEVEL '{}': {}", config.log_level, e)
            })?,
        )
        .init();

    let address = config.address();
    info!("AutoSpeak Bridge starting on {address}");
    match (&config.elevenlabs_api_key, &config.elevenlabs_voice_id) {
        (Some(_), Some(voice_id)) => info!("Mode: ElevenLabs (voice={voice_id})"),
        _ => info!("Mode: system fallback (say/afplay)"),
    }

    // Create application state (opens the artifact store, wires providers)
    let app_state = AppState::new(config)
        .map_err(|e| anyhow!("Failed to initialize application state: {e}"))?;

    // Public health check route plus the API routes
    let app = Router::new()
        .route(
            "/",
            axum::routing::get(autospeak_bridge::handlers::api::health_check),
        )
        .merge(routes::api::create_api_router())
        .with_state(app_state);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    println!("Server listening on http://{socket_addr}");

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
