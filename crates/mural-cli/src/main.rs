use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use mural_canvas::CanvasStore;
use mural_core::config::ServerConfig;
use mural_core::Config;
use mural_gateway::GatewayState;

#[derive(Parser)]
#[command(
    name = "mural",
    about = "Shared-canvas server — clients paint pixels over WebSocket and every viewer sees the result",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the canvas server
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show the resolved configuration
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("mural.json"));
    let mut config = Config::load(&config_path)?;

    // Initialize logging
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_filter()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Serve { port, bind } => {
            if let Some(bind) = bind {
                config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind);
            }
            let port = port.unwrap_or_else(|| config.port());

            tracing::info!(
                "Starting Mural: {}x{} canvas on port {port}",
                config.canvas_width(),
                config.canvas_height()
            );

            let store = Arc::new(CanvasStore::new(
                config.canvas_width(),
                config.canvas_height(),
            ));
            let state = Arc::new(GatewayState::new(Arc::new(config), store));
            mural_gateway::serve(state, port).await?;
        }
        Commands::Status => {
            println!("Mural v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!(
                "Canvas: {}x{}",
                config.canvas_width(),
                config.canvas_height()
            );
            println!("Listen: {}:{}", config.bind_addr(), config.port());
        }
    }

    Ok(())
}
