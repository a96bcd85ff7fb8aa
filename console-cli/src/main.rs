//! Kopia Console - browser console for a Kopia repository server
//!
//! Serves the embedded web UI, proxies its API calls to the backend, and
//! offers a few read-only CLI commands against the same backend.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;

use kopia_console::config::{self, ConsoleConfig, Overrides};
use kopia_console::server;

#[derive(Parser, Debug)]
#[command(name = "kopia-console")]
#[command(version)]
#[command(about = "Browser console for a Kopia repository server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Port for the web UI
    #[arg(short, long, env = "KOPIA_CONSOLE_PORT", global = true)]
    port: Option<u16>,

    /// Address the web UI listens on
    #[arg(long, env = "KOPIA_CONSOLE_ADDRESS", global = true)]
    address: Option<String>,

    /// Backend server URL
    #[arg(long, env = "KOPIA_SERVER_URL", global = true)]
    server_url: Option<String>,

    /// Username for HTTP basic auth against the backend
    #[arg(long, env = "KOPIA_SERVER_USERNAME", global = true)]
    server_username: Option<String>,

    /// Password for HTTP basic auth against the backend
    #[arg(long, env = "KOPIA_SERVER_PASSWORD", global = true, hide_env_values = true)]
    server_password: Option<String>,

    /// CSRF token handed to the UI and sent by CLI commands
    #[arg(long, env = "KOPIA_CSRF_TOKEN", global = true, hide_env_values = true)]
    csrf_token: Option<String>,

    /// Path to the config file (defaults to ~/.config/kopia-console/console.toml)
    #[arg(short, long, env = "KOPIA_CONSOLE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Don't open browser automatically
    #[arg(long, global = true)]
    no_browser: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            address: self.address.clone(),
            port: self.port,
            server_url: self.server_url.clone(),
            server_username: self.server_username.clone(),
            server_password: self.server_password.clone(),
            csrf_token: self.csrf_token.clone(),
            no_browser: self.no_browser,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the console web UI (default)
    Serve,

    /// Show repository status
    Status(cli::StatusArgs),

    /// List recent and running tasks
    Tasks(cli::TasksArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Some(Commands::Status(args)) => {
            args.execute(&cli::CliClient::new(&load_config(&cli)?)).await?;
        }
        Some(Commands::Tasks(args)) => {
            args.execute(&cli::CliClient::new(&load_config(&cli)?)).await?;
        }
        Some(Commands::Version) => {
            println!("Kopia Console {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve) | None => {
            start_console(&load_config(&cli)?).await?;
        }
    }

    Ok(())
}

/// Config file layered under the command-line flags
fn load_config(cli: &Cli) -> anyhow::Result<ConsoleConfig> {
    let file = config::load_file(cli.config.as_deref())?;
    Ok(ConsoleConfig::resolve(file, cli.overrides())?)
}

async fn start_console(config: &ConsoleConfig) -> anyhow::Result<()> {
    info!("Starting Kopia Console...");

    let server_handle = server::start_server(config).await?;

    let ui_url = config.ui_url();
    if config.open_browser {
        info!("Opening browser...");
        if let Err(e) = open::that(&ui_url) {
            tracing::warn!("Failed to open browser: {}", e);
            info!("Please open {} in your browser", ui_url);
        }
    }

    info!("");
    info!("   Kopia Console is running");
    info!("");
    info!("   Open:    {}", ui_url);
    info!("   Backend: {}", config.server_url);
    info!("");
    info!("   Press Ctrl+C to stop");
    info!("");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
        result = server_handle => {
            match result {
                Ok(Err(e)) => tracing::error!("Server error: {}", e),
                Err(e) => tracing::error!("Server task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }

    info!("Kopia Console stopped.");
    Ok(())
}
