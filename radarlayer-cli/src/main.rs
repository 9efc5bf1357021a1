//! RadarLayer CLI - Command-line interface
//!
//! Thin caller over the `radarlayer` library: renders static or animated
//! radar composites to PNG files and exposes the supplemental weather and
//! location lookups. Persistence lives here on purpose; the library only
//! returns in-memory rasters.

mod commands;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "radarlayer", version, about = "Weather radar composites on the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a single cached radar composite to a PNG file.
    Snapshot(commands::SnapshotArgs),
    /// Render an animated radar sequence to a directory of PNG frames.
    Animate(commands::AnimateArgs),
    /// Print current conditions and the short forecast for a point.
    Weather(commands::WeatherArgs),
    /// Resolve the host's position from its public IP address.
    Locate,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Ctrl-C flips the cancellation token; in-flight tile fetches are
    // abandoned and nothing partial is cached.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling");
            signal_cancel.cancel();
        }
    });

    let result = match cli.command {
        Command::Snapshot(args) => commands::snapshot(args, &cancel).await,
        Command::Animate(args) => commands::animate(args, &cancel).await,
        Command::Weather(args) => commands::weather(args).await,
        Command::Locate => commands::locate().await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
