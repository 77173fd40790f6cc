use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Game roulette API service")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = roulette::run(&cli.config).await {
        tracing::error!("fatal: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
