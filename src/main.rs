// src/main.rs
mod cli;
mod host;
mod logging;

use clap::Parser;
use cli::Args;
use faceit_scoreboard::config::Config;
use faceit_scoreboard::display::TracingSink;
use faceit_scoreboard::error::AppError;
use faceit_scoreboard::service::RatingService;
use std::sync::Arc;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::get_config_path);
    let config = Config::load(Some(&config_path)).await?;

    if args.list_config {
        config.display(&config_path);
        return Ok(());
    }

    let (log_file_path, _guard) = logging::setup_logging(&args, &config).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    let service = RatingService::start(&config, Arc::new(TracingSink)).await?;
    tracing::info!(
        "{} v{} loaded successfully!",
        faceit_scoreboard::NAME,
        faceit_scoreboard::VERSION
    );

    let saved = host::run(&service, BufReader::new(tokio::io::stdin()), &config.commands).await?;
    tracing::info!("Shutdown complete, saved {saved} players");
    Ok(())
}
