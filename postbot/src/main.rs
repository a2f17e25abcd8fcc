mod commands;
mod config;
mod error;

use clap::Parser;
use config::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    pretty_env_logger::init();
    log::info!("Starting postbot...");

    if let Err(err) = commands::run(args).await {
        log::error!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
