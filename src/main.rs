use clap::Parser;
use tokio::sync::watch;

use gdrive_model::cli;
use gdrive_model::error::Result;
use gdrive_model::drive::DriveClient;

use gdrive_model::cli::Args;
use gdrive_model::config::load_drive_config;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = load_drive_config();
    let client = DriveClient::new(config)?;

    // Ctrl-C stops the current call and any remaining files of a batch.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    cli::run(args, client.with_cancel(cancel_rx)).await?;
    Ok(())
}
