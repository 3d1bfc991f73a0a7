use clap::Parser;
use dotenv::dotenv;
use hls_push::application::shutdown::termination_signal;
use hls_push::{Configuration, PushHost};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Package a live source into HLS renditions and push them to an origin.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "HLS_PUSH_CONFIG", default_value = "conf.json")]
    config: PathBuf,

    /// Print the playback URL for this configuration and exit
    #[arg(long = "get-playback", alias = "getPlayback")]
    get_playback: bool,

    /// Push to the backup host instead of the primary one
    #[arg(long)]
    backup: bool,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Configuration::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if cli.get_playback {
        println!("{}", config.playback_url());
        return;
    }

    let signal = termination_signal();

    let host = if cli.backup {
        PushHost::Backup
    } else {
        PushHost::Primary
    };

    let work_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!("failed to resolve the working directory: {}", e);
            std::process::exit(1);
        }
    };

    let reason = hls_push::run(config, host, work_dir, signal).await;
    std::process::exit(reason.exit_code());
}
