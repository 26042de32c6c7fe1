use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use noctober::config::{Cli, Command, Config, default_config_path};
use noctober::kobo::KoboDatabase;
use noctober::notado::{NotadoClient, user_agent};
use noctober::sync::{SyncSettings, forward_to_notado};
use noctober::{VERSION, system_details};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // A missing .env is fine, the config file can carry everything.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        tracing::error!(error = %format!("{:#}", e), "noctober failed");
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<()> {
    let config_path = args.config_path.unwrap_or_else(default_config_path);

    match args.command {
        Command::Details => {
            println!("{}", system_details(VERSION));
            Ok(())
        }
        Command::Count { database } => {
            let cfg = load_config(&config_path)?;
            let device = open_device(database, &cfg).await?;
            let counts = device.count_bookmarks().await?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
            Ok(())
        }
        Command::Sync { database } => {
            let cfg = load_config(&config_path)?;
            if cfg.notado.token.is_empty() {
                anyhow::bail!(
                    "no notado token was configured. set notado.token in {}",
                    config_path.display()
                );
            }

            let device = open_device(database, &cfg).await?;
            let client = NotadoClient::new(
                cfg.notado.endpoint.clone(),
                &user_agent(VERSION),
                Duration::from_secs(cfg.notado.timeout_seconds),
                tracing::info_span!("notado", endpoint = %cfg.notado.endpoint),
            )?;
            let settings = SyncSettings {
                token: cfg.notado.token.clone(),
                upload_store_highlights: cfg.device.upload_store_highlights,
                send_mode: cfg.notado.send_mode,
            };

            let cancellation_token = CancellationToken::new();
            let ctrl_c_token = cancellation_token.clone();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    tracing::info!("ctrl+c signal received, cancelling sync");
                    ctrl_c_token.cancel();
                }
            });

            let count = forward_to_notado(&device, &client, &settings, &cancellation_token).await?;
            tracing::info!(count, "successfully synced highlights to Notado");
            println!("Synced {} highlights to Notado", count);
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let cfg = Config::new(path)?;
    tracing::info!(
        path = %path.display(),
        upload_store_highlights = cfg.device.upload_store_highlights,
        "successfully parsed config file"
    );
    Ok(cfg)
}

async fn open_device(database: Option<PathBuf>, cfg: &Config) -> Result<KoboDatabase> {
    let path = database
        .or_else(|| cfg.device.database.clone())
        .context("no device database given. pass --database or set device.database")?;
    let device = KoboDatabase::open(&path)
        .await
        .with_context(|| format!("failed to open device database at {}", path.display()))?;
    Ok(device)
}
