//! scap-relay maintenance CLI.
//!
//! `send-spool` is intended to run from cron: it re-forwards reports
//! that were spooled after transient upstream failures. `parse` decodes
//! a local ARF archive to the JSON summary without touching storage.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scap_relay_cli::init_tracing;
use scap_relay_core::Config;
use scap_relay_services::{SpoolDrain, UpstreamForwarder};
use scap_relay_storage::StorageFS;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "scap-relay", about = "SCAP report relay maintenance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-forward spooled reports to the management server
    SendSpool,
    /// List reports waiting in the spool
    ListSpool,
    /// Decode a local ARF archive and print the JSON summary
    Parse {
        /// Path to the archive (bzip2, gzip, or plain XML)
        file: std::path::PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::SendSpool => {
            let config = Config::from_env()?;
            let storage = StorageFS::from_config(&config);
            let forwarder = Arc::new(UpstreamForwarder::from_config(&config)?);

            let summary = SpoolDrain::new(forwarder, storage).drain().await?;
            print_json(&serde_json::json!({
                "delivered": summary.delivered,
                "remaining": summary.remaining,
                "failed": summary.failed,
            }))?;
        }
        Commands::ListSpool => {
            let config = Config::from_env()?;
            let storage = StorageFS::from_config(&config);

            let entries = storage.list_spooled().await?;
            let listing: Vec<serde_json::Value> = entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "common_name": entry.common_name,
                        "policy_id": entry.policy_id,
                        "timestamp": entry.timestamp,
                        "digest": entry.digest,
                    })
                })
                .collect();
            print_json(&listing)?;
        }
        Commands::Parse { file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read archive {}", file.display()))?;

            let report = scap_relay_arf::decode(&data)
                .with_context(|| format!("Failed to decode archive {}", file.display()))?;
            print_json(&report)?;
        }
    }

    Ok(())
}
