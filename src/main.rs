//! adb-deck - Device session manager for adb
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;

use adb_deck::Command;

/// adb-deck - select devices, run quick actions, mirror screens and capture logs
#[derive(Parser, Debug)]
#[command(name = "adeck", version)]
#[command(about = "Device session manager for adb", long_about = None)]
struct Args {
    /// Directory searched for bundled tools and used for config and captures
    /// (defaults to the directory of this executable)
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Print NDJSON events instead of console lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    deck_core::logging::init()?;

    let base_dir = args
        .base_dir
        .unwrap_or_else(deck_bridge::app_base_dir);

    let result = adb_deck::run(&base_dir, args.json, args.command).await;
    if let Err(ref e) = result {
        tracing::error!("Application error: {:?}", e);
    }

    tracing::info!("adb-deck exiting");
    Ok(result?)
}
