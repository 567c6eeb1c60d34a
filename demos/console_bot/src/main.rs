//! A Bronze bot that talks to the terminal.
//!
//! ```text
//! cargo run -p console-bot -- --prefix '?'
//! > ?add 2 40
//! [#general] bronze (#2): 42
//! > dm whois alice
//! ```

mod commands;
mod platform;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bronze::prelude::*;
use bronze::runtime::config::validate_config;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::commands::GuildPrefixes;
use crate::platform::ConsolePlatform;

#[derive(Debug, Parser)]
#[command(name = "console-bot", version, about = "Chat with a Bronze bot in the terminal")]
struct Args {
    /// Configuration file to load instead of searching for one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Command prefix, overriding the configured one
    #[arg(short, long)]
    prefix: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;
    if let Some(prefix) = args.prefix {
        config.prefix = prefix;
        validate_config(&config)?;
    }

    init_from_config(&config.logging);

    let prefixes = GuildPrefixes::new(config.prefix.clone());
    let system = build_system(&config, commands::build(prefixes.clone())).with_prefix(prefixes);

    let platform = Arc::new(ConsolePlatform::new());
    let (tx, rx) = mpsc::channel(64);

    let reader_platform = Arc::clone(&platform);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    if tx.send(reader_platform.message_from_line(&line)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });

    info!(prefix = %config.prefix, "Type messages below; prefix them with `dm ` for a private channel");
    serve::run(system, platform, rx).await;
    Ok(())
}
