//! Entry point for the `find-campsites` availability watcher.
//! Polls a reservation provider on an interval, filters the results to the
//! requested stay, and optionally notifies via SMS/email.

mod args;
mod poll;

use anyhow::{Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    if args.nights < 1 {
        bail!("nights must be at least 1");
    }

    poll::run(args).await
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
