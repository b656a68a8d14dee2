//! Pipechat terminal client entry point.

use std::{fs::OpenOptions, sync::Mutex};

use clap::Parser;
use pipechat_tui::{config::Args, runtime::Runtime};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The terminal is in raw mode on the alternate screen, so logs go to a
    // file.
    let log_file = OpenOptions::new().create(true).append(true).open(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    tracing::info!(user = %args.user, server = %args.server, "Pipechat starting");

    let runtime = Runtime::new(&args)?;
    Ok(runtime.run().await?)
}
