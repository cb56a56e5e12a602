use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use host::{config::DEFAULT_CONFIG_FILE, load_settings, Editor};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "automaton", about = "Automaton editor host")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Open the remote control endpoint on this port at startup.
    #[arg(long)]
    remote_port: Option<u16>,
    #[arg(long)]
    redraw_hz: Option<u32>,
    /// Answer dialogs from settings instead of showing them.
    #[arg(long)]
    headless: bool,
    #[arg(long)]
    document: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(port) = args.remote_port {
        settings.remote_port = Some(port);
    }
    if let Some(hz) = args.redraw_hz {
        settings.redraw_hz = hz;
    }
    if args.headless {
        settings.headless = true;
    }
    if let Some(document) = args.document {
        settings.document = Some(document);
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(?settings, "loaded settings");

    let editor = Editor::start(&settings);
    loop {
        tokio::select! {
            _ = editor.closed() => break,
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                info!("close requested");
                editor.request_close();
            }
        }
    }

    if let Err(err) = editor.shutdown().await {
        warn!(%err, "editor did not stop cleanly");
        return Err(err);
    }
    Ok(())
}
