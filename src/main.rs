//! Lunacy main entry point

use clap::Parser;
use lunacy_api::start_server;
use lunacy_config::{Config, ConfigError};
use lunacy_core::Ledger;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "lunacy")]
#[command(version)]
#[command(about = "A ledger table web interface over a static JSON feed", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Read the feed from this URL instead of the local data directory
    #[arg(long)]
    feed_url: Option<String>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Load the config file; a missing file yields defaults plus the error to warn about
fn load_config(path: PathBuf) -> Result<(Config, Option<ConfigError>), ConfigError> {
    match Config::load(path) {
        Ok(config) => Ok((config, None)),
        Err(e) if e.is_recoverable() => Ok((Config::default(), Some(e))),
        Err(e) => Err(e),
    }
}

/// Config errors go to stderr together with their hints
fn report_config_error(e: &ConfigError) {
    eprintln!("[ERROR] {}", e);
    for suggestion in e.suggestions() {
        eprintln!("  - {}", suggestion);
    }
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = &args.feed_url {
        config.data.feed_url = Some(url.clone());
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (mut config, missing) = load_config(args.config.clone()).map_err(|e| {
        report_config_error(&e);
        e
    })?;

    // RUST_LOG wins over logging.level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.clone()),
    )
    .init();

    if let Some(e) = missing {
        log::warn!("{}; using default configuration", e);
    }

    apply_overrides(&mut config, &args);
    if let Err(e) = config.validate() {
        report_config_error(&e);
        return Err(e.into());
    }

    log::info!(
        "Config loaded: data path={}, feed={}",
        config.data.path.to_string_lossy(),
        config.data.feed_url.clone().unwrap_or_else(|| config.data.feed_file.clone())
    );

    let ledger = Arc::new(Ledger::from_config(config.clone())?);

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, ledger))
}
