mod commands;
pub mod exit_codes;
mod output;

pub use commands::{Cli, Commands};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(&cli);
    commands::execute(cli)
}

/// install the stderr subscriber; RUST_LOG wins over every flag
fn init_logging(cli: &Cli) {
    let path = config::get_config_path(cli.config.as_deref());
    let settings = config::load(&path).ok().map(|c| c.settings);
    let level = commands::log_level(cli, settings.as_ref());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
