use anyhow::Context;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::{CONFIG, LoggingConfig};

const LOG_FILE_PREFIX: &str = "bucket_agg.log";

pub fn init() -> anyhow::Result<()> {
    init_with(&CONFIG.logging)
}

/// Installs a stdout layer and a daily-rolling file layer under `log_dir`.
pub fn init_with(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let (stdout_filter, file_filter) = parse_levels(cfg)?;

    let stdout_layer = fmt::layer().with_ansi(true).with_filter(stdout_filter);

    let file_appender = tracing_appender::rolling::daily(&cfg.log_dir, LOG_FILE_PREFIX);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    info!(
        target: "bucket_agg::logging",
        log_dir = %cfg.log_dir,
        stdout_level = %stdout_filter,
        file_level = %file_filter,
        "Logging initialized"
    );
    Ok(())
}

pub(crate) fn parse_levels(cfg: &LoggingConfig) -> anyhow::Result<(LevelFilter, LevelFilter)> {
    let stdout = cfg
        .stdout_level
        .parse::<LevelFilter>()
        .with_context(|| format!("invalid logging.stdout_level {:?}", cfg.stdout_level))?;
    let file = cfg
        .file_level
        .parse::<LevelFilter>()
        .with_context(|| format!("invalid logging.file_level {:?}", cfg.file_level))?;
    Ok((stdout, file))
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter =
            EnvFilter::from_default_env().add_directive("bucket_agg=debug".parse().unwrap());

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
