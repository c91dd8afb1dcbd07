use anyhow::{Context, Result, anyhow};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TALLY_LOG";

/// Set up `tracing` output.
///
/// `TALLY_LOG` takes precedence over the configured level. With a `log_file`
/// everything goes there instead of stderr (the dashboard owns the terminal).
pub fn init_logging(default_level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid logging.level \"{default_level}\""))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let res = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open {}", path.display()))?;
            builder.with_ansi(false).with_writer(Arc::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    res.map_err(|e| anyhow!("init logging: {e}"))
}
