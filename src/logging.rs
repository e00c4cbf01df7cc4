//! Console logging via `tracing` + `tracing-subscriber`.
//!
//! `KWFILTERS_LOG` (an `EnvFilter` directive such as "debug") takes
//! precedence; otherwise `--verbose` selects DEBUG for this crate and INFO
//! for everything else. Logs go to stderr so the confirmation prompt owns
//! stdout.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::ChronoLocal;

pub const LOG_ENV: &str = "KWFILTERS_LOG";

const TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(&directive)
            .map_err(|e| anyhow!("Invalid {} value \"{}\": {}", LOG_ENV, directive, e))?,
        Err(_) => EnvFilter::new(default_directive(verbose)),
    };

    fmt::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,kwfilters=debug"
    } else {
        "info"
    }
}
