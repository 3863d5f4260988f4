//! Log subscriber setup for the binary.

use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::FmtSubscriber;

use crate::error::{Result, SupplyCurveError};

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn parse_log_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim()).map_err(|_| {
        SupplyCurveError::InvalidSettings(format!(
            "unknown log level '{level}' (expected off, error, warn, info, debug or trace)"
        ))
    })
}

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
pub fn init_logging(level: &str) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(level)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        SupplyCurveError::InvalidSettings(format!("setting default subscriber failed: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_log_level(" off ").unwrap(), LevelFilter::OFF);
        assert!(parse_log_level("verbose").is_err());
    }
}
