//! Tracing initialization.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding a tracing filter, e.g. `joinscope_core=debug`.
pub const LOG_ENV: &str = "JOINSCOPE_LOG";

/// Installs a stderr subscriber.
///
/// `JOINSCOPE_LOG` wins when set and valid; otherwise the level follows the
/// flags: `warn` by default, `error` with `--quiet`, `debug` with `-v` and
/// `trace` with `-vv`.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .try_init();
}

fn default_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(0, false), "warn");
        assert_eq!(default_level(0, true), "error");
        assert_eq!(default_level(1, false), "debug");
        assert_eq!(default_level(3, false), "trace");
    }
}
