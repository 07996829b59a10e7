//! Logger setup shared by all demo binaries
//!
//! Everything logs through the `log` facade; the binaries install
//! `env_logger` so `RUST_LOG` keeps working and `--debug` only changes the
//! default filter.

use log::info;

/// Default filter for the given verbosity
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install `env_logger`. Safe to call more than once (later calls are no-ops).
pub fn init(debug: bool) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter(debug)),
    )
    .try_init();
}

/// Log the program banner with build information
pub fn log_startup(program: &str) {
    info!("🚀 Starting {}", program);
    info!(
        "📄 Version: {} ({}, built {})",
        crate::VERSION,
        crate::GIT_COMMIT,
        crate::BUILD_DATE
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_selects_filter() {
        assert_eq!(default_filter(true), "debug");
        assert_eq!(default_filter(false), "info");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}
