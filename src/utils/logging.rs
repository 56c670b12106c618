//! Logging setup built on `tracing-subscriber`.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log levels for this crate and for everything else
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level applied to `docs_summarizer` targets
    #[serde(default = "default_app_log_level")]
    pub app_log_level: String,

    /// Level applied to third-party crates
    #[serde(default = "default_lib_log_level")]
    pub lib_log_level: String,

    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

fn default_app_log_level() -> String {
    "info".to_string()
}

fn default_lib_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_log_level: default_app_log_level(),
            lib_log_level: default_lib_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directives, e.g. `docs_summarizer=debug,warn`
    pub fn directives(&self) -> String {
        format!(
            "{}={},{}",
            env!("CARGO_CRATE_NAME"),
            self.app_log_level.to_lowercase(),
            self.lib_log_level.to_lowercase()
        )
    }

    /// Build the filter; `RUST_LOG` overrides the configured levels
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn configure_logging(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt().with_env_filter(config.env_filter());

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.with_target(true).try_init()
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed, keeping it");
    }
}
