//! Global tracing subscriber setup.

use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the console layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines, colored on a terminal.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name, falling back to pretty output.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber.
///
/// Only the first call has an effect. If another subscriber is already
/// installed it is kept.
pub fn init_tracing(format: LogFormat) {
    TRACING_INITIALIZED.get_or_init(|| {
        let result = match format {
            LogFormat::Json => {
                let layer = fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_filter(env_filter());
                tracing_subscriber::registry().with(layer).try_init()
            }
            LogFormat::Pretty => {
                let use_ansi = std::io::stdout().is_terminal();
                let layer = fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(use_ansi)
                    .with_filter(env_filter());
                tracing_subscriber::registry().with(layer).try_init()
            }
        };

        if result.is_err() {
            tracing::debug!("Global tracing subscriber already initialized, keeping it");
        } else {
            tracing::info!(format = ?format, "Tracing initialized");
        }
    });
}

/// Returns true once [`init_tracing`] has run.
pub fn is_initialized() -> bool {
    TRACING_INITIALIZED.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_name() {
        assert_eq!(LogFormat::from_name("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(LogFormat::Json);
        init_tracing(LogFormat::Pretty);
        assert!(is_initialized());
    }
}
