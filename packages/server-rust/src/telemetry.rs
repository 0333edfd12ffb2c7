//! Tracing subscriber setup for processes embedding the router.

use tracing_subscriber::EnvFilter;

/// Output format of log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Errors encountered while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` when the variable is unset.
///
/// # Errors
///
/// Returns `TelemetryError::Filter` for an unparsable `default_filter` and
/// `TelemetryError::Install` if a global subscriber is already set.
pub fn init_tracing(format: LogFormat, default_filter: &str) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| TelemetryError::Filter(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_default_filter_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = init_tracing(LogFormat::Text, "netconf_server=notalevel").unwrap_err();
        assert!(matches!(err, TelemetryError::Filter(_)));
    }

    #[test]
    fn second_install_fails() {
        // Whichever call wins, at most one of them may install.
        let first = init_tracing(LogFormat::Json, "info");
        let second = init_tracing(LogFormat::Text, "info");
        assert!(first.is_err() || second.is_err());
        if let Err(e) = second {
            assert!(matches!(e, TelemetryError::Install(_)));
        }
    }
}
