//! Tracing subscriber setup for PalmCursor binaries.
//!
//! Logs always go to stderr; stdout carries JSONL streams. Libraries only
//! emit events and never install a subscriber themselves.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

const CRATE_TARGETS: [&str; 4] = [
    "palmcursor",
    "palmcursor_common",
    "palmcursor_frame_model",
    "palmcursor_gesture_core",
];

/// Filter directives for a configured level.
///
/// A bare level (`"debug"`) applies to PalmCursor crates only, with
/// everything else at `warn`. Anything containing `=` or `,` is taken as a
/// full directive string.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATE_TARGETS.iter().map(|t| format!("{t}={level}")));
    directives.join(",")
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(
            builder
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };
    installed.is_ok()
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() -> bool {
    init_logging(&LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scopes_to_own_crates() {
        let d = filter_directives("debug");
        assert!(d.starts_with("warn,"));
        assert!(d.contains("palmcursor_gesture_core=debug"));
        assert!(d.contains("palmcursor=debug"));
    }

    #[test]
    fn test_full_directive_passes_through() {
        assert_eq!(
            filter_directives("palmcursor_gesture_core=trace,info"),
            "palmcursor_gesture_core=trace,info"
        );
    }
}
