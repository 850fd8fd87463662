//! Subscriber setup for applications embedding the purge pass.
//!
//! Only available with the `logging` feature. Filtering is scoped to the
//! purgecss crates: `info` shows the per-build summary, `debug` adds one line
//! per classified entry and skipped result. Other crates stay at `warn`.
//!
//! `PURGECSS_LOG` overrides the level. It takes either a level name
//! (`PURGECSS_LOG=debug`) or a full `EnvFilter` directive string.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable read by [`init_logging`].
pub const LOG_ENV: &str = "PURGECSS_LOG";

/// Tracing targets that emit purge events.
const TARGETS: [&str; 2] = ["purgecss_core", "purgecss_plugin"];

static INIT: Once = Once::new();

/// How much of the purge pass to report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    /// Configuration problems only
    Warn,
    /// One summary line per build
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Filter directives enabling `self` for the purgecss targets.
    ///
    /// ```
    /// use purgecss_core::LogLevel;
    ///
    /// assert_eq!(
    ///     LogLevel::Debug.directives(),
    ///     "warn,purgecss_core=debug,purgecss_plugin=debug"
    /// );
    /// ```
    pub fn directives(&self) -> String {
        let mut directives = String::from("warn");
        for target in TARGETS {
            directives.push_str(&format!(",{}={}", target, self.as_str()));
        }
        directives
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "quiet" | "silent" => Ok(LogLevel::Off),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "verbose" => Ok(LogLevel::Debug),
            other => Err(format!("unknown purgecss log level: {}", other)),
        }
    }
}

/// Directives to install, given the requested level and the `PURGECSS_LOG`
/// value if one is set.
fn resolve_directives(level: LogLevel, env: Option<&str>) -> String {
    match env.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<LogLevel>()
            .map(|level| level.directives())
            .unwrap_or_else(|_| value.to_string()),
        None => level.directives(),
    }
}

/// Install a global subscriber for purge events.
///
/// `PURGECSS_LOG` wins over `level` when set; an unparsable value falls back
/// to `level`. Only the first call in a process has any effect.
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let filter = EnvFilter::try_new(resolve_directives(level, env.as_deref()))
            .unwrap_or_else(|_| EnvFilter::new(level.directives()));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(true).without_time())
            .init();
    });
}

/// [`init_logging`] at the default level.
pub fn init_logging_from_env() {
    init_logging(LogLevel::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        assert_eq!("verbose".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" Quiet ".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("trace-everything".parse::<LogLevel>().is_err());
    }

    #[test]
    fn directives_scope_level_to_purgecss_targets() {
        assert_eq!(
            LogLevel::default().directives(),
            "warn,purgecss_core=info,purgecss_plugin=info"
        );
        assert_eq!(
            LogLevel::Off.directives(),
            "warn,purgecss_core=off,purgecss_plugin=off"
        );
    }

    #[test]
    fn env_level_name_overrides_requested_level() {
        assert_eq!(
            resolve_directives(LogLevel::Info, Some("debug")),
            LogLevel::Debug.directives()
        );
    }

    #[test]
    fn env_directive_string_is_used_verbatim() {
        assert_eq!(
            resolve_directives(LogLevel::Info, Some("purgecss_core=trace")),
            "purgecss_core=trace"
        );
    }

    #[test]
    fn blank_env_falls_back_to_requested_level() {
        assert_eq!(
            resolve_directives(LogLevel::Warn, Some("  ")),
            LogLevel::Warn.directives()
        );
        assert_eq!(resolve_directives(LogLevel::Warn, None), LogLevel::Warn.directives());
    }
}
