use std::str::FromStr;

use serde_derive::Deserialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::MemoError;

/// Log output format types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format with timestamp, level, target, and message
    #[default]
    Text,
    /// JSON format with structured fields: timestamp, level, target, fields
    Json,
}

impl FromStr for LogFormat {
    type Err = MemoError;

    /// Parses `"text"` or `"json"`, ignoring case and surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use memofn::utils::logging::LogFormat;
    ///
    /// assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    /// assert!("xml".parse::<LogFormat>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(MemoError::LoggingInit(format!(
                "unknown log format `{}`, expected `text` or `json`",
                other
            ))),
        }
    }
}

/// Installs the global tracing subscriber.
///
/// Sets up:
/// - an `EnvFilter` read from `RUST_LOG`, falling back to `info`
/// - a `fmt` layer in the requested format
/// - the `log` to `tracing` bridge, so the crate's `log` records (cache
///   creation, misses, failures) reach the subscriber
///
/// Calling it again once a subscriber is installed is a no-op, so tests and
/// demos can all call it.
///
/// # Examples
///
/// ```
/// use memofn::utils::logging::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Text).unwrap();
/// ```
pub fn init_logging(format: LogFormat) -> Result<(), MemoError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (text_layer, json_layer) = match format {
        LogFormat::Text => (
            Some(fmt::layer().with_target(true).with_thread_names(true)),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_current_span(false))),
    };

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .try_init();

    match result {
        Ok(()) => {
            tracing::debug!(?format, "logging initialized");
            Ok(())
        }
        Err(e) => {
            // Another subscriber is already installed; keep it.
            eprintln!(
                "Tracing subscriber already initialized or failed to initialize: {:?}",
                e
            );
            Ok(())
        }
    }
}

/// Parses `format` and installs the subscriber.
///
/// # Errors
///
/// Returns [`MemoError::LoggingInit`] when `format` is not a known format name.
pub fn init_logging_from_str(format: &str) -> Result<(), MemoError> {
    init_logging(format.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(" text ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Text);

        let err = "yaml".parse::<LogFormat>().unwrap_err();
        assert!(err.to_string().contains("yaml"));
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        assert!(init_logging(LogFormat::Text).is_ok());
        assert!(init_logging(LogFormat::Json).is_ok());
        assert!(init_logging_from_str("text").is_ok());
        assert!(init_logging_from_str("bogus").is_err());
    }
}
