/// Telemetry Module - Structured Logging with Tracing
///
/// - JSON vs pretty format
/// - Optional log file with daily/hourly rotation
/// - RUST_LOG overrides the configured level
/// - Truncation helpers for long hashes and address lists

use std::path::Path;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingSettings;

pub const LOG_FORMAT_ENV: &str = "OBSERVATORY_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "OBSERVATORY_LOG_FILE";

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub log_level: String,
    /// Log format: "json" or "pretty"
    pub log_format: String,
    /// Optional log file path (None = console only)
    pub log_file: Option<String>,
    /// Rotation interval: "daily", "hourly", "never"
    pub rotation: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::from(&LoggingSettings::default())
    }
}

impl From<&LoggingSettings> for TelemetryConfig {
    /// Settings from the config file; the `OBSERVATORY_LOG_*` variables win.
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            log_level: settings.level.clone(),
            log_format: std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| settings.format.clone()),
            log_file: std::env::var(LOG_FILE_ENV).ok().or_else(|| settings.file.clone()),
            rotation: settings.rotation.clone(),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize tracing subscriber
///
/// Must be called once per process.
pub fn init_tracing(config: TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let layer = match &config.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path, &config.rotation)?);
            // Logs are only flushed while the guard lives
            std::mem::forget(guard);
            log_layer(&config.log_format, writer, false)
        }
        None => log_layer(&config.log_format, std::io::stdout, true),
    };

    tracing_subscriber::registry().with(layer).with(env_filter).init();
    Ok(())
}

/// JSON or human-readable output to `writer`.
fn log_layer<W>(format: &str, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if format == "json" {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    }
}

/// Appender for `path`. Rotated files are named after the file stem;
/// `never` writes to `path` itself.
fn file_appender(path: &str, rotation: &str) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let path = Path::new(path);
    let directory = path.parent().ok_or("Invalid log file path: no parent directory")?;
    let file_name = path.file_name().ok_or("Invalid log file path: no filename")?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or("Invalid log file path: no filename")?;

    Ok(match rotation {
        "hourly" => rolling::hourly(directory, stem),
        "never" => rolling::never(directory, file_name),
        _ => rolling::daily(directory, stem),
    })
}

/// Truncate a transaction hash for logging
///
/// Example: "0A1B2C3D4E5F67890A1B2C3D4E5F6789" → "0A1B2C3D4E5F6789..."
pub fn truncate_hash(hash: &str, len: usize) -> String {
    match hash.char_indices().nth(len) {
        Some((idx, _)) => format!("{}...", &hash[..idx]),
        None => hash.to_string(),
    }
}

/// Truncate list for logging
///
/// Shows first N items, indicates total count if longer
///
/// Example: ["a", "b", "c", "d", "e", "f"] (max 3) → "[3 of 6]: [a, b, c]"
pub fn truncate_list<T: std::fmt::Display + std::fmt::Debug>(items: &[T], max: usize) -> String {
    if items.len() <= max {
        format!("{:?}", items)
    } else {
        let preview: Vec<String> = items.iter().take(max).map(|i| i.to_string()).collect();
        format!("[{} of {}]: {:?}", max, items.len(), preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_hash() {
        assert_eq!(truncate_hash("abcd", 16), "abcd");
        assert_eq!(truncate_hash("0123456789ABCDEF0123456789ABCDEF", 16), "0123456789ABCDEF...");
        assert_eq!(truncate_hash("", 16), "");
    }

    #[test]
    fn test_truncate_list() {
        let short = vec!["ordos1a", "harkonnen1b"];
        assert_eq!(truncate_list(&short, 5), r#"["ordos1a", "harkonnen1b"]"#);

        let long: Vec<String> = (0..6).map(|i| format!("addr{}", i)).collect();
        assert_eq!(truncate_list(&long, 3), r#"[3 of 6]: ["addr0", "addr1", "addr2"]"#);
    }

    #[test]
    fn test_config_from_settings() {
        let settings = LoggingSettings {
            level: "debug".to_string(),
            format: "json".to_string(),
            file: Some("/var/log/observatory.log".to_string()),
            rotation: "hourly".to_string(),
        };
        let config = TelemetryConfig::from(&settings);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.rotation, "hourly");
    }

    #[test]
    fn test_file_appender_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observatory.log");
        let path = path.to_str().unwrap();

        for rotation in ["daily", "hourly", "never"] {
            assert!(file_appender(path, rotation).is_ok(), "{}", rotation);
        }
        assert!(file_appender("/", "daily").is_err());
    }
}
