//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `TRESEN_LOG_LEVEL`: Log-Level oder EnvFilter-Direktive, Standard: info
//! - `TRESEN_LOG_FORMAT`: Format (text/json), Standard: text

use tracing_subscriber::{fmt, EnvFilter};

/// Wohin die Log-Zeilen geschrieben werden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAusgabe {
    /// Standard fuer den Server
    Stdout,
    /// Fuer den Client, dessen stdout den Chat-Zeilen gehoert
    Stderr,
}

/// Initialisiert das Logging-System.
///
/// Liest `TRESEN_LOG_LEVEL` und `TRESEN_LOG_FORMAT` aus der Umgebung.
/// Faellt auf die uebergebenen Werte und zuletzt auf `info` / `text` zurueck.
pub fn logging_initialisieren(level: &str, format: &str, ausgabe: LogAusgabe) {
    let filter = EnvFilter::try_from_env("TRESEN_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format_env = std::env::var("TRESEN_LOG_FORMAT").unwrap_or_else(|_| format.to_string());

    match (format_env.as_str(), ausgabe) {
        ("json", LogAusgabe::Stdout) => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        ("json", LogAusgabe::Stderr) => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        (_, LogAusgabe::Stdout) => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
        (_, LogAusgabe::Stderr) => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_gueltige_werte() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(log_level_gueltig(level), "{level} muss gueltig sein");
        }
    }

    #[test]
    fn log_level_ungueltige_werte() {
        assert!(!log_level_gueltig("verbose"));
        assert!(!log_level_gueltig("INFO")); // Gross-/Kleinschreibung
        assert!(!log_level_gueltig(""));
    }

    #[test]
    fn log_format_werte() {
        assert!(log_format_gueltig("text"));
        assert!(log_format_gueltig("json"));
        assert!(!log_format_gueltig("xml"));
        assert!(!log_format_gueltig("JSON"));
    }
}
