//! Fehlertypen fuer Tresen
//!
//! Fehler der gemeinsamen Typen. Relay, Crypto und die Binaries definieren
//! eigene Fehler fuer ihre Schicht.

use thiserror::Error;

/// Globaler Result-Alias fuer Tresen
pub type Result<T> = std::result::Result<T, TresenError>;

/// Fehler der gemeinsamen Typen
#[derive(Debug, Error)]
pub enum TresenError {
    // --- Handshake ---
    #[error("Ungueltiger Nickname: {0}")]
    UngueltigerNickname(String),
}
