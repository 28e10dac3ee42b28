//! Fehlertypen fuer das Relay

use std::time::Duration;

use thiserror::Error;

/// Fehlertyp fuer das Relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO-Fehler (TCP, TLS, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Verbindung wurde bereits geschlossen
    #[error("Verbindung geschlossen")]
    VerbindungGeschlossen,

    /// Schreiben hat das Zeitlimit ueberschritten
    #[error("Schreib-Timeout nach {0:?}")]
    Timeout(Duration),
}

/// Result-Typ fuer das Relay
pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    /// Gibt true zurueck wenn der Empfaenger schon vorher geschlossen war
    ///
    /// Solche Fehler entstehen, wenn ein Snapshot einen Handle enthaelt, den
    /// ein anderer Pfad gerade abgemeldet und geschlossen hat.
    pub fn ist_bereits_geschlossen(&self) -> bool {
        matches!(self, Self::VerbindungGeschlossen)
    }
}
