//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Zertifikat-Generierung fehlgeschlagen: {0}")]
    ZertifikatGenerierung(String),

    #[error("Kein Zertifikat in '{0}' gefunden")]
    KeinZertifikat(String),

    #[error("Ungueltiger Servername: {0}")]
    UngueltigerServername(String),

    #[error("TLS-Fehler: {0}")]
    Tls(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

impl CryptoError {
    /// Gibt true zurueck wenn eine Datei schlicht nicht existiert
    pub fn ist_datei_fehlt(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
