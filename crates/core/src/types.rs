//! Gemeinsame Identifikationstypen fuer Tresen
//!
//! Newtype-Pattern, damit Nicknames und Verbindungs-IDs nicht mit
//! beliebigen Strings oder Zahlen verwechselt werden.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, TresenError};

/// Vom Peer im Handshake gewaehlter Anzeigename
///
/// Wird unveraendert uebernommen (keine Normalisierung, keine
/// Gross-/Kleinschreibungs-Faltung). Nur leere oder reine
/// Whitespace-Namen werden abgelehnt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nickname(String);

impl Nickname {
    /// Prueft eine Handshake-Zeile und erstellt daraus einen Nickname
    pub fn pruefen(roh: &str) -> Result<Self> {
        if roh.trim().is_empty() {
            return Err(TresenError::UngueltigerNickname(
                "Nickname darf nicht leer sein".into(),
            ));
        }
        Ok(Self(roh.to_string()))
    }

    /// Gibt den Nickname als String-Slice zurueck
    pub fn als_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Nickname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Nickname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Prozessweit eindeutige Kennung einer akzeptierten Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerbindungsId(u64);

impl VerbindungsId {
    /// Vergibt die naechste freie ID (monoton steigend)
    pub fn naechste() -> Self {
        static ZAEHLER: AtomicU64 = AtomicU64::new(1);
        Self(ZAEHLER.fetch_add(1, Ordering::Relaxed))
    }

    /// Gibt den inneren Zahlenwert zurueck
    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}
