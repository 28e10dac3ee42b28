//! tresen-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die Relay, Server und Client
//! gemeinsam nutzen: den Nickname eines Peers, die prozessweite
//! Verbindungs-ID und den zentralen Fehlertyp.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{Result, TresenError};
pub use types::{Nickname, VerbindungsId};
