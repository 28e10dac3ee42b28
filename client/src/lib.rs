//! tresen-client – Terminal-Client fuer den Tresen Chat-Server
//!
//! Stellt Konfiguration und Verbindungslogik fuer das Binary und fuer
//! Integrationstests bereit.

pub mod config;
pub mod verbindung;

pub use config::ClientConfig;
pub use verbindung::{chat_relay, eingabe_thread_starten, verbinden, ClientEnde};
