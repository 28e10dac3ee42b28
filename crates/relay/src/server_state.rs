//! Gemeinsamer Relay-Zustand
//!
//! Haelt Registry, Broadcaster und Shutdown-Koordinator zusammen, damit
//! jeder Verbindungs-Task nur ein `Arc<RelayState>` braucht.

use std::sync::Arc;
use std::time::Duration;

use crate::broadcast::Broadcaster;
use crate::registry::ClientRegistry;
use crate::shutdown::ShutdownKoordinator;

/// Laufzeit-Konfiguration des Relays
#[derive(Debug, Clone)]
pub struct RelayKonfig {
    /// Obergrenze fuer einen einzelnen Schreibvorgang an einen Peer
    pub schreib_timeout: Duration,
    /// Obergrenze fuer den TLS-Handshake einer neuen Verbindung
    pub tls_handshake_timeout: Duration,
}

impl Default for RelayKonfig {
    fn default() -> Self {
        Self {
            schreib_timeout: Duration::from_secs(5),
            tls_handshake_timeout: Duration::from_secs(10),
        }
    }
}

/// Gemeinsamer Relay-Zustand (Arc-geteilt)
#[derive(Debug)]
pub struct RelayState {
    pub konfig: RelayKonfig,
    /// Nickname -> Verbindung
    pub registry: ClientRegistry,
    pub broadcaster: Broadcaster,
    pub shutdown: ShutdownKoordinator,
}

impl RelayState {
    /// Erstellt einen neuen RelayState mit leerer Registry
    pub fn neu(konfig: RelayKonfig) -> Arc<Self> {
        let registry = ClientRegistry::neu();
        Arc::new(Self {
            konfig,
            broadcaster: Broadcaster::neu(registry.clone()),
            shutdown: ShutdownKoordinator::neu(registry.clone()),
            registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardwerte() {
        let konfig = RelayKonfig::default();
        assert_eq!(konfig.schreib_timeout, Duration::from_secs(5));
        assert_eq!(konfig.tls_handshake_timeout, Duration::from_secs(10));
    }

    #[test]
    fn neuer_zustand_laeuft_mit_leerer_registry() {
        let state = RelayState::neu(RelayKonfig::default());
        assert!(state.registry.ist_leer());
        assert!(state.shutdown.laeuft());
    }
}
