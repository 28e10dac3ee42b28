//! Shutdown-Koordinator – Faehrt den Server genau einmal herunter
//!
//! Ablauf:
//! 1. Laeuft-Flag per Compare-and-Swap auf `false` setzen
//! 2. Registry schliessen und in einem Schritt leeren
//! 3. Jedem entnommenen Peer den Abschied senden und den Handle schliessen
//! 4. Server-Token abbrechen: Accept-Loop endet, Handler im Handshake
//!    bemerken den Abbruch
//!
//! Ein zweiter Aufruf kehrt sofort ohne Wirkung zurueck.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tresen_protocol::ServerNachricht;

use crate::registry::ClientRegistry;

/// Koordiniert das geordnete Herunterfahren
#[derive(Debug)]
pub struct ShutdownKoordinator {
    laeuft: AtomicBool,
    registry: ClientRegistry,
    token: CancellationToken,
}

impl ShutdownKoordinator {
    pub fn neu(registry: ClientRegistry) -> Self {
        Self {
            laeuft: AtomicBool::new(true),
            registry,
            token: CancellationToken::new(),
        }
    }

    /// `true` solange der Shutdown noch nicht ausgeloest wurde
    pub fn laeuft(&self) -> bool {
        self.laeuft.load(Ordering::Acquire)
    }

    /// Server-weites Abbruch-Token; Handle-Tokens sind Kinder davon
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Faehrt herunter; gibt `true` zurueck wenn dieser Aufruf es getan hat
    pub async fn herunterfahren(&self) -> bool {
        if self
            .laeuft
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Shutdown bereits ausgeloest");
            return false;
        }

        let entnommen = self.registry.schliessen_und_leeren();
        tracing::info!(clients = entnommen.len(), "Server wird heruntergefahren");

        let abschied = ServerNachricht::Herunterfahren.to_string();
        for (nickname, handle) in entnommen {
            if let Err(e) = handle.zeile_senden(&abschied).await {
                tracing::debug!(nickname = %nickname, fehler = %e, "Abschied nicht zustellbar");
            }
            handle.schliessen().await;
        }

        self.token.cancel();
        tracing::info!("Shutdown abgeschlossen");
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::VerbindungsHandle;
    use crate::registry::Registrierung;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tresen_core::Nickname;

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn shutdown_leert_registry_und_schliesst_handles() {
        let registry = ClientRegistry::neu();
        let koordinator = ShutdownKoordinator::neu(registry.clone());

        let mut gegenseiten = Vec::new();
        let mut handles = Vec::new();
        for name in ["alice", "bob"] {
            let (gegenseite, lokal) = tokio::io::duplex(1024);
            let handle = VerbindungsHandle::neu(
                lokal,
                name,
                koordinator.token().child_token(),
                TIMEOUT,
            );
            registry.registrieren(Nickname::pruefen(name).unwrap(), Arc::clone(&handle));
            gegenseiten.push(gegenseite);
            handles.push(handle);
        }

        assert!(koordinator.herunterfahren().await);
        assert!(!koordinator.laeuft());
        assert!(registry.ist_leer());
        assert!(koordinator.token().is_cancelled());
        assert!(handles.iter().all(|h| h.ist_geschlossen()));

        for mut gegenseite in gegenseiten {
            let mut empfangen = String::new();
            gegenseite.read_to_string(&mut empfangen).await.unwrap();
            assert_eq!(empfangen, "Server is shutting down. Goodbye!\n");
        }
    }

    #[tokio::test]
    async fn zweiter_aufruf_ohne_wirkung() {
        let registry = ClientRegistry::neu();
        let koordinator = ShutdownKoordinator::neu(registry.clone());

        assert!(koordinator.herunterfahren().await);
        assert!(!koordinator.herunterfahren().await);
    }

    #[tokio::test]
    async fn registrierung_nach_shutdown_geschlossen() {
        let registry = ClientRegistry::neu();
        let koordinator = ShutdownKoordinator::neu(registry.clone());
        koordinator.herunterfahren().await;

        let handle =
            VerbindungsHandle::neu(tokio::io::sink(), "spaet", CancellationToken::new(), TIMEOUT);
        assert_eq!(
            registry.registrieren(Nickname::pruefen("spaet").unwrap(), handle),
            Registrierung::Geschlossen
        );
    }

    #[tokio::test]
    async fn toter_peer_blockiert_shutdown_nicht() {
        let registry = ClientRegistry::neu();
        let koordinator = ShutdownKoordinator::neu(registry.clone());

        let (gegenseite, lokal) = tokio::io::duplex(1024);
        drop(gegenseite);
        let handle = VerbindungsHandle::neu(lokal, "weg", CancellationToken::new(), TIMEOUT);
        registry.registrieren(Nickname::pruefen("weg").unwrap(), Arc::clone(&handle));

        assert!(koordinator.herunterfahren().await);
        assert!(handle.ist_geschlossen());
    }
}
