//! tresen-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod konsole;
pub mod tls;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use config::ServerConfig;
use tresen_relay::{ChatServer, RelayState};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    state: Arc<RelayState>,
    chat: ChatServer,
}

impl Server {
    /// Laedt TLS-Material und bindet den Listener
    pub async fn binden(config: ServerConfig) -> Result<Self> {
        let acceptor = tls::acceptor_erstellen(&config.tls)?;
        let state = RelayState::neu(config.relay_konfig());

        let adresse = config.bind_adresse();
        let chat = ChatServer::binden(Arc::clone(&state), &adresse, acceptor)
            .await
            .with_context(|| format!("Bind auf {adresse} fehlgeschlagen"))?;

        Ok(Self {
            config,
            state,
            chat,
        })
    }

    pub fn lokale_adresse(&self) -> Result<SocketAddr> {
        Ok(self.chat.lokale_adresse()?)
    }

    /// Geteilter Relay-Zustand (Registry, Shutdown)
    pub fn state(&self) -> &Arc<RelayState> {
        &self.state
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown
    ///
    /// Reihenfolge:
    /// 1. Operator-Konsole starten (falls aktiviert)
    /// 2. Auf Ctrl-C warten (eigener Task)
    /// 3. Accept-Loop ausfuehren bis der Shutdown-Koordinator sie beendet
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            adresse = %self.lokale_adresse()?,
            konsole = self.config.konsole.aktiviert,
            "Server startet"
        );

        if self.config.konsole.aktiviert {
            konsole::konsole_starten(
                Arc::clone(&self.state),
                tokio::runtime::Handle::current(),
            )
            .context("Konsolen-Thread konnte nicht gestartet werden")?;
        }

        let signal_state = Arc::clone(&self.state);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown-Signal empfangen");
                signal_state.shutdown.herunterfahren().await;
            }
        });

        self.chat
            .starten()
            .await
            .context("Accept-Loop mit Fehler beendet")?;

        tracing::info!("Server beendet");
        Ok(())
    }
}
