//! TCP-Listener – Bindet Socket, akzeptiert TLS-Verbindungen
//!
//! Der `ChatServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task: erst der TLS-Handshake
//! (mit Timeout), dann die `ClientConnection`.
//!
//! Die Loop endet, sobald das Server-Token abgebrochen wird; der Listener
//! wird dabei fallengelassen und damit geschlossen.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

use crate::connection::verbindung_behandeln;
use crate::server_state::RelayState;

/// Pause nach einem voruebergehenden Accept-Fehler
const ACCEPT_PAUSE: Duration = Duration::from_millis(10);

/// TLS-Chat-Server
pub struct ChatServer {
    state: Arc<RelayState>,
    listener: TcpListener,
    acceptor: TlsAcceptor,
}

impl ChatServer {
    /// Bindet den TCP-Socket
    pub async fn binden(
        state: Arc<RelayState>,
        adresse: &str,
        acceptor: TlsAcceptor,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(adresse).await?;
        Ok(Self {
            state,
            listener,
            acceptor,
        })
    }

    pub fn lokale_adresse(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Akzeptiert Verbindungen bis zum Shutdown
    ///
    /// Ein nicht voruebergehender Accept-Fehler fuehrt den Shutdown aus und
    /// wird dann zurueckgegeben.
    pub async fn starten(self) -> io::Result<()> {
        let token = self.state.shutdown.token().clone();

        tracing::info!(
            adresse = %self.lokale_adresse()?,
            "Chat-Server gestartet"
        );

        let ergebnis = loop {
            tokio::select! {
                biased;

                // Shutdown-Signal
                _ = token.cancelled() => {
                    tracing::info!("Chat-Server: Shutdown-Signal empfangen");
                    break Ok(());
                }

                // Neue eingehende Verbindung
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");
                            self.verbindung_starten(stream, peer_addr);
                        }
                        Err(e) if ist_voruebergehend(&e) => {
                            tracing::warn!(fehler = %e, "Voruebergehender Accept-Fehler");
                            tokio::time::sleep(ACCEPT_PAUSE).await;
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            break Err(e);
                        }
                    }
                }
            }
        };

        if ergebnis.is_err() {
            self.state.shutdown.herunterfahren().await;
        }

        drop(self.listener);
        tracing::info!("Chat-Server gestoppt");
        ergebnis
    }

    fn verbindung_starten(&self, stream: TcpStream, peer_addr: SocketAddr) {
        let acceptor = self.acceptor.clone();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let token = state.shutdown.token().clone();
            let handshake_timeout = state.konfig.tls_handshake_timeout;

            let tls = tokio::select! {
                _ = token.cancelled() => return,
                ergebnis = tokio::time::timeout(handshake_timeout, acceptor.accept(stream)) => {
                    match ergebnis {
                        Ok(Ok(tls)) => tls,
                        Ok(Err(e)) => {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "TLS-Handshake fehlgeschlagen");
                            return;
                        }
                        Err(_) => {
                            tracing::warn!(peer = %peer_addr, "TLS-Handshake Timeout");
                            return;
                        }
                    }
                }
            };

            let abschluss = verbindung_behandeln(tls, peer_addr.to_string(), state).await;
            tracing::debug!(peer = %peer_addr, abschluss = ?abschluss, "Verbindung beendet");
        });
    }
}

/// Accept-Fehler, nach denen die Loop weiterlaufen kann
///
/// Dazu zaehlen vom Peer abgebrochene Verbindungen und erschoepfte
/// Dateideskriptoren (ENFILE/EMFILE).
pub fn ist_voruebergehend(fehler: &io::Error) -> bool {
    use io::ErrorKind::*;

    if matches!(
        fehler.kind(),
        ConnectionAborted | ConnectionReset | ConnectionRefused | Interrupted | WouldBlock | TimedOut
    ) {
        return true;
    }
    deskriptoren_erschoepft(fehler)
}

/// Datei-Deskriptoren von Prozess oder System erschoepft
#[cfg(unix)]
fn deskriptoren_erschoepft(fehler: &io::Error) -> bool {
    // Auf Linux, macOS und den BSDs gleich belegt
    const ENFILE: i32 = 23;
    const EMFILE: i32 = 24;
    matches!(fehler.raw_os_error(), Some(ENFILE | EMFILE))
}

#[cfg(not(unix))]
fn deskriptoren_erschoepft(_fehler: &io::Error) -> bool {
    false
}
