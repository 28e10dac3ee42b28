//! Verbindungs-Handle – Schreibseite einer einzelnen Peer-Verbindung
//!
//! Nach der Registrierung teilen sich Handler, Broadcaster und
//! Shutdown-Koordinator denselben Handle. Schreibzugriffe laufen ueber
//! einen async Mutex, damit Zeilen verschiedener Absender nie ineinander
//! geschrieben werden. `schliessen` ist idempotent: nur der erste Aufruf
//! gewinnt das Compare-and-Swap und gibt die Schreibhaelfte frei.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tresen_core::VerbindungsId;
use tresen_protocol::zeile_schreiben;

use crate::error::{RelayError, RelayResult};

type Schreiber = Box<dyn AsyncWrite + Send + Unpin>;

/// Geteilter Handle auf die Schreibseite einer Verbindung
pub struct VerbindungsHandle {
    id: VerbindungsId,
    peer: String,
    schreiber: Mutex<Option<Schreiber>>,
    geschlossen: AtomicBool,
    /// Wird beim Schliessen ausgeloest; der Handler bricht damit sein Lesen ab
    abbruch: CancellationToken,
    schreib_timeout: Duration,
}

impl VerbindungsHandle {
    /// Erstellt einen neuen Handle um die Schreibhaelfte einer Verbindung
    pub fn neu<W>(
        schreiber: W,
        peer: impl Into<String>,
        abbruch: CancellationToken,
        schreib_timeout: Duration,
    ) -> Arc<Self>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Arc::new(Self {
            id: VerbindungsId::naechste(),
            peer: peer.into(),
            schreiber: Mutex::new(Some(Box::new(schreiber))),
            geschlossen: AtomicBool::new(false),
            abbruch,
            schreib_timeout,
        })
    }

    pub fn id(&self) -> VerbindungsId {
        self.id
    }

    /// Remote-Adresse (oder Testbezeichnung) fuer Logs
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn ist_geschlossen(&self) -> bool {
        self.geschlossen.load(Ordering::Acquire)
    }

    /// Future, das fertig wird sobald der Handle geschlossen oder der
    /// Server heruntergefahren wird
    pub fn abgebrochen(&self) -> WaitForCancellationFuture<'_> {
        self.abbruch.cancelled()
    }

    /// Sendet eine Zeile, begrenzt durch das Schreib-Timeout
    pub async fn zeile_senden(&self, zeile: &str) -> RelayResult<()> {
        if self.ist_geschlossen() {
            return Err(RelayError::VerbindungGeschlossen);
        }

        let mut guard = self.schreiber.lock().await;
        let schreiber = guard.as_mut().ok_or(RelayError::VerbindungGeschlossen)?;

        match tokio::time::timeout(self.schreib_timeout, zeile_schreiben(schreiber, zeile)).await {
            Ok(ergebnis) => ergebnis.map_err(RelayError::Io),
            Err(_) => Err(RelayError::Timeout(self.schreib_timeout)),
        }
    }

    /// Schliesst die Verbindung genau einmal
    ///
    /// Gibt `true` zurueck wenn dieser Aufruf geschlossen hat, `false` wenn
    /// die Verbindung bereits geschlossen war.
    pub async fn schliessen(&self) -> bool {
        if self
            .geschlossen
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        self.abbruch.cancel();

        let schreiber = self.schreiber.lock().await.take();
        if let Some(mut schreiber) = schreiber {
            match tokio::time::timeout(self.schreib_timeout, schreiber.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!(peer = %self.peer, fehler = %e, "Shutdown der Schreibhaelfte fehlgeschlagen");
                }
                Err(_) => {
                    tracing::debug!(peer = %self.peer, "Shutdown der Schreibhaelfte Timeout");
                }
            }
        }

        tracing::debug!(peer = %self.peer, id = %self.id, "Verbindung geschlossen");
        true
    }
}

impl std::fmt::Debug for VerbindungsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerbindungsHandle")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("geschlossen", &self.ist_geschlossen())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
