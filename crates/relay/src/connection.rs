//! Client-Connection – Verwaltet eine einzelne Peer-Verbindung
//!
//! Jede Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Die State Machine verwaltet den Verbindungszustand.
//!
//! ## State Machine
//! ```text
//! Verbindend -> WartetAufNickname -> Aktiv -> Beendet
//!                      |                         ^
//!                      +-------------------------+
//!                 (vergeben, ungueltig, Abbruch)
//! ```
//!
//! Jeder Lesevorgang laeuft gegen das Abbruch-Token des Handles: schliesst
//! ein anderer Pfad die Verbindung (Broadcast-Fehler, Shutdown), kehrt ein
//! haengendes Lesen sofort zurueck.

use std::io;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tresen_core::Nickname;
use tresen_protocol::{zeilen_leser, ClientZeile, ServerNachricht, ZeilenLeser};

use crate::broadcast::Abgang;
use crate::handle::VerbindungsHandle;
use crate::registry::Registrierung;
use crate::server_state::RelayState;

// ---------------------------------------------------------------------------
// Verbindungszustand
// ---------------------------------------------------------------------------

/// Zustand einer Peer-Verbindung
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbindungsZustand {
    /// Verbunden, Willkommen noch nicht gesendet
    Verbindend,
    /// Willkommen gesendet, erste Zeile ist der Nickname
    WartetAufNickname,
    /// Registriert und im Chat
    Aktiv(Nickname),
    /// Endzustand, der Task endet
    Beendet(Abschluss),
}

/// Wie eine Verbindung geendet hat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abschluss {
    /// Nickname war bereits vergeben
    NicknameVergeben,
    /// Nickname war leer
    NicknameUngueltig,
    /// Verbindung endete vor der Registrierung
    HandshakeAbgebrochen,
    /// Peer hat `/quit` gesendet
    Verlassen,
    /// Lesefehler, EOF oder Schliessen durch den Broadcaster
    Getrennt,
    /// Verbindung wurde vom Shutdown beendet
    Heruntergefahren,
}

/// Ergebnis eines Lesevorgangs
enum Eingang {
    Zeile(String),
    Ende,
    Fehler(io::Error),
    Geschlossen,
}

// ---------------------------------------------------------------------------
// ClientConnection
// ---------------------------------------------------------------------------

/// Verarbeitet eine einzelne Verbindung
///
/// Liest Zeilen von der Lesehaelfte; geschrieben wird ausschliesslich ueber
/// den geteilten `VerbindungsHandle`.
pub struct ClientConnection<R> {
    leser: ZeilenLeser<R>,
    handle: Arc<VerbindungsHandle>,
    state: Arc<RelayState>,
    zustand: VerbindungsZustand,
}

impl<R> ClientConnection<R>
where
    R: AsyncRead + Unpin,
{
    /// Erstellt eine neue ClientConnection im Zustand `Verbindend`
    pub fn neu(leser: R, handle: Arc<VerbindungsHandle>, state: Arc<RelayState>) -> Self {
        Self {
            leser: zeilen_leser(leser),
            handle,
            state,
            zustand: VerbindungsZustand::Verbindend,
        }
    }

    pub fn zustand(&self) -> &VerbindungsZustand {
        &self.zustand
    }

    /// Fuehrt die State Machine bis zum Endzustand aus
    pub async fn verarbeiten(mut self) -> Abschluss {
        tracing::debug!(peer = %self.handle.peer(), id = %self.handle.id(), "Neue Verbindung");

        loop {
            if let VerbindungsZustand::Beendet(abschluss) = self.zustand {
                tracing::debug!(
                    peer = %self.handle.peer(),
                    abschluss = ?abschluss,
                    "Verbindungs-Task beendet"
                );
                return abschluss;
            }
            let aktuell = std::mem::replace(&mut self.zustand, VerbindungsZustand::Verbindend);
            self.zustand = self.uebergang(aktuell).await;
        }
    }

    /// Ein Schritt der State Machine
    async fn uebergang(&mut self, zustand: VerbindungsZustand) -> VerbindungsZustand {
        match zustand {
            VerbindungsZustand::Verbindend => self.begruessen().await,
            VerbindungsZustand::WartetAufNickname => self.nickname_empfangen().await,
            VerbindungsZustand::Aktiv(nickname) => self.chat_zeile(nickname).await,
            beendet @ VerbindungsZustand::Beendet(_) => beendet,
        }
    }

    async fn begruessen(&mut self) -> VerbindungsZustand {
        let willkommen = ServerNachricht::Willkommen.to_string();
        if let Err(e) = self.handle.zeile_senden(&willkommen).await {
            tracing::debug!(peer = %self.handle.peer(), fehler = %e, "Willkommen nicht zustellbar");
            return self.handshake_abbrechen().await;
        }
        VerbindungsZustand::WartetAufNickname
    }

    async fn nickname_empfangen(&mut self) -> VerbindungsZustand {
        let zeile = match self.naechster_eingang().await {
            Eingang::Zeile(zeile) => zeile,
            Eingang::Fehler(e) => {
                tracing::debug!(peer = %self.handle.peer(), fehler = %e, "Lesefehler im Handshake");
                return self.handshake_abbrechen().await;
            }
            Eingang::Ende | Eingang::Geschlossen => return self.handshake_abbrechen().await,
        };

        let nickname = match Nickname::pruefen(&zeile) {
            Ok(nickname) => nickname,
            Err(e) => {
                tracing::info!(peer = %self.handle.peer(), fehler = %e, "Nickname abgelehnt");
                return self
                    .ablehnen(ServerNachricht::NicknameUngueltig, Abschluss::NicknameUngueltig)
                    .await;
            }
        };

        match self
            .state
            .registry
            .registrieren(nickname.clone(), Arc::clone(&self.handle))
        {
            Registrierung::Erfolgreich => self.beitreten(nickname).await,
            Registrierung::BereitsVergeben => {
                tracing::info!(
                    peer = %self.handle.peer(),
                    nickname = %nickname,
                    "Nickname bereits vergeben"
                );
                self.ablehnen(ServerNachricht::NicknameVergeben, Abschluss::NicknameVergeben)
                    .await
            }
            Registrierung::Geschlossen => {
                let abschied = ServerNachricht::Herunterfahren.to_string();
                if let Err(e) = self.handle.zeile_senden(&abschied).await {
                    tracing::debug!(peer = %self.handle.peer(), fehler = %e, "Abschied nicht zustellbar");
                }
                self.handle.schliessen().await;
                VerbindungsZustand::Beendet(Abschluss::Heruntergefahren)
            }
        }
    }

    async fn beitreten(&mut self, nickname: Nickname) -> VerbindungsZustand {
        let begruessung = ServerNachricht::Begruessung { nickname: &nickname }.to_string();
        if let Err(e) = self.handle.zeile_senden(&begruessung).await {
            tracing::debug!(peer = %self.handle.peer(), fehler = %e, "Begruessung nicht zustellbar");
            // Noch kein Beitritt angekuendigt, also still abmelden
            self.state
                .registry
                .abmelden_verbindung(&nickname, self.handle.id());
            return self.handshake_abbrechen().await;
        }

        tracing::info!(peer = %self.handle.peer(), nickname = %nickname, "Client beigetreten");
        let beigetreten = ServerNachricht::Beigetreten { nickname: &nickname }.to_string();
        self.state
            .broadcaster
            .senden(&beigetreten, Some(self.handle.id()))
            .await;

        VerbindungsZustand::Aktiv(nickname)
    }

    async fn chat_zeile(&mut self, nickname: Nickname) -> VerbindungsZustand {
        let zeile = match self.naechster_eingang().await {
            Eingang::Zeile(zeile) => zeile,
            Eingang::Ende => {
                tracing::info!(nickname = %nickname, "Verbindung vom Client getrennt");
                return self.abnormal_beenden(&nickname).await;
            }
            Eingang::Fehler(e) => {
                tracing::warn!(nickname = %nickname, fehler = %e, "Lesefehler");
                return self.abnormal_beenden(&nickname).await;
            }
            Eingang::Geschlossen => {
                tracing::debug!(nickname = %nickname, "Verbindung von anderer Stelle geschlossen");
                return self.abnormal_beenden(&nickname).await;
            }
        };

        match ClientZeile::parsen(&zeile) {
            ClientZeile::Quit => {
                let abschied = ServerNachricht::Abschied.to_string();
                if let Err(e) = self.handle.zeile_senden(&abschied).await {
                    tracing::debug!(nickname = %nickname, fehler = %e, "Abschied nicht zustellbar");
                }
                let gemeldet = self
                    .state
                    .broadcaster
                    .abgang_melden(&nickname, &self.handle, Abgang::Regulaer)
                    .await;
                tracing::info!(nickname = %nickname, "Client hat den Chat verlassen");
                VerbindungsZustand::Beendet(self.abschluss(gemeldet, Abschluss::Verlassen))
            }
            ClientZeile::Text(text) => {
                let nachricht = ServerNachricht::Chat {
                    nickname: &nickname,
                    text,
                }
                .to_string();
                self.state
                    .broadcaster
                    .senden(&nachricht, Some(self.handle.id()))
                    .await;
                VerbindungsZustand::Aktiv(nickname)
            }
        }
    }

    /// Lehnt den Nickname ab und schliesst ohne Registrierung
    async fn ablehnen(
        &mut self,
        nachricht: ServerNachricht<'_>,
        abschluss: Abschluss,
    ) -> VerbindungsZustand {
        if let Err(e) = self.handle.zeile_senden(&nachricht.to_string()).await {
            tracing::debug!(peer = %self.handle.peer(), fehler = %e, "Ablehnung nicht zustellbar");
        }
        self.handle.schliessen().await;
        VerbindungsZustand::Beendet(abschluss)
    }

    async fn handshake_abbrechen(&mut self) -> VerbindungsZustand {
        self.handle.schliessen().await;
        let abschluss = if self.state.shutdown.laeuft() {
            Abschluss::HandshakeAbgebrochen
        } else {
            Abschluss::Heruntergefahren
        };
        VerbindungsZustand::Beendet(abschluss)
    }

    async fn abnormal_beenden(&mut self, nickname: &Nickname) -> VerbindungsZustand {
        let gemeldet = self
            .state
            .broadcaster
            .abgang_melden(nickname, &self.handle, Abgang::Abnormal)
            .await;
        VerbindungsZustand::Beendet(self.abschluss(gemeldet, Abschluss::Getrennt))
    }

    /// Hat der Shutdown den Eintrag entnommen, endet die Verbindung als
    /// `Heruntergefahren`
    fn abschluss(&self, gemeldet: bool, regulaer: Abschluss) -> Abschluss {
        if !gemeldet && !self.state.shutdown.laeuft() {
            Abschluss::Heruntergefahren
        } else {
            regulaer
        }
    }

    async fn naechster_eingang(&mut self) -> Eingang {
        tokio::select! {
            biased;
            _ = self.handle.abgebrochen() => Eingang::Geschlossen,
            zeile = self.leser.next() => match zeile {
                Some(Ok(zeile)) => Eingang::Zeile(zeile),
                Some(Err(e)) => Eingang::Fehler(e),
                None => Eingang::Ende,
            },
        }
    }
}

/// Teilt den Stream auf und fuehrt die Verbindung bis zum Ende aus
///
/// Das Abbruch-Token des Handles ist ein Kind des Server-Tokens, damit der
/// Shutdown auch Verbindungen erreicht, die noch nicht registriert sind.
pub async fn verbindung_behandeln<S>(
    stream: S,
    peer: String,
    state: Arc<RelayState>,
) -> Abschluss
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (leser, schreiber) = tokio::io::split(stream);
    let handle = VerbindungsHandle::neu(
        schreiber,
        peer,
        state.shutdown.token().child_token(),
        state.konfig.schreib_timeout,
    );
    ClientConnection::neu(leser, handle, state).verarbeiten().await
}
