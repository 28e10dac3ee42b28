//! Broadcaster – Verteilt eine Zeile an alle registrierten Clients
//!
//! Jeder Aufruf arbeitet auf einem Registry-Snapshot und schreibt in
//! Snapshot-Reihenfolge. Ein fehlschlagender Empfaenger bricht die
//! Verteilung nicht ab: er wird abgemeldet, geschlossen, und sein
//! abnormaler Abgang wird anschliessend an die Uebrigen gemeldet.
//!
//! Folge-Hinweise landen in einer Warteschlange innerhalb desselben
//! Aufrufs statt rekursiv verteilt zu werden.

use std::collections::VecDeque;

use tresen_core::{Nickname, VerbindungsId};
use tresen_protocol::ServerNachricht;

use crate::handle::VerbindungsHandle;
use crate::registry::ClientRegistry;

/// Art eines Abgangs aus dem Chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abgang {
    /// Peer hat `/quit` gesendet
    Regulaer,
    /// Lesefehler, Schreibfehler oder Verbindungsabbruch
    Abnormal,
}

/// Ergebnis eines Broadcasts (nur die urspruengliche Nachricht)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastBericht {
    /// Anzahl der Empfaenger, an die geschrieben wurde
    pub zugestellt: usize,
    /// Empfaenger, deren Schreiben fehlschlug
    pub fehlgeschlagen: Vec<Nickname>,
}

/// Zentrale Broadcast-Engine
///
/// Clone teilt die Registry.
#[derive(Clone, Debug)]
pub struct Broadcaster {
    registry: ClientRegistry,
}

impl Broadcaster {
    pub fn neu(registry: ClientRegistry) -> Self {
        Self { registry }
    }

    /// Sendet `nachricht` an alle registrierten Clients ausser `ausgeschlossen`
    pub async fn senden(
        &self,
        nachricht: &str,
        ausgeschlossen: Option<VerbindungsId>,
    ) -> BroadcastBericht {
        let mut bericht = BroadcastBericht::default();
        let mut folge_hinweise = VecDeque::new();

        self.verteilen(nachricht, ausgeschlossen, Some(&mut bericht), &mut folge_hinweise)
            .await;

        while let Some((hinweis, ausgeschlossen)) = folge_hinweise.pop_front() {
            self.verteilen(&hinweis, Some(ausgeschlossen), None, &mut folge_hinweise)
                .await;
        }

        bericht
    }

    /// Meldet eine Verbindung ab, benachrichtigt die Uebrigen und schliesst sie
    ///
    /// Der Hinweis geht nur raus, wenn dieser Aufruf den Registry-Eintrag
    /// tatsaechlich entfernt hat; so wird jeder Abgang hoechstens einmal
    /// gemeldet, egal wie viele Pfade gleichzeitig aufraeumen. Gibt zurueck,
    /// ob gemeldet wurde.
    pub async fn abgang_melden(
        &self,
        nickname: &Nickname,
        handle: &VerbindungsHandle,
        abgang: Abgang,
    ) -> bool {
        let entfernt = self.registry.abmelden_verbindung(nickname, handle.id());

        if entfernt {
            let hinweis = match abgang {
                Abgang::Regulaer => ServerNachricht::Verlassen { nickname },
                Abgang::Abnormal => ServerNachricht::Abgebrochen { nickname },
            };
            self.senden(&hinweis.to_string(), Some(handle.id())).await;
        }

        handle.schliessen().await;
        entfernt
    }

    async fn verteilen(
        &self,
        nachricht: &str,
        ausgeschlossen: Option<VerbindungsId>,
        mut bericht: Option<&mut BroadcastBericht>,
        folge_hinweise: &mut VecDeque<(String, VerbindungsId)>,
    ) {
        for (nickname, handle) in self.registry.snapshot() {
            if Some(handle.id()) == ausgeschlossen {
                continue;
            }

            match handle.zeile_senden(nachricht).await {
                Ok(()) => {
                    if let Some(bericht) = bericht.as_deref_mut() {
                        bericht.zugestellt += 1;
                    }
                }
                Err(e) => {
                    if e.ist_bereits_geschlossen() {
                        tracing::debug!(nickname = %nickname, "Empfaenger bereits geschlossen");
                    } else {
                        tracing::warn!(
                            nickname = %nickname,
                            peer = %handle.peer(),
                            fehler = %e,
                            "Broadcast an Empfaenger fehlgeschlagen"
                        );
                    }

                    if self.registry.abmelden_verbindung(&nickname, handle.id()) {
                        let hinweis = ServerNachricht::Abgebrochen { nickname: &nickname };
                        folge_hinweise.push_back((hinweis.to_string(), handle.id()));
                    }
                    handle.schliessen().await;

                    if let Some(bericht) = bericht.as_deref_mut() {
                        bericht.fehlgeschlagen.push(nickname);
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registrierung;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream};
    use tokio_util::sync::CancellationToken;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn nick(name: &str) -> Nickname {
        Nickname::pruefen(name).unwrap()
    }

    /// Registriert einen Peer und gibt dessen Lese-Seite zurueck
    fn peer_registrieren(
        registry: &ClientRegistry,
        name: &str,
    ) -> (Arc<VerbindungsHandle>, BufReader<DuplexStream>) {
        let (gegenseite, lokal) = tokio::io::duplex(4096);
        let handle = VerbindungsHandle::neu(lokal, name, CancellationToken::new(), TIMEOUT);
        assert_eq!(
            registry.registrieren(nick(name), Arc::clone(&handle)),
            Registrierung::Erfolgreich
        );
        (handle, BufReader::new(gegenseite))
    }

    async fn zeile(leser: &mut BufReader<DuplexStream>) -> String {
        let mut zeile = String::new();
        tokio::time::timeout(Duration::from_secs(1), leser.read_line(&mut zeile))
            .await
            .expect("Zeile erwartet")
            .unwrap();
        zeile.trim_end_matches('\n').to_string()
    }

    #[tokio::test]
    async fn an_alle_ausser_absender() {
        let registry = ClientRegistry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());

        let (alice, mut alice_rx) = peer_registrieren(&registry, "alice");
        let (_bob, mut bob_rx) = peer_registrieren(&registry, "bob");
        let (_carol, mut carol_rx) = peer_registrieren(&registry, "carol");

        let bericht = broadcaster.senden("alice: hallo", Some(alice.id())).await;
        assert_eq!(bericht.zugestellt, 2);
        assert!(bericht.fehlgeschlagen.is_empty());

        assert_eq!(zeile(&mut bob_rx).await, "alice: hallo");
        assert_eq!(zeile(&mut carol_rx).await, "alice: hallo");

        let mut nichts = String::new();
        let ergebnis = tokio::time::timeout(
            Duration::from_millis(50),
            alice_rx.read_line(&mut nichts),
        )
        .await;
        assert!(ergebnis.is_err(), "Absender darf kein Echo erhalten");
    }

    #[tokio::test]
    async fn ohne_ausschluss_an_alle() {
        let registry = ClientRegistry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());

        let mut leser: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| peer_registrieren(&registry, n))
            .collect();

        let bericht = broadcaster.senden("Hinweis", None).await;
        assert_eq!(bericht.zugestellt, 4);
        for (_, rx) in &mut leser {
            assert_eq!(zeile(rx).await, "Hinweis");
        }
    }

    #[tokio::test]
    async fn fehlerhafter_empfaenger_wird_isoliert() {
        let registry = ClientRegistry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());

        let (alice, _alice_rx) = peer_registrieren(&registry, "alice");
        let (bob, bob_rx) = peer_registrieren(&registry, "bob");
        let (_carol, mut carol_rx) = peer_registrieren(&registry, "carol");

        // bob ist weg: jeder Schreibversuch liefert BrokenPipe
        drop(bob_rx);

        let bericht = broadcaster.senden("alice: hallo", Some(alice.id())).await;
        assert_eq!(bericht.zugestellt, 1);
        assert_eq!(bericht.fehlgeschlagen, vec![nick("bob")]);

        assert!(!registry.ist_registriert(&nick("bob")));
        assert!(bob.ist_geschlossen());

        assert_eq!(zeile(&mut carol_rx).await, "alice: hallo");
        assert_eq!(
            zeile(&mut carol_rx).await,
            "bob has disconnected due to an error."
        );
    }

    #[tokio::test]
    async fn abgang_wird_nur_einmal_gemeldet() {
        let registry = ClientRegistry::neu();
        let broadcaster = Broadcaster::neu(registry.clone());

        let (alice, _alice_rx) = peer_registrieren(&registry, "alice");
        let (_bob, mut bob_rx) = peer_registrieren(&registry, "bob");

        assert!(
            broadcaster
                .abgang_melden(&nick("alice"), &alice, Abgang::Regulaer)
                .await
        );
        assert!(
            !broadcaster
                .abgang_melden(&nick("alice"), &alice, Abgang::Abnormal)
                .await
        );

        assert_eq!(zeile(&mut bob_rx).await, "alice has left the chat.");
        let mut nichts = String::new();
        let ergebnis =
            tokio::time::timeout(Duration::from_millis(50), bob_rx.read_line(&mut nichts)).await;
        assert!(ergebnis.is_err(), "Kein zweiter Abgangs-Hinweis");
        assert!(alice.ist_geschlossen());
    }

    #[tokio::test]
    async fn leere_registry() {
        let broadcaster = Broadcaster::neu(ClientRegistry::neu());
        let bericht = broadcaster.senden("niemand da", None).await;
        assert_eq!(bericht, BroadcastBericht::default());
    }
}
