//! Client-Registry – Wer ist gerade verbunden?
//!
//! Einzige Quelle der Wahrheit fuer Nickname -> Verbindung. Alle Zugriffe
//! (Registrieren, Abmelden, Snapshot, Leeren beim Shutdown) laufen durch
//! denselben Mutex; der Lock wird nie ueber ein `.await` gehalten.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tresen_core::{Nickname, VerbindungsId};

use crate::handle::VerbindungsHandle;

/// Ergebnis eines Registrierungsversuchs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registrierung {
    /// Nickname war frei und ist jetzt belegt
    Erfolgreich,
    /// Nickname gehoert bereits einer anderen Verbindung
    BereitsVergeben,
    /// Registry wurde durch den Shutdown geschlossen
    Geschlossen,
}

/// Thread-safe Registry aller aktiven Verbindungen
///
/// Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    eintraege: BTreeMap<Nickname, Arc<VerbindungsHandle>>,
    geschlossen: bool,
}

impl ClientRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Prueft und belegt einen Nickname in einem kritischen Abschnitt
    pub fn registrieren(
        &self,
        nickname: Nickname,
        handle: Arc<VerbindungsHandle>,
    ) -> Registrierung {
        let mut inner = self.inner.lock();
        if inner.geschlossen {
            return Registrierung::Geschlossen;
        }
        if inner.eintraege.contains_key(&nickname) {
            return Registrierung::BereitsVergeben;
        }
        tracing::debug!(nickname = %nickname, id = %handle.id(), "Client registriert");
        inner.eintraege.insert(nickname, handle);
        Registrierung::Erfolgreich
    }

    /// Entfernt einen Nickname; fehlt er, passiert nichts
    pub fn abmelden(&self, nickname: &Nickname) -> Option<Arc<VerbindungsHandle>> {
        self.inner.lock().eintraege.remove(nickname)
    }

    /// Entfernt den Eintrag nur, wenn er noch zu dieser Verbindung gehoert
    ///
    /// Gibt `true` zurueck wenn dieser Aufruf den Eintrag entfernt hat. Wer
    /// `true` erhaelt, meldet den Abgang; alle anderen schweigen.
    pub fn abmelden_verbindung(&self, nickname: &Nickname, id: VerbindungsId) -> bool {
        let mut inner = self.inner.lock();
        match inner.eintraege.get(nickname) {
            Some(handle) if handle.id() == id => {
                inner.eintraege.remove(nickname);
                tracing::debug!(nickname = %nickname, id = %id, "Client abgemeldet");
                true
            }
            _ => false,
        }
    }

    /// Punkt-in-Zeit-Kopie aller Eintraege, sortiert nach Nickname
    pub fn snapshot(&self) -> Vec<(Nickname, Arc<VerbindungsHandle>)> {
        self.inner
            .lock()
            .eintraege
            .iter()
            .map(|(nickname, handle)| (nickname.clone(), Arc::clone(handle)))
            .collect()
    }

    /// Alle registrierten Nicknames, sortiert
    pub fn nicknames(&self) -> Vec<Nickname> {
        self.inner.lock().eintraege.keys().cloned().collect()
    }

    pub fn ist_registriert(&self, nickname: &Nickname) -> bool {
        self.inner.lock().eintraege.contains_key(nickname)
    }

    pub fn anzahl(&self) -> usize {
        self.inner.lock().eintraege.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.inner.lock().eintraege.is_empty()
    }

    pub fn ist_geschlossen(&self) -> bool {
        self.inner.lock().geschlossen
    }

    /// Schliesst die Registry fuer neue Registrierungen und entnimmt alle
    /// Eintraege in einem Schritt
    pub fn schliessen_und_leeren(&self) -> Vec<(Nickname, Arc<VerbindungsHandle>)> {
        let mut inner = self.inner.lock();
        inner.geschlossen = true;
        std::mem::take(&mut inner.eintraege).into_iter().collect()
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ClientRegistry")
            .field("anzahl", &inner.eintraege.len())
            .field("geschlossen", &inner.geschlossen)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
