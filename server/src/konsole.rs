//! Operator-Konsole auf stdin
//!
//! Laeuft in einem eigenen OS-Thread, weil stdin blockierend gelesen wird.
//! `/quit` faehrt den Server ueber den Shutdown-Koordinator herunter.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::runtime::Handle;
use tresen_relay::{ClientRegistry, RelayState};

/// Befehle der Operator-Konsole
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KonsolenBefehl {
    /// `/clients` – verbundene Nicknames auflisten
    Clients,
    /// `/quit` – Server herunterfahren
    Beenden,
    /// Alles andere
    Unbekannt(String),
}

impl KonsolenBefehl {
    /// Wertet eine Konsolenzeile aus; leere Zeilen ergeben `None`
    pub fn parsen(zeile: &str) -> Option<Self> {
        match zeile.trim() {
            "" => None,
            "/clients" => Some(Self::Clients),
            "/quit" => Some(Self::Beenden),
            anderes => Some(Self::Unbekannt(anderes.to_string())),
        }
    }
}

/// Schreibt die Liste der verbundenen Clients
pub fn clients_auflisten(registry: &ClientRegistry, ausgabe: &mut impl Write) -> io::Result<()> {
    let nicknames = registry.nicknames();
    if nicknames.is_empty() {
        writeln!(ausgabe, "No clients connected.")?;
    } else {
        writeln!(ausgabe, "Connected clients:")?;
        for nickname in nicknames {
            writeln!(ausgabe, "- {nickname}")?;
        }
    }
    ausgabe.flush()
}

/// Fuehrt einen Befehl aus; gibt `false` zurueck wenn die Konsole enden soll
pub fn befehl_ausfuehren(
    befehl: KonsolenBefehl,
    state: &RelayState,
    runtime: &Handle,
    ausgabe: &mut impl Write,
) -> io::Result<bool> {
    match befehl {
        KonsolenBefehl::Clients => {
            clients_auflisten(&state.registry, ausgabe)?;
            Ok(true)
        }
        KonsolenBefehl::Beenden => {
            tracing::info!("Shutdown ueber die Konsole angefordert");
            runtime.block_on(state.shutdown.herunterfahren());
            Ok(false)
        }
        KonsolenBefehl::Unbekannt(eingabe) => {
            tracing::debug!(eingabe = %eingabe, "Unbekannter Konsolenbefehl");
            writeln!(
                ausgabe,
                "Unknown command. Available commands: /quit, /clients"
            )?;
            Ok(true)
        }
    }
}

/// Startet den Konsolen-Thread
pub fn konsole_starten(state: Arc<RelayState>, runtime: Handle) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("tresen-konsole".into())
        .spawn(move || {
            let stdin = io::stdin();
            let mut stdout = io::stdout();

            for zeile in stdin.lock().lines() {
                let zeile = match zeile {
                    Ok(zeile) => zeile,
                    Err(e) => {
                        tracing::warn!(fehler = %e, "Konsole: stdin nicht lesbar");
                        break;
                    }
                };
                let Some(befehl) = KonsolenBefehl::parsen(&zeile) else {
                    continue;
                };

                match befehl_ausfuehren(befehl, &state, &runtime, &mut stdout) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        tracing::warn!(fehler = %e, "Konsole: Ausgabe fehlgeschlagen");
                        break;
                    }
                }
            }
            tracing::debug!("Konsolen-Thread beendet");
        })
}
