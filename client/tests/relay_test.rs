//! Terminal-Relay gegen einen In-Memory-Server

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tresen_client::{chat_relay, ClientEnde};

struct Aufbau {
    server: BufReader<DuplexStream>,
    ausgabe: Lines<BufReader<DuplexStream>>,
    eingabe: mpsc::Sender<String>,
    abbruch: CancellationToken,
    relay: JoinHandle<anyhow::Result<ClientEnde>>,
}

fn aufbauen() -> Aufbau {
    let (client, server) = tokio::io::duplex(4096);
    let (ausgabe_schreiben, ausgabe_lesen) = tokio::io::duplex(4096);
    let (eingabe, rx) = mpsc::channel(8);
    let abbruch = CancellationToken::new();

    let relay = tokio::spawn(chat_relay(client, rx, ausgabe_schreiben, abbruch.clone()));

    Aufbau {
        server: BufReader::new(server),
        ausgabe: BufReader::new(ausgabe_lesen).lines(),
        eingabe,
        abbruch,
        relay,
    }
}

async fn ausgabe_zeile(ausgabe: &mut Lines<BufReader<DuplexStream>>) -> Option<String> {
    tokio::time::timeout(Duration::from_secs(2), ausgabe.next_line())
        .await
        .expect("Timeout beim Lesen der Ausgabe")
        .unwrap()
}

async fn server_zeile(server: &mut BufReader<DuplexStream>) -> String {
    let mut zeile = String::new();
    tokio::time::timeout(Duration::from_secs(2), server.read_line(&mut zeile))
        .await
        .expect("Timeout beim Lesen am Server")
        .unwrap();
    zeile
}

async fn ende(relay: JoinHandle<anyhow::Result<ClientEnde>>) -> ClientEnde {
    tokio::time::timeout(Duration::from_secs(2), relay)
        .await
        .expect("Relay muss enden")
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn zeilen_weiterleiten_und_quit() {
    let mut a = aufbauen();

    a.server
        .get_mut()
        .write_all(b"Welcome to the secure chat! Please enter your nickname:\n")
        .await
        .unwrap();
    assert_eq!(
        ausgabe_zeile(&mut a.ausgabe).await.as_deref(),
        Some("Welcome to the secure chat! Please enter your nickname:")
    );

    a.eingabe.send("alice".into()).await.unwrap();
    assert_eq!(server_zeile(&mut a.server).await, "alice\n");

    a.eingabe.send("/quit".into()).await.unwrap();
    assert_eq!(server_zeile(&mut a.server).await, "/quit\n");

    assert_eq!(
        ausgabe_zeile(&mut a.ausgabe).await.as_deref(),
        Some("Exiting chat...")
    );
    assert_eq!(
        ausgabe_zeile(&mut a.ausgabe).await.as_deref(),
        Some("Connection closed.")
    );
    assert_eq!(ende(a.relay).await, ClientEnde::Verlassen);

    // Client hat seine Schreibseite geschlossen
    assert_eq!(server_zeile(&mut a.server).await, "");
}

#[tokio::test]
async fn server_eof_beendet_sitzung() {
    let mut a = aufbauen();

    a.server.get_mut().write_all(b"Goodbye!\n").await.unwrap();
    a.server.get_mut().shutdown().await.unwrap();

    assert_eq!(ausgabe_zeile(&mut a.ausgabe).await.as_deref(), Some("Goodbye!"));
    assert_eq!(
        ausgabe_zeile(&mut a.ausgabe).await.as_deref(),
        Some("Disconnected from server.")
    );
    assert_eq!(
        ausgabe_zeile(&mut a.ausgabe).await.as_deref(),
        Some("Connection closed.")
    );
    assert_eq!(ende(a.relay).await, ClientEnde::ServerGetrennt);
}

#[tokio::test]
async fn ende_der_eingabe() {
    let mut a = aufbauen();
    drop(a.eingabe);

    assert_eq!(
        ausgabe_zeile(&mut a.ausgabe).await.as_deref(),
        Some("Connection closed.")
    );
    assert_eq!(ende(a.relay).await, ClientEnde::EingabeBeendet);
}

#[tokio::test]
async fn abbruch_per_token() {
    let mut a = aufbauen();
    a.abbruch.cancel();

    assert_eq!(
        ausgabe_zeile(&mut a.ausgabe).await.as_deref(),
        Some("Connection closed.")
    );
    assert_eq!(ende(a.relay).await, ClientEnde::Abgebrochen);
}

#[tokio::test]
async fn quit_mit_zusatz_bleibt_verbunden() {
    let mut a = aufbauen();

    a.eingabe.send("/quit bitte".into()).await.unwrap();
    assert_eq!(server_zeile(&mut a.server).await, "/quit bitte\n");
    assert!(!a.relay.is_finished());

    a.abbruch.cancel();
    assert_eq!(ende(a.relay).await, ClientEnde::Abgebrochen);
}
