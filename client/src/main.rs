//! Tresen Client – Einstiegspunkt
//!
//! Verbindet sich per TLS mit dem Server und leitet stdin/stdout weiter.
//! Logs gehen nach stderr, stdout gehoert den Chat-Zeilen.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tresen_client::{chat_relay, eingabe_thread_starten, verbinden, ClientConfig};
use tresen_observability::{logging_initialisieren, LogAusgabe};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::parse();
    logging_initialisieren("warn", "text", LogAusgabe::Stderr);

    let stream = verbinden(&config).await?;
    println!("Connected securely to chat server at {}", config.adresse());

    let abbruch = CancellationToken::new();
    let signal_abbruch = abbruch.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_abbruch.cancel();
        }
    });

    let eingabe = eingabe_thread_starten()?;
    let ende = chat_relay(stream, eingabe, tokio::io::stdout(), abbruch).await?;
    tracing::debug!(ende = ?ende, "Sitzung beendet");

    // Der Eingabe-Thread haengt ggf. noch in stdin; der Prozess endet trotzdem
    Ok(())
}
