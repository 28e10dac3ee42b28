//! Client-seitige TLS-Verbindung zum Tresen-Server
//!
//! `chat_relay` verbindet zwei Richtungen: jede Serverzeile landet auf der
//! Ausgabe, jede Eingabezeile geht an den Server. Sie endet bei `/quit`,
//! Server-EOF, Ende der Eingabe oder Abbruch.

use std::io::BufRead;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_rustls::client::TlsStream;
use tokio_util::sync::CancellationToken;
use tresen_crypto::{server_name, tls_connector_erstellen};
use tresen_protocol::{zeile_schreiben, zeilen_leser, ClientZeile};

use crate::config::ClientConfig;

/// Warum die Sitzung endete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEnde {
    /// Benutzer hat `/quit` eingegeben
    Verlassen,
    /// Server hat die Verbindung geschlossen
    ServerGetrennt,
    /// stdin ist zu Ende
    EingabeBeendet,
    /// Ctrl-C
    Abgebrochen,
}

/// Baut die TLS-Verbindung zum Server auf
pub async fn verbinden(config: &ClientConfig) -> Result<TlsStream<TcpStream>> {
    let ca_pem = std::fs::read_to_string(&config.ca_zertifikat).with_context(|| {
        format!(
            "Server-Zertifikat '{}' nicht lesbar",
            config.ca_zertifikat.display()
        )
    })?;
    let connector = tls_connector_erstellen(&ca_pem).context("TLS-Konfiguration ungueltig")?;
    let name = server_name(config.tls_name())?;

    let adresse = config.adresse();
    tracing::info!(adresse = %adresse, "Verbinde mit Server");
    let tcp = TcpStream::connect(&adresse)
        .await
        .with_context(|| format!("Verbindung zu {adresse} fehlgeschlagen"))?;

    let tls = connector
        .connect(name, tcp)
        .await
        .with_context(|| format!("TLS-Handshake mit {adresse} fehlgeschlagen"))?;
    tracing::debug!(adresse = %adresse, "TLS-Verbindung hergestellt");
    Ok(tls)
}

/// Leitet Zeilen zwischen Server, Eingabe und Ausgabe weiter
pub async fn chat_relay<S, W>(
    stream: S,
    mut eingabe: mpsc::Receiver<String>,
    mut ausgabe: W,
    abbruch: CancellationToken,
) -> Result<ClientEnde>
where
    S: AsyncRead + AsyncWrite,
    W: AsyncWrite + Unpin,
{
    let (leser, mut schreiber) = tokio::io::split(stream);
    let mut zeilen = zeilen_leser(leser);

    let ende = loop {
        tokio::select! {
            _ = abbruch.cancelled() => break ClientEnde::Abgebrochen,

            zeile = zeilen.next() => match zeile {
                Some(Ok(zeile)) => zeile_schreiben(&mut ausgabe, &zeile).await?,
                Some(Err(e)) => {
                    tracing::warn!(fehler = %e, "Lesefehler vom Server");
                    zeile_schreiben(&mut ausgabe, "Disconnected from server.").await?;
                    break ClientEnde::ServerGetrennt;
                }
                None => {
                    zeile_schreiben(&mut ausgabe, "Disconnected from server.").await?;
                    break ClientEnde::ServerGetrennt;
                }
            },

            zeile = eingabe.recv() => match zeile {
                Some(zeile) => {
                    if let Err(e) = zeile_schreiben(&mut schreiber, &zeile).await {
                        tracing::warn!(fehler = %e, "Senden an Server fehlgeschlagen");
                        zeile_schreiben(&mut ausgabe, "Disconnected from server.").await?;
                        break ClientEnde::ServerGetrennt;
                    }
                    if ClientZeile::parsen(&zeile) == ClientZeile::Quit {
                        zeile_schreiben(&mut ausgabe, "Exiting chat...").await?;
                        break ClientEnde::Verlassen;
                    }
                }
                None => break ClientEnde::EingabeBeendet,
            },
        }
    };

    if let Err(e) = schreiber.shutdown().await {
        tracing::debug!(fehler = %e, "Shutdown der Verbindung fehlgeschlagen");
    }
    zeile_schreiben(&mut ausgabe, "Connection closed.").await?;
    ausgabe.flush().await?;
    Ok(ende)
}

/// Liest stdin in einem eigenen Thread und reicht die Zeilen weiter
///
/// Der Kanal schliesst bei EOF oder wenn der Empfaenger weg ist.
pub fn eingabe_thread_starten() -> Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("tresen-eingabe".into())
        .spawn(move || {
            for zeile in std::io::stdin().lock().lines() {
                match zeile {
                    Ok(zeile) => {
                        if tx.blocking_send(zeile).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(fehler = %e, "stdin nicht lesbar");
                        break;
                    }
                }
            }
        })
        .context("Eingabe-Thread konnte nicht gestartet werden")?;
    Ok(rx)
}
