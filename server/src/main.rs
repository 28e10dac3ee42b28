//! Tresen Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.
//! Das erste Kommandozeilenargument ueberschreibt den Port.

use anyhow::Result;
use tresen_observability::{logging_initialisieren, LogAusgabe};
use tresen_server::config::{ConfigQuelle, ServerConfig};
use tresen_server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("TRESEN_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let (mut config, quelle) = ServerConfig::laden(&config_pfad)?;
    config.port_ueberschreiben(std::env::args().nth(1).as_deref())?;

    logging_initialisieren(&config.logging.level, &config.logging.format, LogAusgabe::Stdout);

    if quelle == ConfigQuelle::Standardwerte {
        tracing::warn!(
            pfad = %config_pfad,
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Tresen Server wird initialisiert"
    );

    let server = Server::binden(config).await?;
    server.starten().await?;

    Ok(())
}
