//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tresen_relay::RelayKonfig;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Zertifikat und Schluessel
    pub tls: TlsEinstellungen,
    /// Timeouts des Relays
    pub relay: RelayEinstellungen,
    /// Operator-Konsole auf stdin
    pub konsole: KonsolenEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den TLS-Listener
    pub bind_adresse: String,
    /// Port fuer den TLS-Listener
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// TLS-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsEinstellungen {
    /// Pfad zum PEM-Zertifikat
    pub zertifikat: String,
    /// Pfad zum PEM-Schluessel
    pub schluessel: String,
    /// Erzeugt ein selbstsigniertes Zertifikat wenn die Dateien fehlen
    pub selbstsigniert_erzeugen: bool,
}

impl Default for TlsEinstellungen {
    fn default() -> Self {
        Self {
            zertifikat: "server_cert.crt".into(),
            schluessel: "server_private.key".into(),
            selbstsigniert_erzeugen: true,
        }
    }
}

/// Relay-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayEinstellungen {
    /// Obergrenze fuer einen Schreibvorgang an einen Peer
    pub schreib_timeout_ms: u64,
    /// Obergrenze fuer den TLS-Handshake
    pub tls_handshake_timeout_ms: u64,
}

impl Default for RelayEinstellungen {
    fn default() -> Self {
        Self {
            schreib_timeout_ms: 5_000,
            tls_handshake_timeout_ms: 10_000,
        }
    }
}

/// Operator-Konsole
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KonsolenEinstellungen {
    pub aktiviert: bool,
}

impl Default for KonsolenEinstellungen {
    fn default() -> Self {
        Self { aktiviert: true }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Woher die geladene Konfiguration stammt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigQuelle {
    Datei,
    /// Datei fehlte, es gelten die Standardwerte
    Standardwerte,
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    ///
    /// Geloggt wird hier nichts, das Logging ist zu diesem Zeitpunkt noch
    /// nicht initialisiert. Die `ConfigQuelle` meldet der Aufrufer danach.
    pub fn laden(pfad: &str) -> anyhow::Result<(Self, ConfigQuelle)> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config.pruefen()?;
                Ok((config, ConfigQuelle::Datei))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok((Self::default(), ConfigQuelle::Standardwerte))
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Weist unbrauchbare Werte zurueck
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if self.relay.schreib_timeout_ms == 0 {
            anyhow::bail!("relay.schreib_timeout_ms muss groesser als 0 sein");
        }
        if self.relay.tls_handshake_timeout_ms == 0 {
            anyhow::bail!("relay.tls_handshake_timeout_ms muss groesser als 0 sein");
        }
        if !tresen_observability::logging::log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Unbekanntes Log-Level '{}'", self.logging.level);
        }
        if !tresen_observability::logging::log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Unbekanntes Log-Format '{}'", self.logging.format);
        }
        Ok(())
    }

    /// Ueberschreibt den Port aus dem ersten Kommandozeilenargument
    pub fn port_ueberschreiben(&mut self, argument: Option<&str>) -> anyhow::Result<()> {
        if let Some(port) = argument {
            self.netzwerk.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("Ungueltiger Port '{port}'"))?;
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse zurueck
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    /// Laufzeit-Konfiguration fuer das Relay
    pub fn relay_konfig(&self) -> RelayKonfig {
        RelayKonfig {
            schreib_timeout: Duration::from_millis(self.relay.schreib_timeout_ms),
            tls_handshake_timeout: Duration::from_millis(self.relay.tls_handshake_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.netzwerk.port, 3000);
        assert_eq!(cfg.tls.zertifikat, "server_cert.crt");
        assert_eq!(cfg.tls.schluessel, "server_private.key");
        assert!(cfg.konsole.aktiviert);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.pruefen().is_ok());
    }

    #[test]
    fn bind_adresse() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_adresse(), "0.0.0.0:3000");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [netzwerk]
            port = 4000

            [relay]
            schreib_timeout_ms = 250

            [konsole]
            aktiviert = false
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.netzwerk.port, 4000);
        assert!(!cfg.konsole.aktiviert);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.netzwerk.bind_adresse, "0.0.0.0");

        let relay = cfg.relay_konfig();
        assert_eq!(relay.schreib_timeout, Duration::from_millis(250));
        assert_eq!(relay.tls_handshake_timeout, Duration::from_secs(10));
    }

    #[test]
    fn port_aus_argument() {
        let mut cfg = ServerConfig::default();
        cfg.port_ueberschreiben(Some("5555")).unwrap();
        assert_eq!(cfg.netzwerk.port, 5555);

        cfg.port_ueberschreiben(None).unwrap();
        assert_eq!(cfg.netzwerk.port, 5555);

        assert!(cfg.port_ueberschreiben(Some("kein-port")).is_err());
        assert!(cfg.port_ueberschreiben(Some("70000")).is_err());
    }

    #[test]
    fn ungueltige_werte_werden_abgelehnt() {
        let mut cfg = ServerConfig::default();
        cfg.relay.schreib_timeout_ms = 0;
        assert!(cfg.pruefen().is_err());

        let mut cfg = ServerConfig::default();
        cfg.logging.format = "xml".into();
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let (cfg, quelle) = ServerConfig::laden("/nicht/vorhanden/tresen.toml").unwrap();
        assert_eq!(cfg.netzwerk.port, 3000);
        assert_eq!(quelle, ConfigQuelle::Standardwerte);
    }

    #[test]
    fn vorhandene_datei_wird_als_quelle_gemeldet() {
        let pfad = std::env::temp_dir().join(format!("tresen-config-{}.toml", std::process::id()));
        std::fs::write(&pfad, "[netzwerk]\nport = 4443\n").unwrap();

        let ergebnis = ServerConfig::laden(pfad.to_str().unwrap());
        std::fs::remove_file(&pfad).unwrap();

        let (cfg, quelle) = ergebnis.unwrap();
        assert_eq!(cfg.netzwerk.port, 4443);
        assert_eq!(quelle, ConfigQuelle::Datei);
    }
}
