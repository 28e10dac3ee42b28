//! Client-Konfiguration aus Kommandozeile und Umgebung

use std::path::PathBuf;

use clap::Parser;

/// Verbindungsparameter des Terminal-Clients
#[derive(Debug, Clone, Parser)]
#[command(name = "tresen-client", version, about = "Terminal-Client fuer den Tresen Chat-Server")]
pub struct ClientConfig {
    /// Hostname oder IP-Adresse des Servers
    #[arg(default_value = "localhost")]
    pub host: String,

    /// TLS-Port des Servers
    #[arg(default_value_t = 3000)]
    pub port: u16,

    /// PEM-Datei mit dem vertrauenswuerdigen Server-Zertifikat
    #[arg(long = "ca", env = "TRESEN_CA_ZERTIFIKAT", default_value = "server_cert.crt")]
    pub ca_zertifikat: PathBuf,

    /// TLS-Servername, falls er vom Host abweicht
    #[arg(long, env = "TRESEN_SERVER_NAME")]
    pub server_name: Option<String>,
}

impl ClientConfig {
    /// `host:port` fuer den TCP-Verbindungsaufbau
    pub fn adresse(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Name, gegen den das Server-Zertifikat geprueft wird
    pub fn tls_name(&self) -> &str {
        self.server_name.as_deref().unwrap_or(&self.host)
    }
}
