//! TLS-Client (Connector fuer das Chat-Terminal)
//!
//! Vertraut ausschliesslich den Zertifikaten aus der uebergebenen PEM-Datei.
//! Fuer einen selbstsignierten Server ist das dessen eigenes Zertifikat.

use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::error::{CryptoError, CryptoResult};
use crate::tls::config::parse_certificates;

/// Erstellt einen `TlsConnector`, der nur `ca_pem` als Vertrauensanker nutzt
pub fn tls_connector_erstellen(ca_pem: &str) -> CryptoResult<TlsConnector> {
    super::crypto_provider_installieren();

    let mut roots = RootCertStore::empty();
    for cert in parse_certificates(ca_pem)? {
        roots
            .add(cert)
            .map_err(|e| CryptoError::Tls(format!("Zertifikat nicht verwendbar: {}", e)))?;
    }
    if roots.is_empty() {
        return Err(CryptoError::KeinZertifikat("CA-PEM".into()));
    }

    let tls_config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(tls_config)))
}

/// Wandelt einen Hostnamen oder eine IP-Adresse in einen TLS-Servernamen
pub fn server_name(host: &str) -> CryptoResult<ServerName<'static>> {
    ServerName::try_from(host.to_string())
        .map_err(|_| CryptoError::UngueltigerServername(host.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::config::generate_self_signed_cert;
    use crate::tls::server::tls_acceptor_erstellen;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn connector_ohne_zertifikat_schlaegt_fehl() {
        assert!(tls_connector_erstellen("").is_err());
    }

    #[test]
    fn server_name_parsen() {
        assert!(server_name("localhost").is_ok());
        assert!(server_name("127.0.0.1").is_ok());
        assert!(server_name("kein gueltiger name").is_err());
    }

    #[tokio::test]
    async fn handshake_mit_gepinntem_zertifikat() {
        let config = generate_self_signed_cert(&["localhost"]).unwrap();
        let acceptor = tls_acceptor_erstellen(&config).unwrap();
        let connector = tls_connector_erstellen(&config.certificate_pem).unwrap();

        let (client_seite, server_seite) = tokio::io::duplex(16 * 1024);

        let server = tokio::spawn(async move {
            let mut stream = acceptor.accept(server_seite).await.unwrap();
            stream.write_all(b"hallo\n").await.unwrap();
            stream.flush().await.unwrap();
            stream.shutdown().await.unwrap();
        });

        let mut stream = connector
            .connect(server_name("localhost").unwrap(), client_seite)
            .await
            .unwrap();
        let mut empfangen = String::new();
        stream.read_to_string(&mut empfangen).await.unwrap();
        assert_eq!(empfangen, "hallo\n");

        server.await.unwrap();
    }

    #[tokio::test]
    async fn fremdes_zertifikat_wird_abgelehnt() {
        let server_config = generate_self_signed_cert(&["localhost"]).unwrap();
        let fremd = generate_self_signed_cert(&["localhost"]).unwrap();
        let acceptor = tls_acceptor_erstellen(&server_config).unwrap();
        let connector = tls_connector_erstellen(&fremd.certificate_pem).unwrap();

        let (client_seite, server_seite) = tokio::io::duplex(16 * 1024);
        let server = tokio::spawn(async move { acceptor.accept(server_seite).await.is_err() });

        let ergebnis = connector
            .connect(server_name("localhost").unwrap(), client_seite)
            .await;
        assert!(ergebnis.is_err());
        assert!(server.await.unwrap());
    }
}
