//! TLS-Server (Acceptor fuer den Chat-Listener)

use std::sync::Arc;

use rustls::pki_types::PrivateKeyDer;
use rustls::ServerConfig;
use rustls_pemfile::private_key;
use tokio_rustls::TlsAcceptor;

use crate::error::{CryptoError, CryptoResult};
use crate::tls::config::{parse_certificates, TlsServerKonfig};

/// Erstellt einen `TlsAcceptor` aus der Konfiguration (ohne Client-Auth)
pub fn tls_acceptor_erstellen(config: &TlsServerKonfig) -> CryptoResult<TlsAcceptor> {
    super::crypto_provider_installieren();

    let cert_chain = parse_certificates(&config.certificate_pem)?;
    if cert_chain.is_empty() {
        return Err(CryptoError::KeinZertifikat("Server-PEM".into()));
    }
    let private_key = parse_private_key(&config.private_key_pem)?;

    let tls_config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, private_key)
        .map_err(|e| CryptoError::Tls(e.to_string()))?;

    tracing::debug!("TLS-Acceptor erstellt");
    Ok(TlsAcceptor::from(Arc::new(tls_config)))
}

fn parse_private_key(pem: &str) -> CryptoResult<PrivateKeyDer<'static>> {
    let mut cursor = std::io::Cursor::new(pem.as_bytes());
    private_key(&mut cursor)
        .map_err(|e| CryptoError::Tls(format!("Schluessel-Parsing fehlgeschlagen: {}", e)))?
        .ok_or_else(|| CryptoError::Tls("Kein privater Schluessel gefunden".to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::config::generate_self_signed_cert;

    #[test]
    fn acceptor_erstellen() {
        let config = generate_self_signed_cert(&["localhost"]).unwrap();
        assert!(tls_acceptor_erstellen(&config).is_ok());
    }

    #[test]
    fn acceptor_mit_ungueltigem_cert_schlaegt_fehl() {
        let config = TlsServerKonfig {
            certificate_pem: "ungueltig".to_string(),
            private_key_pem: "ungueltig".to_string(),
        };
        assert!(tls_acceptor_erstellen(&config).is_err());
    }

    #[test]
    fn acceptor_ohne_schluessel_schlaegt_fehl() {
        let mut config = generate_self_signed_cert(&["localhost"]).unwrap();
        config.private_key_pem = String::new();
        assert!(tls_acceptor_erstellen(&config).is_err());
    }
}
