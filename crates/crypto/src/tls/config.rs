//! TLS-Konfiguration und Zertifikat-Generierung
//!
//! Fuer Development werden selbstsignierte Zertifikate via rcgen generiert.
//! In Produktion werden Zertifikat und Schluessel aus PEM-Dateien geladen.

use std::path::Path;

use rcgen::{CertificateParams, DistinguishedName, KeyPair as RcgenKeyPair};
use rustls::pki_types::CertificateDer;
use rustls_pemfile::certs;

use crate::error::{CryptoError, CryptoResult};

/// TLS-Server-Konfiguration (PEM-kodiert)
#[derive(Clone)]
pub struct TlsServerKonfig {
    /// PEM-kodierte Zertifikatskette
    pub certificate_pem: String,
    /// PEM-kodierter privater Schluessel
    pub private_key_pem: String,
}

impl TlsServerKonfig {
    /// Laedt Zertifikat und Schluessel aus zwei PEM-Dateien
    pub fn aus_dateien(
        zertifikat: impl AsRef<Path>,
        schluessel: impl AsRef<Path>,
    ) -> CryptoResult<Self> {
        Ok(Self {
            certificate_pem: std::fs::read_to_string(zertifikat)?,
            private_key_pem: std::fs::read_to_string(schluessel)?,
        })
    }

    /// Schreibt Zertifikat und Schluessel als PEM-Dateien
    pub fn speichern(
        &self,
        zertifikat: impl AsRef<Path>,
        schluessel: impl AsRef<Path>,
    ) -> CryptoResult<()> {
        std::fs::write(zertifikat, &self.certificate_pem)?;
        std::fs::write(schluessel, &self.private_key_pem)?;
        Ok(())
    }

    /// SHA-256 Fingerprint des ersten Zertifikats der Kette
    pub fn fingerprint(&self) -> CryptoResult<String> {
        let kette = parse_certificates(&self.certificate_pem)?;
        kette
            .first()
            .map(|cert| compute_certificate_fingerprint(cert.as_ref()))
            .ok_or_else(|| CryptoError::KeinZertifikat("PEM".into()))
    }
}

impl std::fmt::Debug for TlsServerKonfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Schluesselmaterial gehoert nicht in Logs
        f.debug_struct("TlsServerKonfig")
            .field("certificate_pem_len", &self.certificate_pem.len())
            .finish_non_exhaustive()
    }
}

/// Generiert ein selbstsigniertes Zertifikat fuer Development/Testing
///
/// `namen` landen als Subject Alternative Names im Zertifikat; der erste
/// Name ist zugleich Common Name.
pub fn generate_self_signed_cert(namen: &[&str]) -> CryptoResult<TlsServerKonfig> {
    let common_name = namen
        .first()
        .copied()
        .ok_or_else(|| CryptoError::ZertifikatGenerierung("Kein Name angegeben".into()))?;

    let mut params = CertificateParams::new(namen.iter().map(|n| n.to_string()).collect::<Vec<_>>())
        .map_err(|e| CryptoError::ZertifikatGenerierung(e.to_string()))?;

    let mut distinguished_name = DistinguishedName::new();
    distinguished_name.push(rcgen::DnType::CommonName, common_name);
    params.distinguished_name = distinguished_name;

    let key_pair =
        RcgenKeyPair::generate().map_err(|e| CryptoError::ZertifikatGenerierung(e.to_string()))?;

    let cert = params
        .self_signed(&key_pair)
        .map_err(|e| CryptoError::ZertifikatGenerierung(e.to_string()))?;

    Ok(TlsServerKonfig {
        certificate_pem: cert.pem(),
        private_key_pem: key_pair.serialize_pem(),
    })
}

/// Berechnet den SHA-256 Fingerprint eines DER-kodierten Zertifikats
pub fn compute_certificate_fingerprint(der_bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(der_bytes);
    hash.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

pub(crate) fn parse_certificates(pem: &str) -> CryptoResult<Vec<CertificateDer<'static>>> {
    let mut cursor = std::io::Cursor::new(pem.as_bytes());
    certs(&mut cursor)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CryptoError::Tls(format!("Zertifikat-Parsing fehlgeschlagen: {}", e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
