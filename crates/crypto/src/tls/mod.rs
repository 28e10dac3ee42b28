//! TLS Transport-Verschluesselung (Client <-> Server)
//!
//! Der Server haelt Zertifikat und Schluessel als PEM; der Client vertraut
//! genau den Zertifikaten einer PEM-Datei (typischerweise dem Server-
//! Zertifikat selbst).

pub mod client;
pub mod config;
pub mod server;

pub use client::{server_name, tls_connector_erstellen};
pub use config::{compute_certificate_fingerprint, generate_self_signed_cert, TlsServerKonfig};
pub use server::tls_acceptor_erstellen;

/// Installiert `ring` als prozessweiten rustls-Crypto-Provider
///
/// Mehrfache Aufrufe sind unkritisch; ist bereits ein Provider aktiv,
/// bleibt dieser bestehen.
pub fn crypto_provider_installieren() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
