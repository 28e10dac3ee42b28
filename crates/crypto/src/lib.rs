//! # tresen-crypto
//!
//! Transport-Verschluesselung fuer Tresen.
//!
//! ## Module
//! - `tls` - TLS-Acceptor (Server), TLS-Connector (Client), Zertifikate
//! - `error` - Fehlertypen

pub mod error;
pub mod tls;

// Bequeme Re-Exports
pub use error::{CryptoError, CryptoResult};
pub use tls::{
    compute_certificate_fingerprint, crypto_provider_installieren, generate_self_signed_cert,
    server_name, tls_acceptor_erstellen, tls_connector_erstellen, TlsServerKonfig,
};
