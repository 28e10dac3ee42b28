//! TLS-Einrichtung fuer den Server
//!
//! Laedt Zertifikat und Schluessel aus den konfigurierten Dateien. Fehlen
//! beide und ist `tls.selbstsigniert_erzeugen` gesetzt, wird ein
//! selbstsigniertes Zertifikat erzeugt und gespeichert; Clients koennen die
//! Zertifikatsdatei dann direkt als Vertrauensanker verwenden.

use std::path::Path;

use anyhow::{Context, Result};
use tokio_rustls::TlsAcceptor;
use tresen_crypto::{generate_self_signed_cert, tls_acceptor_erstellen, TlsServerKonfig};

use crate::config::TlsEinstellungen;

/// Namen im erzeugten Entwicklungszertifikat
const ZERTIFIKAT_NAMEN: &[&str] = &["localhost", "127.0.0.1"];

/// Laedt oder erzeugt Zertifikat und Schluessel
pub fn tls_konfig_laden(einstellungen: &TlsEinstellungen) -> Result<TlsServerKonfig> {
    let zertifikat = Path::new(&einstellungen.zertifikat);
    let schluessel = Path::new(&einstellungen.schluessel);

    match TlsServerKonfig::aus_dateien(zertifikat, schluessel) {
        Ok(konfig) => Ok(konfig),
        Err(e)
            if e.ist_datei_fehlt()
                && einstellungen.selbstsigniert_erzeugen
                && !zertifikat.exists()
                && !schluessel.exists() =>
        {
            tracing::warn!(
                zertifikat = %zertifikat.display(),
                "Kein Zertifikat gefunden, erzeuge selbstsigniertes Zertifikat"
            );
            let konfig = generate_self_signed_cert(ZERTIFIKAT_NAMEN)
                .context("Selbstsigniertes Zertifikat konnte nicht erzeugt werden")?;
            konfig
                .speichern(zertifikat, schluessel)
                .context("Zertifikat konnte nicht gespeichert werden")?;
            Ok(konfig)
        }
        Err(e) => Err(e).with_context(|| {
            format!(
                "TLS-Dateien '{}' / '{}' nicht lesbar",
                zertifikat.display(),
                schluessel.display()
            )
        }),
    }
}

/// Baut den TLS-Acceptor und loggt den Fingerprint
pub fn acceptor_erstellen(einstellungen: &TlsEinstellungen) -> Result<TlsAcceptor> {
    let konfig = tls_konfig_laden(einstellungen)?;

    match konfig.fingerprint() {
        Ok(fingerprint) => tracing::info!(fingerprint = %fingerprint, "TLS-Zertifikat geladen"),
        Err(e) => tracing::warn!(fehler = %e, "Fingerprint nicht berechenbar"),
    }

    tls_acceptor_erstellen(&konfig).context("TLS-Acceptor konnte nicht erstellt werden")
}
