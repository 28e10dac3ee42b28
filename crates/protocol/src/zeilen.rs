//! Zeilen-Framing fuer beide Verbindungsrichtungen
//!
//! Gelesen wird ueber den `ZeilenCodec`: er trennt an `\n`, entfernt ein
//! direkt davor stehendes `\r` und dekodiert verlustbehaftet, ungueltiges
//! UTF-8 wird zu U+FFFD. Geschrieben wird jede Zeile mit einem einzigen
//! `write_all`, damit sie als Ganzes im TLS-Record landet.

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, FramedRead};

// ---------------------------------------------------------------------------
// ZeilenCodec
// ---------------------------------------------------------------------------

/// tokio-util Decoder fuer Textzeilen beliebiger Kodierung
#[derive(Debug, Clone, Default)]
pub struct ZeilenCodec {
    /// Bis hierhin ist der Puffer bereits ohne `\n` durchsucht
    gesucht_bis: usize,
}

impl ZeilenCodec {
    pub fn neu() -> Self {
        Self::default()
    }
}

fn zeile_dekodieren(roh: &[u8]) -> String {
    let roh = roh.strip_suffix(b"\r").unwrap_or(roh);
    String::from_utf8_lossy(roh).into_owned()
}

impl Decoder for ZeilenCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(pos) = src[self.gesucht_bis..].iter().position(|b| *b == b'\n') else {
            self.gesucht_bis = src.len();
            return Ok(None);
        };

        let ende = self.gesucht_bis + pos;
        self.gesucht_bis = 0;
        let zeile = src.split_to(ende + 1);
        Ok(Some(zeile_dekodieren(&zeile[..ende])))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(zeile) = self.decode(src)? {
            return Ok(Some(zeile));
        }
        if src.is_empty() {
            return Ok(None);
        }

        // Letzte Zeile ohne Zeilenende
        self.gesucht_bis = 0;
        let rest = src.split_to(src.len());
        Ok(Some(zeile_dekodieren(&rest)))
    }
}

// ---------------------------------------------------------------------------
// Lesen und Schreiben
// ---------------------------------------------------------------------------

/// Zeilenweiser Leser ueber einer beliebigen Lesehaelfte
pub type ZeilenLeser<R> = FramedRead<R, ZeilenCodec>;

/// Erstellt einen Zeilenleser ohne Laengenlimit
pub fn zeilen_leser<R: AsyncRead>(leser: R) -> ZeilenLeser<R> {
    FramedRead::new(leser, ZeilenCodec::neu())
}

/// Schreibt `zeile` plus Zeilenende und flusht
pub async fn zeile_schreiben<W>(schreiber: &mut W, zeile: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut puffer = Vec::with_capacity(zeile.len() + 1);
    puffer.extend_from_slice(zeile.as_bytes());
    puffer.push(b'\n');
    schreiber.write_all(&puffer).await?;
    schreiber.flush().await
}
