//! tresen-protocol – Zeilenbasiertes Chat-Protokoll
//!
//! Jede Nachricht ist genau eine Zeile, abgeschlossen mit `\n`. Der Server
//! sendet UTF-8, eingehende Zeilen werden verlustbehaftet dekodiert.
//! Dieses Crate definiert die festen Servertexte, die Auswertung der
//! Client-Zeilen und die Lese-/Schreibhilfen fuer beide Seiten.

pub mod nachrichten;
pub mod zeilen;

pub use nachrichten::{ClientZeile, ServerNachricht, QUIT_BEFEHL};
pub use zeilen::{zeile_schreiben, zeilen_leser, ZeilenCodec, ZeilenLeser};
