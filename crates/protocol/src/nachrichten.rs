//! Nachrichtentexte des Chat-Protokolls
//!
//! Server -> Peer Texte sind feste Formate; die Client-Seite schickt
//! entweder beliebigen Text oder das Literal `/quit`.

use std::fmt;

use tresen_core::Nickname;

/// Literal mit dem ein Peer den Chat verlaesst
pub const QUIT_BEFEHL: &str = "/quit";

/// Alle Zeilen, die der Server an Peers sendet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerNachricht<'a> {
    /// Erste Zeile nach dem Verbindungsaufbau
    Willkommen,
    /// Nickname ist bereits registriert
    NicknameVergeben,
    /// Nickname ist leer oder besteht nur aus Whitespace
    NicknameUngueltig,
    /// Bestaetigung an den neuen Peer
    Begruessung { nickname: &'a Nickname },
    /// Join-Hinweis an alle anderen
    Beigetreten { nickname: &'a Nickname },
    /// Chat-Zeile eines Peers
    Chat { nickname: &'a Nickname, text: &'a str },
    /// Antwort auf `/quit`
    Abschied,
    /// Regulaerer Abgang an alle anderen
    Verlassen { nickname: &'a Nickname },
    /// Abnormaler Abgang (Fehler, Verbindungsabbruch)
    Abgebrochen { nickname: &'a Nickname },
    /// Server faehrt herunter
    Herunterfahren,
}

impl fmt::Display for ServerNachricht<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Willkommen => {
                f.write_str("Welcome to the secure chat! Please enter your nickname:")
            }
            Self::NicknameVergeben => f.write_str("Nickname already in use. Disconnecting."),
            Self::NicknameUngueltig => {
                f.write_str("Nickname must not be empty. Disconnecting.")
            }
            Self::Begruessung { nickname } => {
                write!(f, "Hi {nickname}! You can start chatting now.")
            }
            Self::Beigetreten { nickname } => write!(f, "{nickname} has joined the chat."),
            Self::Chat { nickname, text } => write!(f, "{nickname}: {text}"),
            Self::Abschied => f.write_str("Goodbye!"),
            Self::Verlassen { nickname } => write!(f, "{nickname} has left the chat."),
            Self::Abgebrochen { nickname } => {
                write!(f, "{nickname} has disconnected due to an error.")
            }
            Self::Herunterfahren => f.write_str("Server is shutting down. Goodbye!"),
        }
    }
}

/// Auswertung einer vom Peer empfangenen Zeile im Chat-Zustand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientZeile<'a> {
    /// Peer verlaesst den Chat
    Quit,
    /// Beliebiger Chat-Text
    Text(&'a str),
}

impl<'a> ClientZeile<'a> {
    /// Ordnet eine Zeile (ohne Zeilenende) ein
    ///
    /// Nur das exakte Literal `/quit` beendet den Chat; `/quit ` oder
    /// `/QUIT` sind gewoehnlicher Text.
    pub fn parsen(zeile: &'a str) -> Self {
        if zeile == QUIT_BEFEHL {
            Self::Quit
        } else {
            Self::Text(zeile)
        }
    }
}
