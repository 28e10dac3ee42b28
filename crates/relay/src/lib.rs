//! tresen-relay – Verbindungs-Lebenszyklus und Broadcast-Engine
//!
//! Dieser Crate haelt die gesamte nebenlaeufige Logik des Chat-Servers:
//! wer verbunden ist, wie eine Verbindung durch ihren Lebenszyklus laeuft,
//! wie Nachrichten verteilt werden und wie der Server geordnet herunterfaehrt.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener + TLS (ChatServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  State Machine: Verbindend -> WartetAufNickname -> Aktiv -> Beendet
//!     |
//!     +-- ClientRegistry      (Nickname -> VerbindungsHandle, ein Lock)
//!     +-- Broadcaster         (Fan-out mit Fehlerisolation pro Empfaenger)
//!
//! ShutdownKoordinator – leert die Registry genau einmal, stoppt den Listener
//! ```

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod handle;
pub mod registry;
pub mod server_state;
pub mod shutdown;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::{Abgang, BroadcastBericht, Broadcaster};
pub use connection::{verbindung_behandeln, Abschluss, ClientConnection, VerbindungsZustand};
pub use error::{RelayError, RelayResult};
pub use handle::VerbindungsHandle;
pub use registry::{ClientRegistry, Registrierung};
pub use server_state::{RelayKonfig, RelayState};
pub use shutdown::ShutdownKoordinator;
pub use tcp::ChatServer;
