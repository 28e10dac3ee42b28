//! # tresen-observability
//!
//! Structured Logging via tracing-subscriber fuer Server und Client.

pub mod logging;

pub use logging::{logging_initialisieren, LogAusgabe};
