//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the playback engine crates:
//! - Logging and tracing bootstrap, with an optional host `LoggerSink`
//! - The player event bus
//!
//! Hosts call [`logging::init_logging`] once at startup and subscribe to the
//! [`events::EventBus`] a player exposes.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
