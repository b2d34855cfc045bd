//! GB link-cable control plane (spec §1, §4, §6): the Game Boy emulator
//! owns its own embedded TCP client/server, so this crate only configures
//! it (mode + peer IP + port) and observes its log lines to track
//! connection state.

pub mod core_options;
pub mod error;
pub mod log_watcher;
pub mod session;

pub use core_options::{configure, CoreOptionWriter, GbLinkMode};
pub use error::GbLinkError;
pub use log_watcher::{GbLinkConnState, LogWatcher};
pub use session::GbLinkSession;
