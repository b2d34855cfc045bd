//! GBA wireless-adapter relay (spec §4.5): a TCP transport carrying opaque
//! `SIO_DATA` packets produced by a GBA emulator core via a generic
//! netpacket callback interface. This crate owns the bytes-ferrying and
//! timing/keepalive rules the adapter protocol implies; the core owns the
//! wireless-adapter protocol itself.

pub mod bridge;
pub mod callbacks;
pub mod constants;
pub mod error;
pub mod handshake;
pub mod queue;
pub mod session;

pub use bridge::{BridgeExit, GbaBridge};
pub use callbacks::{BridgeHandle, CoreCallbacks};
pub use error::GbaLinkError;
pub use queue::{PendingPacket, PendingPacketQueue};
pub use session::GbaLinkSession;
