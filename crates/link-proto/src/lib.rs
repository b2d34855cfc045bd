//! Wire protocol shared by every link mode: discovery records and the two
//! framed stream formats (netplay, GBA link).
//!
//! GB link-cable mode carries no payload framing of its own (spec §1 — the
//! link cable itself is owned by the core); it only participates in
//! discovery via [`constants::LinkKind::GbLink`].

pub mod constants;
pub mod discovery;
pub mod error;
pub mod gba;
pub mod netplay;

pub use constants::{LinkKind, VERSION};
pub use discovery::DiscoveryRecord;
pub use error::ProtoError;
pub use gba::{encode_gba_frame, encode_sio_data_frame, try_decode_gba_frames, GbaCmd, GbaFrameView};
pub use netplay::{
    encode_input_frame, encode_netplay_frame, try_decode_netplay_frames, NetplayCmd, NetplayFrameView,
};
