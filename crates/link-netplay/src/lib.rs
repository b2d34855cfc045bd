//! Frame-locked netplay (spec §4.4): lockstep input exchange for cores
//! that are deterministic and acceptable to rollback-free play. Built on
//! [`link_transport`] for framing and [`link_session`] for the shared
//! lifecycle/capability set.

pub mod constants;
pub mod frame_buffer;
pub mod handshake;
pub mod session;
pub mod state_transfer;
pub mod sync;

pub use frame_buffer::FrameBuffer;
pub use session::NetplaySession;
pub use state_transfer::{client_recv_state, host_send_state, StateTransferError};
pub use sync::{FrameSync, StepOutcome, SyncState};
