//! The session envelope shared by all three link modes (spec §3, §4.3,
//! §9): lifecycle state, the single accepted endpoint, and the
//! `{host, join, disconnect, status}` capability set the UI menu consumes
//! without caring which mode is active.
//!
//! Each mode's own per-protocol handshake and data pump (netplay's
//! lockstep, GBA link's packet bridge) lives in its own crate and builds
//! on these shared types.

pub mod capability;
pub mod constants;
pub mod endpoint;
pub mod error;
pub mod state;

pub use capability::{ConnectOutcome, LinkSession, PollStatus, StartHostParams};
pub use endpoint::Endpoint;
pub use error::SessionError;
pub use state::{ConnectedState, Role, SessionMode, SessionState};
