use std::net::{IpAddr, SocketAddr};

use link_proto::DiscoveryRecord;

use crate::error::SessionError;
use crate::state::{SessionMode, SessionState};

/// Parameters for [`LinkSession::host`], mirroring the UI-facing
/// `start_host(mode, game_name, crc, optional hotspot_ip, optional
/// link_mode)` operation (spec §6).
#[derive(Debug, Clone)]
pub struct StartHostParams {
    pub game_name: String,
    pub game_crc: u32,
    pub hotspot_ip: Option<IpAddr>,
    pub link_mode: Option<String>,
}

/// Result of [`LinkSession::join`] (spec §4.3.1 step 4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    /// The host's configured link mode differs from ours. The session has
    /// *not* completed — the caller must reconfigure and reconnect, or
    /// abort. The client's core `start` callback never fires for this
    /// attempt.
    NeedsReload { host_mode: String, client_mode: String },
}

/// Snapshot returned by [`LinkSession::status`] (`poll_status()` in spec
/// §6).
#[derive(Debug, Clone)]
pub struct PollStatus {
    pub mode: SessionMode,
    pub state: SessionState,
    pub local_ip: Option<IpAddr>,
    pub remote_ip: Option<IpAddr>,
    pub status_text: String,
}

/// The shared capability set the UI menu consumes regardless of which of
/// the three link modes is active (spec §9, "Three modes, one menu") —
/// this replaces a switch-on-enum menu with one trait the per-mode session
/// types all implement.
pub trait LinkSession {
    async fn host(&mut self, params: StartHostParams) -> Result<(), SessionError>;

    async fn join(&mut self, addr: SocketAddr) -> Result<ConnectOutcome, SessionError>;

    async fn disconnect(&mut self) -> Result<(), SessionError>;

    fn status(&self) -> PollStatus;

    async fn pause(&mut self) -> Result<(), SessionError>;

    async fn resume(&mut self) -> Result<(), SessionError>;

    fn list_discovered_hosts(&self) -> Vec<DiscoveryRecord>;
}
