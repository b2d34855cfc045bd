use std::net::SocketAddr;

use link_proto::constants::{magic, port};
use link_proto::{DiscoveryRecord, LinkKind};
use link_session::capability::{ConnectOutcome, LinkSession, PollStatus, StartHostParams};
use link_session::state::{SessionMode, SessionState};
use link_session::{Role, SessionError};

use crate::core_options::{configure, CoreOptionWriter, GbLinkMode};
use crate::log_watcher::{GbLinkConnState, LogWatcher};

/// GB link-cable control plane (spec §1, §4, §6). This session never
/// opens a socket: it writes the core's mode/peer-ip/peer-port options
/// and tracks connection state purely by observing the core's own log
/// lines via [`LogWatcher`].
pub struct GbLinkSession<W: CoreOptionWriter> {
    writer: W,
    mode: SessionMode,
    watcher: LogWatcher,
    local_port: u16,
    remote: Option<SocketAddr>,
}

impl<W: CoreOptionWriter> GbLinkSession<W> {
    pub fn new(writer: W, local_port: u16) -> Self {
        Self {
            writer,
            mode: SessionMode::Off,
            watcher: LogWatcher::new(),
            local_port,
            remote: None,
        }
    }

    /// Feed one core log line; call this from wherever the application
    /// already pipes core log output (spec: "observes log lines").
    pub fn observe_log_line(&mut self, line: &str) -> bool {
        self.watcher.observe(line)
    }

    pub const DISCOVERY_MAGIC: u32 = magic::GBL_ADV;
    pub const DISCOVERY_PORT: u16 = port::GBL_DISCOVERY;
}

impl<W: CoreOptionWriter> LinkSession for GbLinkSession<W> {
    async fn host(&mut self, params: StartHostParams) -> Result<(), SessionError> {
        configure(&self.writer, None, self.local_port, GbLinkMode::Server)
            .map_err(|e| SessionError::Fatal(e.to_string()))?;
        self.mode = SessionMode::Active { kind: LinkKind::GbLink, role: Role::Host };
        self.remote = None;
        // Discovery record carries an empty link_mode — meaningful only
        // for GBA link (spec §3); the record itself is assembled by
        // callers that run their own `link_discovery::Advertiser`, since
        // this session doesn't own a UDP socket.
        let _ = DiscoveryRecord::new(Self::DISCOVERY_MAGIC, params.game_crc, self.local_port, &params.game_name, "");
        Ok(())
    }

    async fn join(&mut self, addr: SocketAddr) -> Result<ConnectOutcome, SessionError> {
        configure(&self.writer, Some(addr.ip()), addr.port(), GbLinkMode::Client)
            .map_err(|e| SessionError::Fatal(e.to_string()))?;
        self.mode = SessionMode::Active { kind: LinkKind::GbLink, role: Role::Client };
        self.remote = Some(addr);
        Ok(ConnectOutcome::Connected)
    }

    async fn disconnect(&mut self) -> Result<(), SessionError> {
        self.mode = SessionMode::Off;
        self.remote = None;
        Ok(())
    }

    fn status(&self) -> PollStatus {
        let state = match self.watcher.state() {
            GbLinkConnState::Disconnected if self.mode.is_off() => SessionState::Idle,
            GbLinkConnState::Disconnected => SessionState::Waiting,
            GbLinkConnState::Connecting => SessionState::Connecting,
            GbLinkConnState::Connected => SessionState::Active(link_session::state::ConnectedState::Connected),
        };
        PollStatus {
            mode: self.mode,
            state: state.clone(),
            local_ip: None,
            remote_ip: self.remote.map(|a| a.ip()),
            status_text: state.name().to_string(),
        }
    }

    async fn pause(&mut self) -> Result<(), SessionError> {
        // The GB core owns its own link cable; there is no pause/resume
        // command on this control plane (spec §1).
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn list_discovered_hosts(&self) -> Vec<DiscoveryRecord> {
        // GB link hosts are discoverable purely for the UI's host list
        // (spec §3); this session doesn't run its own searcher — callers
        // compose one from `link_discovery` using `Self::DISCOVERY_MAGIC`
        // if they want a host list for this mode.
        Vec::new()
    }
}
