use std::net::SocketAddr;
use std::sync::Arc;

use link_discovery::{Advertiser, HostTable};
use link_proto::constants::magic;
use link_proto::{DiscoveryRecord, LinkKind};
use link_session::capability::{ConnectOutcome, LinkSession, PollStatus, StartHostParams};
use link_session::state::{ConnectedState, Role, SessionMode, SessionState};
use link_session::SessionError;
use link_transport::Transport;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::handshake::{client_handshake, host_handshake};
use crate::state_transfer::{client_recv_state, host_send_state};
use crate::sync::{FrameSync, StepOutcome};

/// A connected endpoint plus its per-mode synchronizer, handed from the
/// listener task to the foreground [`NetplaySession`] once a client has
/// completed the handshake (spec §5: "staged flag plus memory barrier" —
/// the channel send/recv below is that barrier).
struct Connected {
    transport: Transport,
    remote: SocketAddr,
}

/// The netplay session (spec §4.3, §4.4). Unlike the GBA link and GB link
/// modes, netplay's data pump (`step`) is driven directly by the caller's
/// emulator main loop once per frame — there is no background task for
/// it, matching spec §5's "implicitly, the emulator's main thread".
pub struct NetplaySession {
    mode: SessionMode,
    state: SessionState,
    game_name: String,
    game_crc: u32,
    local_port: u16,
    host_table: Arc<HostTable>,
    advertiser_cancel: Option<CancellationToken>,
    accepted_rx: Option<mpsc::Receiver<Connected>>,
    endpoint: Option<Transport>,
    remote: Option<SocketAddr>,
    sync: Option<FrameSync>,
}

impl Default for NetplaySession {
    fn default() -> Self {
        Self::new()
    }
}

impl NetplaySession {
    pub fn new() -> Self {
        Self {
            mode: SessionMode::Off,
            state: SessionState::Idle,
            game_name: String::new(),
            game_crc: 0,
            local_port: 0,
            host_table: Arc::new(HostTable::new()),
            advertiser_cancel: None,
            accepted_rx: None,
            endpoint: None,
            remote: None,
            sync: None,
        }
    }

    /// Host-side: wait for the listener task to hand over an accepted,
    /// handshaken client. Pairs with [`LinkSession::host`].
    pub async fn accept_client(&mut self) -> Result<(), SessionError> {
        let rx = self.accepted_rx.as_mut().ok_or(SessionError::InvalidTransition("Waiting"))?;
        let connected = rx.recv().await.ok_or(SessionError::Fatal("listener task exited".into()))?;
        self.endpoint = Some(connected.transport);
        self.remote = Some(connected.remote);
        self.sync = Some(FrameSync::new(Role::Host));
        self.state = SessionState::Active(ConnectedState::Syncing);
        if let Some(cancel) = self.advertiser_cancel.take() {
            cancel.cancel();
        }
        Ok(())
    }

    /// Host side of the state-transfer phase (spec §4.4).
    pub async fn send_state(&mut self, state: &[u8]) -> Result<(), SessionError> {
        let transport = self.endpoint.as_mut().ok_or(SessionError::InvalidTransition("Syncing"))?;
        host_send_state(transport, state).await.map_err(|e| SessionError::Fatal(e.to_string()))?;
        self.state = SessionState::Active(ConnectedState::Playing);
        Ok(())
    }

    /// Client side of the state-transfer phase; seeds the frame buffer and
    /// returns the host's serialized state for the caller to deserialize
    /// (core state format is out of scope here — spec §1).
    pub async fn recv_state(&mut self) -> Result<Vec<u8>, SessionError> {
        let transport = self.endpoint.as_mut().ok_or(SessionError::InvalidTransition("Syncing"))?;
        let state = client_recv_state(transport).await.map_err(|e| SessionError::Fatal(e.to_string()))?;
        if let Some(sync) = self.sync.as_mut() {
            sync.seed_after_state_transfer();
        }
        self.state = SessionState::Active(ConnectedState::Playing);
        Ok(state)
    }

    /// Drive the per-frame lockstep algorithm once (spec §4.4). Updates
    /// the session's lifecycle state from the outcome.
    pub async fn step(&mut self, local_input: u16) -> Result<StepOutcome, SessionError> {
        let transport = self.endpoint.as_mut().ok_or(SessionError::InvalidTransition("Playing"))?;
        let sync = self.sync.as_mut().ok_or(SessionError::InvalidTransition("Playing"))?;
        let outcome = sync.step(transport, local_input).await?;
        match outcome {
            StepOutcome::RunFrame { .. } => self.state = SessionState::Active(ConnectedState::Playing),
            StepOutcome::SkipFrame => self.state = SessionState::Active(ConnectedState::Stalled),
            StepOutcome::Disconnect => {
                self.state = match self.mode {
                    SessionMode::Active { role: Role::Host, .. } => SessionState::Waiting,
                    _ => SessionState::Disconnected,
                };
                self.endpoint = None;
            }
        }
        Ok(outcome)
    }

    pub fn run_frame(&self) -> Option<u32> {
        self.sync.as_ref().map(FrameSync::run_frame)
    }

    pub fn audio_should_silence(&self) -> bool {
        self.sync.as_ref().is_some_and(FrameSync::audio_should_silence)
    }

    /// `(host input, client input)` for a completed frame (spec §8).
    pub fn get_input(&self, frame: u32) -> Option<(u16, u16)> {
        self.sync.as_ref().and_then(|sync| sync.get_input(frame))
    }
}

impl LinkSession for NetplaySession {
    async fn host(&mut self, params: StartHostParams) -> Result<(), SessionError> {
        self.game_name = params.game_name;
        self.game_crc = params.game_crc;

        let listener = TcpListener::bind(("0.0.0.0", self.local_port)).await.map_err(link_transport::TransportError::from)?;
        self.local_port = listener.local_addr().map_err(link_transport::TransportError::from)?.port();

        let record = DiscoveryRecord::new(magic::NETPLAY_ADV, self.game_crc, self.local_port, &self.game_name, "");
        let advertiser = Advertiser::bind(LinkKind::Netplay, record)
            .await
            .map_err(|e| SessionError::Fatal(e.to_string()))?;
        let cancel = CancellationToken::new();
        let adv_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = advertiser.run(adv_cancel).await {
                warn!(error = %e, "netplay advertiser exited");
            }
        });
        self.advertiser_cancel = Some(cancel.clone());

        let (tx, rx) = mpsc::channel(1);
        self.accepted_rx = Some(rx);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return,
                    accepted = listener.accept() => {
                        let Ok((stream, remote)) = accepted else { continue };
                        info!(%remote, "netplay client connected");
                        match Transport::new(stream, LinkKind::Netplay) {
                            Ok(mut transport) => {
                                if let Err(e) = host_handshake(&mut transport).await {
                                    warn!(error = %e, "netplay handshake failed");
                                    continue;
                                }
                                if tx.send(Connected { transport, remote }).await.is_err() {
                                    return;
                                }
                            }
                            Err(e) => warn!(error = %e, "failed to tune accepted socket"),
                        }
                    }
                }
            }
        });

        self.mode = SessionMode::Active { kind: LinkKind::Netplay, role: Role::Host };
        self.state = SessionState::Waiting;
        Ok(())
    }

    async fn join(&mut self, addr: SocketAddr) -> Result<ConnectOutcome, SessionError> {
        self.state = SessionState::Connecting;
        let stream = TcpStream::connect(addr).await.map_err(link_transport::TransportError::from)?;
        let mut transport = Transport::new(stream, LinkKind::Netplay)?;
        client_handshake(&mut transport).await?;

        self.mode = SessionMode::Active { kind: LinkKind::Netplay, role: Role::Client };
        self.state = SessionState::Active(ConnectedState::Syncing);
        self.remote = Some(addr);
        self.endpoint = Some(transport);
        self.sync = Some(FrameSync::new(Role::Client));
        Ok(ConnectOutcome::Connected)
    }

    async fn disconnect(&mut self) -> Result<(), SessionError> {
        if let Some(cancel) = self.advertiser_cancel.take() {
            cancel.cancel();
        }
        self.endpoint = None;
        self.sync = None;
        self.mode = SessionMode::Off;
        self.state = SessionState::Disconnected;
        Ok(())
    }

    fn status(&self) -> PollStatus {
        PollStatus {
            mode: self.mode,
            state: self.state.clone(),
            local_ip: None,
            remote_ip: self.remote.map(|a| a.ip()),
            status_text: self.state.name().to_string(),
        }
    }

    async fn pause(&mut self) -> Result<(), SessionError> {
        let (Some(transport), Some(sync)) = (self.endpoint.as_mut(), self.sync.as_mut()) else {
            return Err(SessionError::InvalidTransition("Playing"));
        };
        sync.send_pause(transport).await?;
        self.state = SessionState::Paused { resume_to: ConnectedState::Playing };
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), SessionError> {
        let (Some(transport), Some(sync)) = (self.endpoint.as_mut(), self.sync.as_mut()) else {
            return Err(SessionError::InvalidTransition("Paused"));
        };
        sync.send_resume(transport).await?;
        self.state = SessionState::Active(ConnectedState::Playing);
        Ok(())
    }

    fn list_discovered_hosts(&self) -> Vec<DiscoveryRecord> {
        self.host_table.snapshot().into_iter().map(|(_, rec)| rec).collect()
    }
}
