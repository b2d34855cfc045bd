use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use link_discovery::{Advertiser, HostTable};
use link_proto::constants::{magic, port};
use link_proto::{DiscoveryRecord, LinkKind};
use link_session::capability::{ConnectOutcome, LinkSession, PollStatus, StartHostParams};
use link_session::state::{ConnectedState, Role, SessionMode, SessionState};
use link_session::SessionError;
use link_transport::Transport;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bridge::{BridgeExit, GbaBridge};
use crate::callbacks::{BridgeHandle, CoreCallbacks};
use crate::error::GbaLinkError;
use crate::handshake::{client_handshake, host_handshake};

/// `state`/`remote` as seen by [`LinkSession::status`]. Lives behind a
/// mutex because, unlike netplay (whose `step()` is driven synchronously
/// by the caller's frame loop), the GBA bridge ticks on its own background
/// task once a client is accepted — the foreground `GbaLinkSession` has no
/// other way to learn the connection came up, stalled out, or dropped.
struct SharedStatus {
    state: SessionState,
    remote: Option<SocketAddr>,
}

impl SharedStatus {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            remote: None,
        }
    }

    fn set(&mut self, state: SessionState, remote: Option<SocketAddr>) {
        self.state = state;
        self.remote = remote;
    }
}

/// The GBA wireless-adapter link session (spec §4.5, §6). Owns the
/// accept/connect handshake and hands the resulting [`Transport`] to a
/// [`GbaBridge`] that pumps it against the core's [`CoreCallbacks`].
pub struct GbaLinkSession<C: CoreCallbacks> {
    mode: SessionMode,
    link_mode: String,
    game_name: String,
    game_crc: u32,
    local_port: u16,
    callbacks: Arc<C>,
    host_table: Arc<HostTable>,
    advertiser_cancel: Option<CancellationToken>,
    run_cancel: Option<CancellationToken>,
    run_task: Option<tokio::task::JoinHandle<()>>,
    shared: Arc<Mutex<SharedStatus>>,
}

const DEFAULT_PORT: u16 = 0;

impl<C: CoreCallbacks + 'static> GbaLinkSession<C> {
    pub fn new(callbacks: Arc<C>) -> Self {
        Self {
            mode: SessionMode::Off,
            link_mode: String::new(),
            game_name: String::new(),
            game_crc: 0,
            local_port: DEFAULT_PORT,
            callbacks,
            host_table: Arc::new(HostTable::new()),
            advertiser_cancel: None,
            run_cancel: None,
            run_task: None,
            shared: Arc::new(Mutex::new(SharedStatus::new())),
        }
    }

    /// Pre-check a host's `link_mode` over UDP before ever opening TCP
    /// (spec §4.6 "Compatibility check"). Purely informational.
    pub async fn query_host_link_mode(
        &self,
        host: SocketAddr,
    ) -> Result<Option<DiscoveryRecord>, GbaLinkError> {
        let searcher = link_discovery::searcher::bind_query_socket(LinkKind::GbaLink, self.host_table.clone()).await?;
        Ok(searcher.query_one(host, Duration::from_millis(500)).await?)
    }

    fn set_status(&self, state: SessionState, remote: Option<SocketAddr>) {
        self.shared.lock().expect("status mutex poisoned").set(state, remote);
    }

    fn teardown_run_task(&mut self) {
        if let Some(cancel) = self.run_cancel.take() {
            cancel.cancel();
        }
        if let Some(cancel) = self.advertiser_cancel.take() {
            cancel.cancel();
        }
        self.run_task = None;
    }
}

impl<C: CoreCallbacks + 'static> LinkSession for GbaLinkSession<C> {
    async fn host(&mut self, params: StartHostParams) -> Result<(), SessionError> {
        self.link_mode = params.link_mode.unwrap_or_default();
        self.game_name = params.game_name;
        self.game_crc = params.game_crc;

        let listener = TcpListener::bind(("0.0.0.0", self.local_port))
            .await
            .map_err(link_transport::TransportError::from)?;
        self.local_port = listener.local_addr().map_err(link_transport::TransportError::from)?.port();

        let record = DiscoveryRecord::new(
            magic::GBA_ADV,
            self.game_crc,
            self.local_port,
            &self.game_name,
            &self.link_mode,
        );
        let advertiser = Advertiser::bind(LinkKind::GbaLink, record)
            .await
            .map_err(|e| SessionError::Fatal(e.to_string()))?;
        let adv_cancel = CancellationToken::new();
        let adv_cancel_for_advertiser = adv_cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = advertiser.run(adv_cancel_for_advertiser).await {
                warn!(error = %e, "gba link advertiser exited");
            }
        });
        self.advertiser_cancel = Some(adv_cancel.clone());

        self.mode = SessionMode::Active { kind: LinkKind::GbaLink, role: Role::Host };
        self.set_status(SessionState::Waiting, None);

        let run_cancel = CancellationToken::new();
        self.run_cancel = Some(run_cancel.clone());

        let callbacks = self.callbacks.clone();
        let link_mode = self.link_mode.clone();
        let shared = self.shared.clone();
        self.run_task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = run_cancel.cancelled() => return,
                    accepted = listener.accept() => {
                        let Ok((stream, remote)) = accepted else { continue };
                        info!(%remote, "gba link client connected");

                        // Leaving Waiting: stop advertising and close the
                        // broadcast socket while this client bridges (spec
                        // §4.2 — "the advertiser thread is joined and the
                        // broadcast socket closed").
                        adv_cancel.cancel();
                        shared.lock().expect("status mutex poisoned").set(
                            SessionState::Active(ConnectedState::Connected),
                            Some(remote),
                        );

                        if let Err(e) = run_accepted(stream, &link_mode, callbacks.clone(), run_cancel.clone()).await {
                            warn!(error = %e, "gba link session ended");
                        }

                        shared.lock().expect("status mutex poisoned").set(SessionState::Disconnected, None);
                        return;
                    }
                }
            }
        }));

        Ok(())
    }

    async fn join(&mut self, addr: SocketAddr) -> Result<ConnectOutcome, SessionError> {
        self.set_status(SessionState::Connecting, None);
        let stream = TcpStream::connect(addr).await.map_err(link_transport::TransportError::from)?;
        let mut transport = Transport::new(stream, LinkKind::GbaLink)?;

        let outcome = client_handshake(&mut transport, &self.link_mode)
            .await
            .map_err(|e| SessionError::Fatal(e.to_string()))?;

        if let ConnectOutcome::NeedsReload { .. } = &outcome {
            self.set_status(SessionState::Disconnected, None);
            return Ok(outcome);
        }

        self.mode = SessionMode::Active { kind: LinkKind::GbaLink, role: Role::Client };
        self.set_status(SessionState::Active(ConnectedState::Connected), Some(addr));

        let callbacks = self.callbacks.clone();
        let cancel = CancellationToken::new();
        self.run_cancel = Some(cancel.clone());
        let shared = self.shared.clone();
        self.run_task = Some(tokio::spawn(async move {
            let (mut bridge, tx) = GbaBridge::new(transport, Role::Client, 1, 0, callbacks);
            bridge.announce_connected(BridgeHandle::new(tx));
            if let Err(e) = bridge.run(cancel).await {
                warn!(error = %e, "gba link bridge exited");
            }
            shared.lock().expect("status mutex poisoned").set(SessionState::Disconnected, None);
        }));

        Ok(outcome)
    }

    async fn disconnect(&mut self) -> Result<(), SessionError> {
        self.teardown_run_task();
        self.mode = SessionMode::Off;
        self.set_status(SessionState::Disconnected, None);
        Ok(())
    }

    fn status(&self) -> PollStatus {
        let guard = self.shared.lock().expect("status mutex poisoned");
        PollStatus {
            mode: self.mode,
            state: guard.state.clone(),
            local_ip: None,
            remote_ip: guard.remote.map(|a| a.ip()),
            status_text: guard.state.name().to_string(),
        }
    }

    async fn pause(&mut self) -> Result<(), SessionError> {
        // GBA link has no pause concept on the wire (spec §4.3: only
        // netplay's PAUSE/RESUME commands exist); the menu may still stop
        // driving the core, but the link itself keeps running.
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn list_discovered_hosts(&self) -> Vec<DiscoveryRecord> {
        self.host_table.snapshot().into_iter().map(|(_, rec)| rec).collect()
    }
}

async fn run_accepted<C: CoreCallbacks + 'static>(
    stream: TcpStream,
    our_link_mode: &str,
    callbacks: Arc<C>,
    cancel: CancellationToken,
) -> Result<(), GbaLinkError> {
    let mut transport = Transport::new(stream, LinkKind::GbaLink)?;
    host_handshake(&mut transport, our_link_mode).await?;

    let (mut bridge, tx) = GbaBridge::new(transport, Role::Host, 0, 1, callbacks);
    bridge.announce_connected(BridgeHandle::new(tx));
    match bridge.run(cancel).await? {
        BridgeExit::PeerDisconnected | BridgeExit::Watchdog => Ok(()),
        BridgeExit::Cancelled => Ok(()),
    }
}

/// Compile-time documentation of the discovery port this mode uses (spec
/// §6): kept as a const re-export so callers don't need to reach into
/// `link_proto` directly for the common case.
pub const DISCOVERY_PORT: u16 = port::GBA_DISCOVERY;
