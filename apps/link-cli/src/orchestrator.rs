//! Owns the single active [`Session`] variant and the current
//! [`PeerNetwork`] (spec §4.6). This is the "Orchestrator" component: it
//! is the thing that knows about *both* a link session and the Wi-Fi
//! collaborator, which is why it lives in the application binary rather
//! than in any of the `link-*` library crates (none of which may depend
//! on each other in a cycle).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use link_gb::GbLinkSession;
use link_gba::GbaLinkSession;
use link_network::{NetworkControl, PeerNetwork};
use link_netplay::NetplaySession;
use link_session::capability::{ConnectOutcome, LinkSession, StartHostParams};
use link_session::SessionError;
use tracing::{info, warn};

use crate::core_stub::{LoggingCoreCallbacks, LoggingOptionWriter};

/// The three mode-specific session types behind one roof. Plain enum
/// dispatch rather than `Box<dyn LinkSession>`: [`LinkSession`]'s methods
/// are `async fn`s in a trait, which are not object-safe.
pub enum ActiveSession {
    Off,
    Netplay(NetplaySession),
    GbaLink(GbaLinkSession<LoggingCoreCallbacks>),
    GbLink(GbLinkSession<LoggingOptionWriter>),
}

/// Retry policy for the client-joins-hotspot path (spec §7): 3 attempts,
/// 1.5s apart.
const HOTSPOT_JOIN_RETRIES: u32 = 3;
const HOTSPOT_JOIN_SPACING: Duration = Duration::from_millis(1500);

pub struct Orchestrator<N: NetworkControl> {
    network: Arc<N>,
    peer_network: PeerNetwork,
    session: ActiveSession,
    /// Set once the orchestrator itself brought up a hotspot, so teardown
    /// knows whether to ask `NetworkControl` to forget it (spec §6
    /// "process-global state").
    connected_to_own_hotspot: bool,
}

impl<N: NetworkControl> Orchestrator<N> {
    pub fn new(network: Arc<N>) -> Self {
        Self {
            network,
            peer_network: PeerNetwork::None,
            session: ActiveSession::Off,
            connected_to_own_hotspot: false,
        }
    }

    /// Host with the device acting as its own access point (spec §4.6):
    /// snapshot the current station, bring up a hotspot with a
    /// freshly-derived SSID, then start the session's listener bound to
    /// the fixed AP IP.
    pub async fn host_on_hotspot(&mut self, mut session: ActiveSession, params: StartHostParams) -> Result<(), SessionError> {
        let prior_ssid = self
            .network
            .save_current_station()
            .await
            .map_err(|e| SessionError::Fatal(e.to_string()))?;

        let ssid = link_network::system::SystemNetworkControl::derive_hotspot_ssid();
        let password = "nesium-link".to_string();
        self.network
            .start_ap(&ssid, &password)
            .await
            .map_err(|e| SessionError::Fatal(e.to_string()))?;

        self.peer_network = PeerNetwork::Station { ssid: prior_ssid }.enter_hotspot(ssid.clone(), password);
        self.connected_to_own_hotspot = true;

        info!(ssid, "hotspot up, starting session listener");
        host_inner(&mut session, params).await?;
        self.session = session;
        Ok(())
    }

    /// Host on the existing station network (no Wi-Fi role change).
    pub async fn host_on_station(&mut self, mut session: ActiveSession, params: StartHostParams) -> Result<(), SessionError> {
        self.network.ensure_station_ready().await.map_err(|e| SessionError::Fatal(e.to_string()))?;
        host_inner(&mut session, params).await?;
        self.session = session;
        Ok(())
    }

    /// Client join, retrying per spec §7 if this is a hotspot join
    /// (`is_hotspot_join` — the caller knows this from how it resolved
    /// `addr`, e.g. `10.0.0.1` after a discovery query).
    pub async fn join(
        &mut self,
        mut session: ActiveSession,
        addr: SocketAddr,
        is_hotspot_join: bool,
    ) -> Result<ConnectOutcome, SessionError> {
        let attempts = if is_hotspot_join { HOTSPOT_JOIN_RETRIES } else { 1 };
        let mut last_err = None;
        for attempt in 1..=attempts {
            match join_inner(&mut session, addr).await {
                Ok(outcome) => {
                    self.session = session;
                    return Ok(outcome);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "join attempt failed");
                    last_err = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(HOTSPOT_JOIN_SPACING).await;
                    }
                }
            }
        }
        Err(last_err.expect("loop runs at least once"))
    }

    /// Stop the active session and, if a hotspot is up, tear it down
    /// asynchronously (spec §4.6: "the synchronous path does not wait for
    /// Wi-Fi restoration").
    ///
    /// Open question resolved (spec §9): the source is ambiguous about
    /// whether `connected_to_own_hotspot` is cleared before or after the
    /// async restore runs. This implementation captures the flag and the
    /// prior SSID into the spawned task *before* clearing either on the
    /// caller's side ("capture then clear") — a concurrent second
    /// `stop()` can never observe a half-torn-down hotspot state.
    pub async fn stop(&mut self) -> Result<(), SessionError> {
        match &mut self.session {
            ActiveSession::Off => {}
            ActiveSession::Netplay(s) => s.disconnect().await?,
            ActiveSession::GbaLink(s) => s.disconnect().await?,
            ActiveSession::GbLink(s) => s.disconnect().await?,
        }
        self.session = ActiveSession::Off;

        if self.connected_to_own_hotspot {
            let prior_ssid = self.peer_network.prior_ssid().map(str::to_string);
            let forget_ssid = if let PeerNetwork::Hotspot { ssid, .. } = &self.peer_network {
                Some(ssid.clone())
            } else {
                None
            };
            self.connected_to_own_hotspot = false;
            self.peer_network = PeerNetwork::None;

            let network = self.network.clone();
            tokio::spawn(async move {
                if let Err(e) = network.stop_ap().await {
                    warn!(error = %e, "failed to stop hotspot AP");
                }
                if let Some(ssid) = forget_ssid {
                    if let Err(e) = network.forget_station(&ssid).await {
                        warn!(error = %e, "failed to forget hotspot ssid");
                    }
                }
                if let Err(e) = network.restore_saved_station(prior_ssid.as_deref()).await {
                    warn!(error = %e, "failed to restore prior station connection");
                }
            });
        }

        Ok(())
    }

    pub fn peer_network(&self) -> &PeerNetwork {
        &self.peer_network
    }
}

async fn host_inner(session: &mut ActiveSession, params: StartHostParams) -> Result<(), SessionError> {
    match session {
        ActiveSession::Off => Err(SessionError::InvalidTransition("Off")),
        ActiveSession::Netplay(s) => s.host(params).await,
        ActiveSession::GbaLink(s) => s.host(params).await,
        ActiveSession::GbLink(s) => s.host(params).await,
    }
}

async fn join_inner(session: &mut ActiveSession, addr: SocketAddr) -> Result<ConnectOutcome, SessionError> {
    match session {
        ActiveSession::Off => Err(SessionError::InvalidTransition("Off")),
        ActiveSession::Netplay(s) => s.join(addr).await,
        ActiveSession::GbaLink(s) => s.join(addr).await,
        ActiveSession::GbLink(s) => s.join(addr).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use link_network::MockNetworkControl;

    #[tokio::test]
    async fn stop_captures_hotspot_state_before_clearing_it() {
        let network = Arc::new(MockNetworkControl::with_station("HomeWifi"));
        let mut orch = Orchestrator::new(network.clone());
        orch.peer_network = PeerNetwork::Station { ssid: Some("HomeWifi".into()) }
            .enter_hotspot("NES-ab12".into(), "nesium-link".into());
        orch.connected_to_own_hotspot = true;

        orch.stop().await.expect("stop");
        assert!(!orch.connected_to_own_hotspot);
        assert_eq!(orch.peer_network(), &PeerNetwork::None);

        // Give the spawned teardown task a chance to run.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(network.forgotten_ssids().contains(&"NES-ab12".to_string()));
    }
}
