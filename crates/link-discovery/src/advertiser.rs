use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use link_proto::{DiscoveryRecord, LinkKind};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::DiscoveryError;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Broadcasts a [`DiscoveryRecord`] on the mode's discovery port at a fixed
/// cadence, and answers direct point-to-point queries in between (spec
/// §4.2). The cadence is enforced by a token-bucket limiter rather than a
/// plain sleep so that an explicit [`Self::advertise_once`] call (e.g. "host
/// just transitioned to Waiting") never bursts faster than the wire allows.
pub struct Advertiser {
    socket: UdpSocket,
    kind: LinkKind,
    record: DiscoveryRecord,
    broadcast_addr: SocketAddr,
    limiter: Limiter,
}

impl Advertiser {
    pub async fn bind(kind: LinkKind, record: DiscoveryRecord) -> Result<Self, DiscoveryError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        socket.set_broadcast(true)?;

        let broadcast_addr =
            SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, kind.discovery_port()));

        let period = Duration::from_millis(500);
        let quota = Quota::with_period(period)
            .expect("500ms is a positive duration")
            .allow_burst(NonZeroU32::new(1).expect("1 is nonzero"));

        Ok(Self {
            socket,
            kind,
            record,
            broadcast_addr,
            limiter: RateLimiter::direct(quota),
        })
    }

    /// Broadcast once. A no-op if called more often than once per 500ms.
    pub async fn advertise_once(&self) -> Result<(), DiscoveryError> {
        if self.limiter.check().is_err() {
            trace!(kind = %self.kind, "advertise skipped, within 500ms of last broadcast");
            return Ok(());
        }
        let bytes = self.record.encode();
        self.socket.send_to(&bytes, self.broadcast_addr).await?;
        Ok(())
    }

    /// Drive the advertise/respond loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), DiscoveryError> {
        let mut ticker = tokio::time::interval(Duration::from_millis(500));
        let mut buf = [0u8; 256];

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    self.advertise_once().await?;
                }
                res = self.socket.recv_from(&mut buf) => {
                    let (n, peer) = res?;
                    self.respond_if_query(&buf[..n], peer).await?;
                }
            }
        }
    }

    async fn respond_if_query(&self, datagram: &[u8], peer: SocketAddr) -> Result<(), DiscoveryError> {
        let Ok(query) = DiscoveryRecord::decode(datagram) else {
            return Ok(());
        };
        let (_, query_magic, response_magic) = self.kind.magics();
        if query.magic != query_magic {
            return Ok(());
        }
        debug!(%peer, kind = %self.kind, "answering point-to-point discovery query");
        let mut response = self.record.clone();
        response.magic = response_magic;
        self.socket.send_to(&response.encode(), peer).await?;
        Ok(())
    }
}
