use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use link_proto::{DiscoveryRecord, LinkKind};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::DiscoveryError;
use crate::host_table::HostTable;

/// Listens for broadcast advertisements (and responses to its own
/// point-to-point queries) and records them in a shared [`HostTable`].
pub struct Searcher {
    socket: UdpSocket,
    kind: LinkKind,
    table: Arc<HostTable>,
}

impl Searcher {
    pub async fn bind(kind: LinkKind, table: Arc<HostTable>) -> Result<Self, DiscoveryError> {
        let socket = UdpSocket::bind(("0.0.0.0", kind.discovery_port())).await?;
        socket.set_broadcast(true)?;
        Ok(Self { socket, kind, table })
    }

    /// Listen for advertisements/responses until `cancel` fires, populating
    /// the shared host table as they arrive.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), DiscoveryError> {
        let mut buf = [0u8; 256];
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(()),
                res = self.socket.recv_from(&mut buf) => {
                    let (n, peer) = res?;
                    self.observe_datagram(&buf[..n], peer);
                }
            }
        }
    }

    fn observe_datagram(&self, datagram: &[u8], peer: SocketAddr) {
        let Ok(record) = DiscoveryRecord::decode(datagram) else {
            return;
        };
        let (adv_magic, _, response_magic) = self.kind.magics();
        if record.magic != adv_magic && record.magic != response_magic {
            return;
        }
        if !self.table.observe(peer.ip(), record) {
            trace!(%peer, kind = %self.kind, "host table full, dropping new sighting");
        }
    }

    /// Ask one specific address whether it's hosting this link mode and
    /// wait up to `timeout` for its response, without touching the shared
    /// host table (used for the GBA-link compatibility pre-check, spec
    /// §4.6, before attempting the TCP connect).
    pub async fn query_one(&self, target: SocketAddr, timeout: Duration) -> Result<Option<DiscoveryRecord>, DiscoveryError> {
        let (_, query_magic, response_magic) = self.kind.magics();
        let query = DiscoveryRecord::new(query_magic, 0, 0, "", "");
        self.socket.send_to(&query.encode(), target).await?;

        let mut buf = [0u8; 256];
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            match tokio::time::timeout(remaining, self.socket.recv_from(&mut buf)).await {
                Ok(Ok((n, peer))) if peer == target => {
                    if let Ok(record) = DiscoveryRecord::decode(&buf[..n])
                        && record.magic == response_magic
                    {
                        return Ok(Some(record));
                    }
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Ok(None),
            }
        }
    }
}

/// Convenience for binding an ephemeral query-only socket (used by callers
/// that only need [`Searcher::query_one`] and don't want to hold the
/// well-known discovery port, which is typically owned by a longer-lived
/// [`Searcher`] or [`crate::advertiser::Advertiser`]).
pub async fn bind_query_socket(kind: LinkKind, table: Arc<HostTable>) -> Result<Searcher, DiscoveryError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    Ok(Searcher { socket, kind, table })
}
