use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use link_proto::gba::GbaCmd;
use link_proto::{encode_gba_frame, try_decode_gba_frames};
use link_session::Role;
use link_transport::{Transport, TransportError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::callbacks::{BridgeHandle, CoreCallbacks};
use crate::constants::{
    HEARTBEAT_INTERVAL, MAX_DELIVER_PER_TICK, MAX_PACKETS_PER_POLL, WATCHDOG_TIMEOUT,
};
use crate::queue::PendingPacketQueue;

/// What made the bridge stop running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeExit {
    PeerDisconnected,
    Watchdog,
    Cancelled,
}

/// Ferries opaque `SIO_DATA` bytes between one TCP [`Transport`] and a
/// core's [`CoreCallbacks`] block (spec §4.5). The core never touches the
/// transport directly: it calls [`BridgeHandle::send`] (non-blocking,
/// channel-backed) and receives bytes via [`CoreCallbacks::receive`],
/// invoked from inside [`Self::run`] — i.e. on whatever task drives the
/// bridge, which the caller is responsible for making the core's main
/// thread per spec §5.
pub struct GbaBridge<C: CoreCallbacks> {
    transport: Transport,
    queue: PendingPacketQueue,
    callbacks: Arc<C>,
    role: Role,
    client_id: u16,
    remote_client_id: u16,
    outbound_rx: std_mpsc::Receiver<Vec<u8>>,
    last_sent_at: Instant,
    last_received_at: Instant,
    watchdog_armed: bool,
}

impl<C: CoreCallbacks> GbaBridge<C> {
    pub fn new(
        transport: Transport,
        role: Role,
        client_id: u16,
        remote_client_id: u16,
        callbacks: Arc<C>,
    ) -> (Self, std_mpsc::Sender<Vec<u8>>) {
        let (tx, rx) = std_mpsc::channel();
        let now = Instant::now();
        let bridge = Self {
            transport,
            queue: PendingPacketQueue::new(),
            callbacks,
            role,
            client_id,
            remote_client_id,
            outbound_rx: rx,
            last_sent_at: now,
            last_received_at: now,
            watchdog_armed: false,
        };
        (bridge, tx)
    }

    /// Invoke the core's `start`/`connected` callbacks and arm the
    /// connection watchdog (spec §4.5 steps 1–2; watchdog armed only after
    /// `start` so the pre-game handshake isn't included).
    pub fn announce_connected(&mut self, handle: BridgeHandle) {
        self.callbacks.start(self.client_id, handle);
        self.callbacks.connected(self.remote_client_id);
        self.last_received_at = Instant::now();
        self.watchdog_armed = true;
    }

    /// Drive the bridge until disconnect, watchdog trip, or cancellation.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<BridgeExit, TransportError> {
        let mut ticker = tokio::time::interval(Duration::from_millis(16));
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(BridgeExit::Cancelled),
                _ = ticker.tick() => {
                    if let Some(exit) = self.tick().await? {
                        return Ok(exit);
                    }
                }
            }
        }
    }

    /// One frame tick (spec §4.5): drain outbound sends, poll up to
    /// [`MAX_PACKETS_PER_POLL`] received frames, heartbeat if due, and
    /// deliver up to [`MAX_DELIVER_PER_TICK`] queued packets to the core.
    pub async fn tick(&mut self) -> Result<Option<BridgeExit>, TransportError> {
        self.drain_outbound().await?;

        for _ in 0..MAX_PACKETS_PER_POLL {
            match self.transport.fill_once_timeout(Duration::from_millis(1)).await {
                Ok(_) => {}
                Err(TransportError::Timeout(_)) => break,
                Err(TransportError::Closed) => {
                    self.callbacks.disconnected();
                    return Ok(Some(BridgeExit::PeerDisconnected));
                }
                Err(e) => return Err(e),
            }
            let (frames, consumed) = try_decode_gba_frames(self.transport.unread())?;
            if frames.is_empty() {
                self.transport.consume(consumed);
                break;
            }
            for frame in &frames {
                match frame.cmd {
                    GbaCmd::SioData => {
                        self.queue.push(frame.client_id, frame.payload);
                    }
                    GbaCmd::Heartbeat => {
                        trace!("heartbeat received");
                    }
                    GbaCmd::Disconnect => {
                        self.transport.consume(consumed);
                        self.callbacks.disconnected();
                        return Ok(Some(BridgeExit::PeerDisconnected));
                    }
                    GbaCmd::Ready | GbaCmd::Ping | GbaCmd::Pong => {}
                }
            }
            self.transport.consume(consumed);
            self.last_received_at = Instant::now();
        }

        if self.watchdog_armed && self.last_received_at.elapsed() > WATCHDOG_TIMEOUT {
            warn!("no traffic from peer in 60s, disconnecting");
            self.send_disconnect().await.ok();
            self.callbacks.disconnected();
            return Ok(Some(BridgeExit::Watchdog));
        }

        if self.role == Role::Host && self.last_sent_at.elapsed() >= HEARTBEAT_INTERVAL {
            let frame = encode_gba_frame(GbaCmd::Heartbeat, 0, &[]).expect("empty payload");
            self.transport.send_frame(&frame).await?;
            self.last_sent_at = Instant::now();
        }

        for _ in 0..MAX_DELIVER_PER_TICK {
            let Some(packet) = self.queue.pop() else { break };
            self.callbacks.receive(&packet.bytes, packet.client_id);
        }

        Ok(None)
    }

    async fn drain_outbound(&mut self) -> Result<(), TransportError> {
        while let Ok(payload) = self.outbound_rx.try_recv() {
            let frame = encode_gba_frame(GbaCmd::SioData, self.client_id, &payload)
                .unwrap_or_else(|_| encode_gba_frame(GbaCmd::SioData, self.client_id, &[]).expect("empty payload fits"));
            self.transport.send_frame(&frame).await?;
            self.last_sent_at = Instant::now();
        }
        Ok(())
    }

    async fn send_disconnect(&mut self) -> Result<(), TransportError> {
        let frame = encode_gba_frame(GbaCmd::Disconnect, self.client_id, &[]).expect("empty payload");
        self.transport.send_frame(&frame).await?;
        debug!("sent DISCONNECT");
        Ok(())
    }
}
