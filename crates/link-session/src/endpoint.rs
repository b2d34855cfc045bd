use std::net::SocketAddr;
use std::time::Instant;

use link_transport::Transport;

/// The single accepted/connected TCP peer a session may hold at a time
/// (spec §3). `recv_stream_buffer` lives inside [`Transport`] itself;
/// closing an endpoint drops the `Transport`, which drops that buffer too.
pub struct Endpoint {
    pub transport: Transport,
    pub remote: SocketAddr,
    pub last_sent_at: Instant,
    pub last_received_at: Instant,
}

impl Endpoint {
    pub fn new(transport: Transport, remote: SocketAddr) -> Self {
        let now = Instant::now();
        Self {
            transport,
            remote,
            last_sent_at: now,
            last_received_at: now,
        }
    }

    pub fn touch_sent(&mut self) {
        self.last_sent_at = Instant::now();
    }

    pub fn touch_received(&mut self) {
        self.last_received_at = Instant::now();
    }

    pub fn idle_since_receive(&self) -> std::time::Duration {
        self.last_received_at.elapsed()
    }
}
