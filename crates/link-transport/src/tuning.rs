use std::time::Duration;

use link_proto::LinkKind;
use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;

use crate::error::TransportError;

/// Per-mode TCP tuning (spec §4.1). Netplay is latency-bound (small, frequent
/// writes, so Nagle must be off and keepalive should fire fast to catch a
/// dropped peer inside the stall-timeout window); GBA link moves slightly
/// larger chunks less often and can tolerate a slower keepalive cadence.
struct Tuning {
    send_buffer: usize,
    recv_buffer: usize,
    keepalive_idle: Duration,
    keepalive_interval: Duration,
    keepalive_retries: u32,
}

const NETPLAY_TUNING: Tuning = Tuning {
    send_buffer: 64 * 1024,
    recv_buffer: 64 * 1024,
    keepalive_idle: Duration::from_secs(5),
    keepalive_interval: Duration::from_secs(2),
    keepalive_retries: 3,
};

const GBA_TUNING: Tuning = Tuning {
    send_buffer: 32 * 1024,
    recv_buffer: 32 * 1024,
    keepalive_idle: Duration::from_secs(20),
    keepalive_interval: Duration::from_secs(5),
    keepalive_retries: 3,
};

fn tuning_for(mode: LinkKind) -> Result<&'static Tuning, TransportError> {
    match mode {
        LinkKind::Netplay => Ok(&NETPLAY_TUNING),
        LinkKind::GbaLink => Ok(&GBA_TUNING),
        LinkKind::GbLink => Err(TransportError::Io(std::io::Error::other(
            "GB link mode does not open a framed Transport; the link cable is owned by the core",
        ))),
    }
}

/// Apply `TCP_NODELAY`, `SO_KEEPALIVE` and socket buffer sizing for `mode`.
///
/// GBA link additionally wants a 1ms receive timeout; under a non-blocking
/// tokio socket `SO_RCVTIMEO` has no effect (it only bounds a blocking
/// `recv`), so that deadline is honored instead by wrapping the read in
/// [`crate::transport::Transport::fill_once_timeout`] at the call site.
pub fn tune(stream: &TcpStream, mode: LinkKind) -> Result<(), TransportError> {
    stream.set_nodelay(true)?;

    let tuning = tuning_for(mode)?;
    let sock = SockRef::from(stream);

    let keepalive = TcpKeepalive::new()
        .with_time(tuning.keepalive_idle)
        .with_interval(tuning.keepalive_interval);
    #[cfg(not(any(target_os = "windows", target_os = "openbsd")))]
    let keepalive = keepalive.with_retries(tuning.keepalive_retries);

    sock.set_tcp_keepalive(&keepalive)?;
    sock.set_send_buffer_size(tuning.send_buffer)?;
    sock.set_recv_buffer_size(tuning.recv_buffer)?;

    Ok(())
}
