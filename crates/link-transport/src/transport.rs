use std::time::Duration;

use link_proto::LinkKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::error::TransportError;
use crate::stream_buffer::StreamBuffer;
use crate::tuning;

/// Hard cap on how much unconsumed data a `Transport` will buffer before
/// giving up on the peer; a well-behaved peer never gets close to this
/// (frames are bounded to a few KiB), so hitting it means either a protocol
/// desync or a malicious/broken peer.
const MAX_RX_BUFFER: usize = 256 * 1024;

/// Total stall budget for one `send_frame` call in GBA-link mode before it
/// gives up with [`TransportError::Fatal`] (spec §4.1: "GBALink: 2 s per
/// frame"). Netplay's send is intentionally left unbounded — spec §4.1
/// calls it out as "blocking send", since a lockstep peer with nothing to
/// send waits on the remote's input indefinitely rather than timing out.
const GBA_SEND_STALL_BUDGET: Duration = Duration::from_secs(2);

/// A tuned TCP connection for one link-mode peer, with framing left to the
/// caller (see [`link_proto::netplay`] / [`link_proto::gba`]).
///
/// `send_frame` and the read side are designed to be driven from the same
/// task without deadlocking: a full-duplex link where both sides are
/// blocked writing into a peer whose receive buffer is also full would
/// otherwise stall forever, so every write loop iteration also polls the
/// read half and drains it into the internal buffer.
pub struct Transport {
    read: OwnedReadHalf,
    write: OwnedWriteHalf,
    rx: StreamBuffer,
    send_stall_budget: Option<Duration>,
}

impl Transport {
    pub fn new(stream: TcpStream, mode: LinkKind) -> Result<Self, TransportError> {
        tuning::tune(&stream, mode)?;
        let (read, write) = stream.into_split();
        let send_stall_budget = match mode {
            LinkKind::GbaLink => Some(GBA_SEND_STALL_BUDGET),
            LinkKind::Netplay | LinkKind::GbLink => None,
        };
        Ok(Self {
            read,
            write,
            rx: StreamBuffer::new(8 * 1024),
            send_stall_budget,
        })
    }

    /// Write `bytes` in full, draining the read half into the internal
    /// buffer whenever the write side would otherwise block. In GBA-link
    /// mode the whole call is capped by [`GBA_SEND_STALL_BUDGET`]; netplay
    /// has no cap (see the type's doc comment).
    pub async fn send_frame(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        match self.send_stall_budget {
            Some(budget) => match tokio::time::timeout(budget, self.send_frame_inner(bytes)).await {
                Ok(res) => res,
                Err(_) => Err(TransportError::Fatal(budget)),
            },
            None => self.send_frame_inner(bytes).await,
        }
    }

    async fn send_frame_inner(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let Transport { read, write, rx, .. } = self;
        let mut offset = 0;
        while offset < bytes.len() {
            if rx.capacity() > MAX_RX_BUFFER {
                return Err(TransportError::BufferOverflow(MAX_RX_BUFFER));
            }
            tokio::select! {
                biased;
                res = write.write(&bytes[offset..]) => {
                    offset += res?;
                }
                res = read.read(rx.reserve_write(4096)) => {
                    let n = res?;
                    if n == 0 {
                        return Err(TransportError::Closed);
                    }
                    rx.commit(n);
                }
            }
        }
        Ok(())
    }

    /// Pull one chunk of bytes from the socket into the internal buffer.
    /// Returns the number of bytes read; `0` is never returned — EOF is
    /// reported as [`TransportError::Closed`].
    pub async fn fill_once(&mut self) -> Result<usize, TransportError> {
        if self.rx.capacity() > MAX_RX_BUFFER {
            return Err(TransportError::BufferOverflow(MAX_RX_BUFFER));
        }
        let buf = self.rx.reserve_write(4096);
        let n = self.read.read(buf).await?;
        if n == 0 {
            return Err(TransportError::Closed);
        }
        self.rx.commit(n);
        Ok(n)
    }

    /// Same as [`Self::fill_once`] but bounded by `timeout`, for callers
    /// that need to interleave reads with a stall/keepalive clock.
    pub async fn fill_once_timeout(&mut self, timeout: Duration) -> Result<usize, TransportError> {
        match tokio::time::timeout(timeout, self.fill_once()).await {
            Ok(res) => res,
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }

    /// Bytes decoded-but-not-yet-consumed; callers run their mode-specific
    /// frame decoder over this slice and call [`Self::consume`] with
    /// whatever it reports consuming.
    pub fn unread(&self) -> &[u8] {
        self.rx.unread()
    }

    pub fn consume(&mut self, n: usize) {
        self.rx.consume(n);
    }

    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.write.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use link_proto::{encode_input_frame, try_decode_netplay_frames};
    use tokio::net::TcpListener;

    async fn connected_pair() -> (Transport, Transport) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        let client = TcpStream::connect(addr).await.expect("connect");
        let (server, _) = listener.accept().await.expect("accept");
        (
            Transport::new(client, LinkKind::Netplay).expect("tune client"),
            Transport::new(server, LinkKind::Netplay).expect("tune server"),
        )
    }

    #[tokio::test]
    async fn send_then_fill_round_trips_a_frame() {
        let (mut a, mut b) = connected_pair().await;
        let frame = encode_input_frame(9, 0xABCD);
        a.send_frame(&frame).await.expect("send");

        loop {
            b.fill_once().await.expect("fill");
            let (frames, consumed) = try_decode_netplay_frames(b.unread()).expect("decode");
            if !frames.is_empty() {
                assert_eq!(frames[0].frame, 9);
                b.consume(consumed);
                break;
            }
        }
    }

    #[tokio::test]
    async fn gb_link_mode_refuses_to_tune() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        let client = TcpStream::connect(addr).await.expect("connect");
        assert!(Transport::new(client, LinkKind::GbLink).is_err());
    }
}
