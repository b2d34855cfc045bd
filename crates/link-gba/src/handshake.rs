//! GBA link connect handshake (spec §4.3.1).

use link_proto::gba::GbaCmd;
use link_proto::{encode_gba_frame, try_decode_gba_frames};
use link_session::constants::READY_TIMEOUT;
use link_session::ConnectOutcome;
use link_transport::Transport;

use crate::error::GbaLinkError;

/// Client side of the handshake: send `READY`, wait for the host's `READY`
/// carrying its `link_mode`, compare against `our_link_mode`.
///
/// On mismatch returns [`ConnectOutcome::NeedsReload`] — the caller must
/// not proceed to treat the session as connected (spec §4.3.1 step 4).
pub async fn client_handshake(
    transport: &mut Transport,
    our_link_mode: &str,
) -> Result<ConnectOutcome, GbaLinkError> {
    let ready = encode_gba_frame(GbaCmd::Ready, 1, &[]).expect("empty payload");
    transport.send_frame(&ready).await?;

    let host_mode = recv_ready_payload(transport).await?;
    if host_mode != our_link_mode {
        return Ok(ConnectOutcome::NeedsReload {
            host_mode,
            client_mode: our_link_mode.to_string(),
        });
    }
    Ok(ConnectOutcome::Connected)
}

/// Host side: wait up to [`READY_TIMEOUT`] for the client's `READY`, then
/// reply with our own `READY` carrying `our_link_mode`. On timeout, sends
/// `DISCONNECT` and returns an error — the caller goes back to `Waiting`.
pub async fn host_handshake(transport: &mut Transport, our_link_mode: &str) -> Result<(), GbaLinkError> {
    let wait = async {
        loop {
            transport.fill_once().await?;
            let (frames, consumed) = try_decode_gba_frames(transport.unread())?;
            if let Some(frame) = frames.first() {
                let matched = frame.cmd == GbaCmd::Ready;
                transport.consume(consumed);
                if matched {
                    return Ok::<(), GbaLinkError>(());
                }
            } else {
                transport.consume(consumed);
            }
        }
    };

    if tokio::time::timeout(READY_TIMEOUT, wait).await.is_err() {
        let disconnect = encode_gba_frame(GbaCmd::Disconnect, 0, &[]).expect("empty payload");
        transport.send_frame(&disconnect).await.ok();
        return Err(GbaLinkError::Session(link_session::SessionError::HandshakeTimeout(READY_TIMEOUT)));
    }

    let mut mode_bytes = our_link_mode.as_bytes().to_vec();
    mode_bytes.truncate(link_proto::constants::LINK_MODE_LEN);
    let reply = encode_gba_frame(GbaCmd::Ready, 0, &mode_bytes)?;
    transport.send_frame(&reply).await?;
    Ok(())
}

async fn recv_ready_payload(transport: &mut Transport) -> Result<String, GbaLinkError> {
    loop {
        transport.fill_once().await?;
        let (frames, consumed) = try_decode_gba_frames(transport.unread())?;
        if let Some(frame) = frames.first() {
            if frame.cmd != GbaCmd::Ready {
                transport.consume(consumed);
                continue;
            }
            let end = frame.payload.iter().position(|&b| b == 0).unwrap_or(frame.payload.len());
            let mode = String::from_utf8_lossy(&frame.payload[..end]).into_owned();
            transport.consume(consumed);
            return Ok(mode);
        }
        transport.consume(consumed);
    }
}
