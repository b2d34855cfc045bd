//! Netplay connect handshake (spec §4.3.1 — same shape as the GBA-link
//! handshake but without a `link_mode` payload: netplay has no concept of
//! "incompatible modes", only "connected").

use link_proto::netplay::NetplayCmd;
use link_proto::{encode_netplay_frame, try_decode_netplay_frames};
use link_session::constants::READY_TIMEOUT;
use link_session::SessionError;
use link_transport::Transport;

pub async fn client_handshake(transport: &mut Transport) -> Result<(), SessionError> {
    let ready = encode_netplay_frame(NetplayCmd::Ready, 0, &[]).expect("empty payload");
    transport.send_frame(&ready).await?;
    wait_for_ready(transport).await
}

pub async fn host_handshake(transport: &mut Transport) -> Result<(), SessionError> {
    let wait = wait_for_ready(transport);
    if tokio::time::timeout(READY_TIMEOUT, wait).await.is_err() {
        let disconnect = encode_netplay_frame(NetplayCmd::Disconnect, 0, &[]).expect("empty payload");
        transport.send_frame(&disconnect).await.ok();
        return Err(SessionError::HandshakeTimeout(READY_TIMEOUT));
    }
    let ready = encode_netplay_frame(NetplayCmd::Ready, 0, &[]).expect("empty payload");
    transport.send_frame(&ready).await?;
    Ok(())
}

async fn wait_for_ready(transport: &mut Transport) -> Result<(), SessionError> {
    loop {
        transport.fill_once().await?;
        let (frames, consumed) = try_decode_netplay_frames(transport.unread())?;
        if let Some(frame) = frames.first() {
            let matched = frame.cmd == NetplayCmd::Ready;
            transport.consume(consumed);
            if matched {
                return Ok(());
            }
        } else {
            transport.consume(consumed);
        }
    }
}
