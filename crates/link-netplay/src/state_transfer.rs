//! Initial state transfer (spec §4.4): after the READY/ACK handshake, the
//! host streams its serialized core state to the client in bounded chunks
//! between a `STATE_HDR{size}` and a `STATE_ACK`, then both sides exchange
//! a final `READY`.

use link_proto::netplay::{NetplayCmd, NetplayFrameView};
use link_proto::{encode_netplay_frame, try_decode_netplay_frames};
use link_transport::{Transport, TransportError};
use tracing::debug;

use crate::constants::STATE_CHUNK_BYTES;

#[derive(Debug, thiserror::Error)]
pub enum StateTransferError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("host declared {declared} bytes of state but sent {received}")]
    SizeMismatch { declared: u32, received: u32 },

    #[error("expected {expected:?}, got a different command")]
    UnexpectedCommand { expected: NetplayCmd },
}

/// Host side: send `state`, wait for `STATE_ACK`, then send the final
/// `READY`.
pub async fn host_send_state(transport: &mut Transport, state: &[u8]) -> Result<(), StateTransferError> {
    let hdr = encode_netplay_frame(NetplayCmd::StateHdr, 0, &(state.len() as u32).to_be_bytes())
        .expect("4-byte payload always fits");
    transport.send_frame(&hdr).await?;

    for chunk in state.chunks(STATE_CHUNK_BYTES) {
        transport.send_frame(chunk).await?;
    }
    debug!(bytes = state.len(), "state sent, awaiting STATE_ACK");

    expect_command(transport, NetplayCmd::StateAck).await?;

    let ready = encode_netplay_frame(NetplayCmd::Ready, 0, &[]).expect("empty payload");
    transport.send_frame(&ready).await?;
    Ok(())
}

/// Client side: receive the header, receive exactly that many raw bytes,
/// ack, then await the host's final `READY`. Returns the received state.
pub async fn client_recv_state(transport: &mut Transport) -> Result<Vec<u8>, StateTransferError> {
    let declared = recv_state_hdr(transport).await?;

    let mut received = Vec::with_capacity(declared as usize);
    while received.len() < declared as usize {
        transport.fill_once().await?;
        let take = (declared as usize - received.len()).min(transport.unread().len());
        received.extend_from_slice(&transport.unread()[..take]);
        transport.consume(take);
    }

    if received.len() as u32 != declared {
        return Err(StateTransferError::SizeMismatch {
            declared,
            received: received.len() as u32,
        });
    }

    let ack = encode_netplay_frame(NetplayCmd::StateAck, 0, &[]).expect("empty payload");
    transport.send_frame(&ack).await?;

    expect_command(transport, NetplayCmd::Ready).await?;
    Ok(received)
}

async fn recv_state_hdr(transport: &mut Transport) -> Result<u32, StateTransferError> {
    loop {
        transport.fill_once().await?;
        let (frames, consumed) = try_decode_netplay_frames(transport.unread())?;
        if let Some(frame) = frames.first() {
            if frame.cmd != NetplayCmd::StateHdr {
                return Err(StateTransferError::UnexpectedCommand {
                    expected: NetplayCmd::StateHdr,
                });
            }
            let size = u32::from_be_bytes(frame.payload.try_into().unwrap_or([0; 4]));
            transport.consume(consumed);
            return Ok(size);
        }
        transport.consume(consumed);
    }
}

async fn expect_command(transport: &mut Transport, expected: NetplayCmd) -> Result<(), StateTransferError> {
    loop {
        transport.fill_once().await?;
        let (frames, consumed) = try_decode_netplay_frames(transport.unread())?;
        if let Some(frame) = frames.first() {
            let matched = frame_matches(frame, expected);
            transport.consume(consumed);
            return if matched {
                Ok(())
            } else {
                Err(StateTransferError::UnexpectedCommand { expected })
            };
        }
        transport.consume(consumed);
    }
}

fn frame_matches(frame: &NetplayFrameView<'_>, expected: NetplayCmd) -> bool {
    frame.cmd == expected
}
