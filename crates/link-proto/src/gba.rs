use crate::constants::{GBA_HEADER_LEN, MAX_GBA_PAYLOAD};
use crate::error::ProtoError;

/// GBA Link (wireless adapter relay) wire commands (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::FromRepr)]
#[repr(u8)]
pub enum GbaCmd {
    SioData = 0x01,
    Disconnect = 0x04,
    Ready = 0x05,
    Heartbeat = 0x06,
    /// Reserved; never sent by this implementation, decoded for forward compat.
    Ping = 0x07,
    /// Reserved; never sent by this implementation, decoded for forward compat.
    Pong = 0x08,
}

impl GbaCmd {
    pub fn from_byte(b: u8) -> Result<Self, ProtoError> {
        Self::from_repr(b).ok_or(ProtoError::UnknownCmd(b))
    }
}

/// One decoded GBA link frame, borrowing its payload from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GbaFrameView<'a> {
    pub cmd: GbaCmd,
    pub client_id: u16,
    pub payload: &'a [u8],
}

/// Encode one GBA link frame: `cmd:u8 || size:u16(BE) || client_id:u16(BE) || payload`.
pub fn encode_gba_frame(cmd: GbaCmd, client_id: u16, payload: &[u8]) -> Result<Vec<u8>, ProtoError> {
    if payload.len() > MAX_GBA_PAYLOAD {
        return Err(ProtoError::PayloadTooLarge(payload.len(), MAX_GBA_PAYLOAD));
    }
    let mut out = Vec::with_capacity(GBA_HEADER_LEN + payload.len());
    out.push(cmd as u8);
    out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    out.extend_from_slice(&client_id.to_be_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Convenience: one SIO_DATA frame carrying the 16-bit value exchanged each
/// link-cable tick.
pub fn encode_sio_data_frame(client_id: u16, value: u16) -> Vec<u8> {
    encode_gba_frame(GbaCmd::SioData, client_id, &value.to_be_bytes())
        .expect("2-byte payload never exceeds MAX_GBA_PAYLOAD")
}

/// Decode as many complete frames as possible from `buf`.
///
/// Returns the decoded views plus the number of bytes consumed from the
/// front of `buf`, mirroring [`crate::netplay::try_decode_netplay_frames`].
pub fn try_decode_gba_frames(buf: &[u8]) -> Result<(Vec<GbaFrameView<'_>>, usize), ProtoError> {
    let mut frames = Vec::new();
    let mut offset = 0usize;

    loop {
        if buf.len().saturating_sub(offset) < GBA_HEADER_LEN {
            break;
        }
        let cmd_byte = buf[offset];
        let size = u16::from_be_bytes(buf[offset + 1..offset + 3].try_into().unwrap()) as usize;
        let client_id = u16::from_be_bytes(buf[offset + 3..offset + 5].try_into().unwrap());

        if size > MAX_GBA_PAYLOAD {
            return Err(ProtoError::SizeTooLarge(size, MAX_GBA_PAYLOAD));
        }

        let total = GBA_HEADER_LEN + size;
        if buf.len().saturating_sub(offset) < total {
            break;
        }

        let cmd = GbaCmd::from_byte(cmd_byte)?;
        let payload = &buf[offset + GBA_HEADER_LEN..offset + total];
        frames.push(GbaFrameView { cmd, client_id, payload });
        offset += total;
    }

    Ok((frames, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sio_data_round_trips() {
        let bytes = encode_sio_data_frame(2, 0x1234);
        let (frames, consumed) = try_decode_gba_frames(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(frames[0].cmd, GbaCmd::SioData);
        assert_eq!(frames[0].client_id, 2);
        assert_eq!(u16::from_be_bytes(frames[0].payload.try_into().unwrap()), 0x1234);
    }

    #[test]
    fn heartbeat_has_no_payload() {
        let bytes = encode_gba_frame(GbaCmd::Heartbeat, 1, &[]).unwrap();
        let (frames, _) = try_decode_gba_frames(&bytes).unwrap();
        assert_eq!(frames[0].cmd, GbaCmd::Heartbeat);
        assert!(frames[0].payload.is_empty());
    }

    #[test]
    fn ready_frame_carries_link_mode_string() {
        let bytes = encode_gba_frame(GbaCmd::Ready, 1, b"mul_poke").unwrap();
        let (frames, _) = try_decode_gba_frames(&bytes).unwrap();
        assert_eq!(frames[0].payload, b"mul_poke");
    }

    #[test]
    fn partial_frame_is_not_consumed() {
        let bytes = encode_sio_data_frame(1, 1);
        let (frames, consumed) = try_decode_gba_frames(&bytes[..bytes.len() - 1]).unwrap();
        assert!(frames.is_empty());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn oversized_payload_is_rejected_at_encode() {
        let payload = vec![0u8; MAX_GBA_PAYLOAD + 1];
        assert!(encode_gba_frame(GbaCmd::SioData, 1, &payload).is_err());
    }

    #[test]
    fn unknown_cmd_byte_errors() {
        let mut bytes = encode_sio_data_frame(1, 1);
        bytes[0] = 0xEE;
        assert!(try_decode_gba_frames(&bytes).is_err());
    }

    proptest::proptest! {
        #[test]
        fn round_trip_any_sio_data(client_id: u16, value: u16) {
            let bytes = encode_sio_data_frame(client_id, value);
            let (frames, consumed) = try_decode_gba_frames(&bytes).unwrap();
            proptest::prop_assert_eq!(consumed, bytes.len());
            proptest::prop_assert_eq!(frames[0].client_id, client_id);
            proptest::prop_assert_eq!(u16::from_be_bytes(frames[0].payload.try_into().unwrap()), value);
        }
    }
}
