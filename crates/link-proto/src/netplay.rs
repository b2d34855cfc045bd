use crate::constants::{MAX_NETPLAY_PAYLOAD, NETPLAY_HEADER_LEN};
use crate::error::ProtoError;

/// Netplay wire commands (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::FromRepr)]
#[repr(u8)]
pub enum NetplayCmd {
    Input = 0x01,
    StateHdr = 0x03,
    StateAck = 0x05,
    Disconnect = 0x08,
    Ready = 0x09,
    Pause = 0x0A,
    Resume = 0x0B,
    Keepalive = 0x0C,
    /// Reserved; never sent by this implementation, decoded for forward compat.
    Ping = 0x0D,
    /// Reserved; never sent by this implementation, decoded for forward compat.
    Pong = 0x0E,
}

impl NetplayCmd {
    pub fn from_byte(b: u8) -> Result<Self, ProtoError> {
        Self::from_repr(b).ok_or(ProtoError::UnknownCmd(b))
    }
}

/// One decoded netplay frame, borrowing its payload from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetplayFrameView<'a> {
    pub cmd: NetplayCmd,
    pub frame: u32,
    pub payload: &'a [u8],
}

/// Encode one netplay frame: `cmd:u8 || frame:u32(BE) || size:u16(BE) || payload`.
pub fn encode_netplay_frame(cmd: NetplayCmd, frame: u32, payload: &[u8]) -> Result<Vec<u8>, ProtoError> {
    if payload.len() > MAX_NETPLAY_PAYLOAD {
        return Err(ProtoError::PayloadTooLarge(payload.len(), MAX_NETPLAY_PAYLOAD));
    }
    let mut out = Vec::with_capacity(NETPLAY_HEADER_LEN + payload.len());
    out.push(cmd as u8);
    out.extend_from_slice(&frame.to_be_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Convenience: encode an `INPUT` frame carrying a `u16(BE)` button mask.
pub fn encode_input_frame(frame: u32, buttons: u16) -> Vec<u8> {
    encode_netplay_frame(NetplayCmd::Input, frame, &buttons.to_be_bytes())
        .expect("2-byte payload never exceeds MAX_NETPLAY_PAYLOAD")
}

/// Decode as many complete frames as possible from `buf`.
///
/// Returns the decoded views plus the number of bytes consumed from the
/// front of `buf`; the caller (normally [`link_transport`]'s `StreamBuffer`)
/// is responsible for retaining the unconsumed tail for the next call.
pub fn try_decode_netplay_frames(buf: &[u8]) -> Result<(Vec<NetplayFrameView<'_>>, usize), ProtoError> {
    let mut frames = Vec::new();
    let mut offset = 0usize;

    loop {
        if buf.len().saturating_sub(offset) < NETPLAY_HEADER_LEN {
            break;
        }
        let cmd_byte = buf[offset];
        let frame = u32::from_be_bytes(buf[offset + 1..offset + 5].try_into().unwrap());
        let size = u16::from_be_bytes(buf[offset + 5..offset + 7].try_into().unwrap()) as usize;

        if size > MAX_NETPLAY_PAYLOAD {
            return Err(ProtoError::SizeTooLarge(size, MAX_NETPLAY_PAYLOAD));
        }

        let total = NETPLAY_HEADER_LEN + size;
        if buf.len().saturating_sub(offset) < total {
            break;
        }

        let cmd = NetplayCmd::from_byte(cmd_byte)?;
        let payload = &buf[offset + NETPLAY_HEADER_LEN..offset + total];
        frames.push(NetplayFrameView { cmd, frame, payload });
        offset += total;
    }

    Ok((frames, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_frame_round_trips() {
        let bytes = encode_input_frame(42, 0xBEEF);
        let (frames, consumed) = try_decode_netplay_frames(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].cmd, NetplayCmd::Input);
        assert_eq!(frames[0].frame, 42);
        assert_eq!(u16::from_be_bytes(frames[0].payload.try_into().unwrap()), 0xBEEF);
    }

    #[test]
    fn partial_frame_is_not_consumed() {
        let bytes = encode_input_frame(1, 1);
        let (frames, consumed) = try_decode_netplay_frames(&bytes[..bytes.len() - 1]).unwrap();
        assert!(frames.is_empty());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn zero_payload_commands_round_trip() {
        for cmd in [
            NetplayCmd::Disconnect,
            NetplayCmd::Ready,
            NetplayCmd::Pause,
            NetplayCmd::Resume,
            NetplayCmd::Keepalive,
            NetplayCmd::StateAck,
        ] {
            let bytes = encode_netplay_frame(cmd, 7, &[]).unwrap();
            let (frames, _) = try_decode_netplay_frames(&bytes).unwrap();
            assert_eq!(frames[0].cmd, cmd);
            assert!(frames[0].payload.is_empty());
        }
    }

    #[test]
    fn state_hdr_carries_u32_size() {
        let bytes = encode_netplay_frame(NetplayCmd::StateHdr, 0, &500u32.to_be_bytes()).unwrap();
        let (frames, _) = try_decode_netplay_frames(&bytes).unwrap();
        let size = u32::from_be_bytes(frames[0].payload.try_into().unwrap());
        assert_eq!(size, 500);
    }

    #[test]
    fn two_frames_back_to_back_decode_in_order() {
        let mut bytes = encode_input_frame(1, 0x0001);
        bytes.extend(encode_input_frame(2, 0x0002));
        let (frames, consumed) = try_decode_netplay_frames(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].frame, 1);
        assert_eq!(frames[1].frame, 2);
    }

    #[test]
    fn unknown_cmd_byte_errors() {
        let mut bytes = encode_input_frame(1, 1);
        bytes[0] = 0xFF;
        assert!(try_decode_netplay_frames(&bytes).is_err());
    }

    proptest::proptest! {
        #[test]
        fn round_trip_any_input(frame: u32, buttons: u16) {
            let bytes = encode_input_frame(frame, buttons);
            let (frames, consumed) = try_decode_netplay_frames(&bytes).unwrap();
            proptest::prop_assert_eq!(consumed, bytes.len());
            proptest::prop_assert_eq!(frames[0].frame, frame);
            proptest::prop_assert_eq!(u16::from_be_bytes(frames[0].payload.try_into().unwrap()), buttons);
        }
    }
}
