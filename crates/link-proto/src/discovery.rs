use crate::constants::{DISCOVERY_RECORD_LEN, GAME_NAME_LEN, LINK_MODE_LEN, VERSION};
use crate::error::ProtoError;

/// Advertisement / host-table entry, fixed wire layout, big-endian numerics.
///
/// Wire layout (offsets in bytes):
/// - `0..4`   magic (u32 BE) — see [`crate::constants::magic`]
/// - `4..8`   protocol_version (u32 BE)
/// - `8..12`  game_crc (u32 BE)
/// - `12..14` port (u16 BE)
/// - `14..78` game_name (64 bytes, nul-padded ASCII)
/// - `78..110` link_mode (32 bytes, nul-padded ASCII; empty for Netplay/GB)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    pub magic: u32,
    pub protocol_version: u32,
    pub game_crc: u32,
    pub port: u16,
    pub game_name: String,
    pub link_mode: String,
}

impl DiscoveryRecord {
    pub const LEN: usize = DISCOVERY_RECORD_LEN;

    pub fn new(magic: u32, game_crc: u32, port: u16, game_name: &str, link_mode: &str) -> Self {
        Self {
            magic,
            protocol_version: VERSION,
            game_crc,
            port,
            game_name: truncate(game_name, GAME_NAME_LEN),
            link_mode: truncate(link_mode, LINK_MODE_LEN),
        }
    }

    pub fn encode(&self) -> [u8; DISCOVERY_RECORD_LEN] {
        let mut out = [0u8; DISCOVERY_RECORD_LEN];
        out[0..4].copy_from_slice(&self.magic.to_be_bytes());
        out[4..8].copy_from_slice(&self.protocol_version.to_be_bytes());
        out[8..12].copy_from_slice(&self.game_crc.to_be_bytes());
        out[12..14].copy_from_slice(&self.port.to_be_bytes());
        write_padded(&mut out[14..14 + GAME_NAME_LEN], &self.game_name);
        write_padded(
            &mut out[14 + GAME_NAME_LEN..14 + GAME_NAME_LEN + LINK_MODE_LEN],
            &self.link_mode,
        );
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        if buf.len() < DISCOVERY_RECORD_LEN {
            return Err(ProtoError::TooShort);
        }
        let magic = u32::from_be_bytes(buf[0..4].try_into().unwrap());
        let protocol_version = u32::from_be_bytes(buf[4..8].try_into().unwrap());
        let game_crc = u32::from_be_bytes(buf[8..12].try_into().unwrap());
        let port = u16::from_be_bytes(buf[12..14].try_into().unwrap());
        let game_name = read_padded(&buf[14..14 + GAME_NAME_LEN])?;
        let link_mode = read_padded(&buf[14 + GAME_NAME_LEN..14 + GAME_NAME_LEN + LINK_MODE_LEN])?;

        Ok(Self {
            magic,
            protocol_version,
            game_crc,
            port,
            game_name,
            link_mode,
        })
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        s[..max].to_string()
    } else {
        s.to_string()
    }
}

fn write_padded(dst: &mut [u8], s: &str) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(dst.len());
    dst[..n].copy_from_slice(&bytes[..n]);
    // Remaining bytes are already zero (nul padding).
}

fn read_padded(src: &[u8]) -> Result<String, ProtoError> {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    std::str::from_utf8(&src[..end])
        .map(|s| s.to_string())
        .map_err(|_| ProtoError::BadString)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::magic;

    #[test]
    fn round_trip_preserves_fields() {
        let rec = DiscoveryRecord::new(magic::GBA_ADV, 0xDEAD_BEEF, 55435, "Foo", "mul_poke");
        let encoded = rec.encode();
        assert_eq!(encoded.len(), DiscoveryRecord::LEN);
        let decoded = DiscoveryRecord::decode(&encoded).unwrap();
        assert_eq!(decoded, rec);
    }

    #[test]
    fn empty_link_mode_round_trips_for_netplay() {
        let rec = DiscoveryRecord::new(magic::NETPLAY_ADV, 1, 1, "Foo", "");
        let decoded = DiscoveryRecord::decode(&rec.encode()).unwrap();
        assert_eq!(decoded.link_mode, "");
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let rec = DiscoveryRecord::new(magic::NETPLAY_ADV, 1, 1, "Foo", "");
        let encoded = rec.encode();
        assert!(DiscoveryRecord::decode(&encoded[..DiscoveryRecord::LEN - 1]).is_err());
    }

    #[test]
    fn long_names_are_truncated_not_panicked() {
        let long = "x".repeat(200);
        let rec = DiscoveryRecord::new(magic::NETPLAY_ADV, 1, 1, &long, &long);
        let encoded = rec.encode();
        let decoded = DiscoveryRecord::decode(&encoded).unwrap();
        assert_eq!(decoded.game_name.len(), GAME_NAME_LEN);
        assert_eq!(decoded.link_mode.len(), LINK_MODE_LEN);
    }
}
