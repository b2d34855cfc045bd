//! Wire-level constants shared by all three link modes.
//!
//! Every numeric field on the wire is big-endian; see [`crate::discovery`],
//! [`crate::netplay`] and [`crate::gba`] for the frame layouts themselves.

/// Wire-format protocol version. Bump only for breaking header changes.
pub const VERSION: u32 = 1;

/// Fixed length of [`crate::discovery::DiscoveryRecord::game_name`].
pub const GAME_NAME_LEN: usize = 64;

/// Fixed length of [`crate::discovery::DiscoveryRecord::link_mode`].
pub const LINK_MODE_LEN: usize = 32;

/// On-wire length of a [`crate::discovery::DiscoveryRecord`].
pub const DISCOVERY_RECORD_LEN: usize =
    4 + 4 + 4 + 2 + GAME_NAME_LEN + LINK_MODE_LEN;

/// Netplay frame header: `cmd:u8 || frame:u32(BE) || size:u16(BE)`.
pub const NETPLAY_HEADER_LEN: usize = 1 + 4 + 2;

/// GBA link frame header: `cmd:u8 || size:u16(BE) || client_id:u16(BE)`.
pub const GBA_HEADER_LEN: usize = 1 + 2 + 2;

/// Maximum netplay payload: a `u16` button mask is 2 bytes, but `STATE_HDR`
/// and state-transfer chunks need room for a `u32` size and up to 4 KiB
/// chunks (see FrameSync state transfer, spec §4.4).
pub const MAX_NETPLAY_PAYLOAD: usize = 4096;

/// Maximum GBA link payload: one SIO_DATA packet plus the READY handshake's
/// nul-padded link-mode string.
pub const MAX_GBA_PAYLOAD: usize = 2048;

/// UDP datagrams this stays well under typical path MTU.
pub const MAX_DISCOVERY_DATAGRAM: usize = DISCOVERY_RECORD_LEN + 16;

/// Discovery magic values, per mode and per direction.
///
/// Advertisement and query/response magics are distinct so a listener can
/// immediately distinguish "someone is hosting" from "someone is asking".
pub mod magic {
    /// Netplay host broadcasting `Waiting`.
    pub const NETPLAY_ADV: u32 = 0x4E50_4100; // "NPA\0"
    pub const NETPLAY_QUERY: u32 = 0x4E50_5100; // "NPQ\0"
    pub const NETPLAY_RESPONSE: u32 = 0x4E50_5200; // "NPR\0"

    /// GBA wireless-adapter link.
    pub const GBA_ADV: u32 = 0x4742_4100; // "GBA\0"
    pub const GBA_QUERY: u32 = 0x4742_5100; // "GBQ\0"
    pub const GBA_RESPONSE: u32 = 0x4742_5200; // "GBR\0"

    /// GB link-cable control-plane (advertised purely for the UI's host list;
    /// the actual link-cable TCP is owned by the GB core itself).
    pub const GBL_ADV: u32 = 0x4742_4C00; // "GBL\0"
    pub const GBL_QUERY: u32 = 0x4742_4C51; // "GBLQ"
    pub const GBL_RESPONSE: u32 = 0x4742_4C52; // "GBLR"
}

/// UDP discovery ports, one per mode so the three link types never cross
/// streams on a shared network.
pub mod port {
    pub const NETPLAY_DISCOVERY: u16 = 55_435;
    pub const GBA_DISCOVERY: u16 = 55_436;
    pub const GBL_DISCOVERY: u16 = 55_437;
}

/// Which link mode a [`crate::discovery::DiscoveryRecord`] advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum LinkKind {
    Netplay,
    GbaLink,
    GbLink,
}

impl LinkKind {
    /// Discovery port for this mode.
    pub const fn discovery_port(self) -> u16 {
        match self {
            LinkKind::Netplay => port::NETPLAY_DISCOVERY,
            LinkKind::GbaLink => port::GBA_DISCOVERY,
            LinkKind::GbLink => port::GBL_DISCOVERY,
        }
    }

    /// `(advertise, query, response)` magic triple for this mode.
    pub const fn magics(self) -> (u32, u32, u32) {
        match self {
            LinkKind::Netplay => (magic::NETPLAY_ADV, magic::NETPLAY_QUERY, magic::NETPLAY_RESPONSE),
            LinkKind::GbaLink => (magic::GBA_ADV, magic::GBA_QUERY, magic::GBA_RESPONSE),
            LinkKind::GbLink => (magic::GBL_ADV, magic::GBL_QUERY, magic::GBL_RESPONSE),
        }
    }
}
