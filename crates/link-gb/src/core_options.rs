use std::net::IpAddr;

use crate::error::GbLinkError;

/// GB link-cable mode, as configured through the core's own option set —
/// this crate never opens a socket for link-cable traffic itself (spec
/// §1, "GB Link — a pure control-plane").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GbLinkMode {
    Server,
    Client,
}

impl GbLinkMode {
    fn as_option_value(self) -> &'static str {
        match self {
            GbLinkMode::Server => "server",
            GbLinkMode::Client => "client",
        }
    }
}

/// The core's option-write surface (spec §6: "UI calls the core only
/// through the session API"; here the session API's only real job for GB
/// link is writing these three options and then letting the core's
/// embedded TCP client/server do the rest).
pub trait CoreOptionWriter: Send + Sync {
    fn set_option(&self, key: &str, value: &str) -> Result<(), GbLinkError>;
}

pub const OPT_MODE: &str = "gb_link_mode";
pub const OPT_PEER_IP: &str = "gb_link_peer_ip";
pub const OPT_PEER_PORT: &str = "gb_link_peer_port";

/// Write the mode + peer IP + port sequence (spec §4 data flow: "UI
/// writes core options; core opens its own TCP"). Order matters for cores
/// that re-read the peer address only on a mode transition, so `mode` is
/// written last.
pub fn configure(
    writer: &impl CoreOptionWriter,
    peer_ip: Option<IpAddr>,
    peer_port: u16,
    mode: GbLinkMode,
) -> Result<(), GbLinkError> {
    if let Some(ip) = peer_ip {
        writer.set_option(OPT_PEER_IP, &ip.to_string())?;
    }
    writer.set_option(OPT_PEER_PORT, &peer_port.to_string())?;
    writer.set_option(OPT_MODE, mode.as_option_value())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingWriter {
        writes: Mutex<Vec<(String, String)>>,
    }

    impl CoreOptionWriter for RecordingWriter {
        fn set_option(&self, key: &str, value: &str) -> Result<(), GbLinkError> {
            self.writes.lock().unwrap().push((key.to_string(), value.to_string()));
            Ok(())
        }
    }

    #[test]
    fn mode_is_written_last_so_the_peer_address_is_already_set() {
        let writer = RecordingWriter::default();
        configure(&writer, Some("10.0.0.1".parse().unwrap()), 55437, GbLinkMode::Client).unwrap();
        let writes = writer.writes.lock().unwrap();
        assert_eq!(writes.last().unwrap().0, OPT_MODE);
    }

    #[test]
    fn server_mode_never_writes_a_peer_ip() {
        let writer = RecordingWriter::default();
        configure(&writer, None, 55437, GbLinkMode::Server).unwrap();
        let writes = writer.writes.lock().unwrap();
        assert!(!writes.iter().any(|(k, _)| k == OPT_PEER_IP));
    }
}
