/// Which physical Wi-Fi role the device is currently playing (spec §3,
/// §4.6). Station mode (`wlan0`) carries the device's normal LAN
/// connection; Hotspot mode (`wlan1`) is brought up only for the lifetime
/// of a link session that chose to host its own access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerNetwork {
    None,
    Station {
        ssid: Option<String>,
    },
    Hotspot {
        ssid: String,
        password: String,
        /// SSID captured from the prior `Station` state when this hotspot
        /// was entered (spec §3 invariant), so leaving the session can
        /// restore it. `None` if the device wasn't on any station network.
        prior_ssid: Option<String>,
    },
}

impl PeerNetwork {
    /// Enter hotspot mode from whatever the current network is, capturing
    /// the current station SSID (if any) so it can be restored on exit.
    pub fn enter_hotspot(self, ssid: String, password: String) -> Self {
        let prior_ssid = match self {
            PeerNetwork::Station { ssid } => ssid,
            PeerNetwork::None | PeerNetwork::Hotspot { .. } => None,
        };
        PeerNetwork::Hotspot { ssid, password, prior_ssid }
    }

    pub fn is_hotspot(&self) -> bool {
        matches!(self, PeerNetwork::Hotspot { .. })
    }

    /// SSID to restore on teardown, consuming the hotspot state.
    pub fn prior_ssid(&self) -> Option<&str> {
        match self {
            PeerNetwork::Hotspot { prior_ssid, .. } => prior_ssid.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_hotspot_captures_prior_station_ssid() {
        let station = PeerNetwork::Station { ssid: Some("HomeWifi".into()) };
        let hotspot = station.enter_hotspot("NES-ab12".into(), "password123".into());
        assert_eq!(hotspot.prior_ssid(), Some("HomeWifi"));
        assert!(hotspot.is_hotspot());
    }

    #[test]
    fn entering_hotspot_with_no_prior_station_has_nothing_to_restore() {
        let hotspot = PeerNetwork::None.enter_hotspot("NES-cd34".into(), "password123".into());
        assert_eq!(hotspot.prior_ssid(), None);
    }
}
