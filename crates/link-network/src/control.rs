use crate::error::NetworkError;

/// One Wi-Fi station visible to a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationInfo {
    pub ssid: String,
    pub rssi: i32,
    pub secured: bool,
    pub have_creds: bool,
}

/// The Wi-Fi station/AP/DHCP collaborator, explicitly out of scope for this
/// crate's own logic (spec §1, §6) — `wpa_cli`, `hostapd`, and `udhcpd` are
/// real processes on the target device; this trait is the seam a session
/// orchestrator programs against without caring how they're driven.
///
/// [`SystemNetworkControl`] is the real implementation; tests use an
/// in-memory fake instead of shelling out.
pub trait NetworkControl: Send + Sync {
    /// Bring the station interface up and associated, if it isn't already.
    async fn ensure_station_ready(&self) -> Result<(), NetworkError>;

    async fn scan_stations(&self) -> Result<Vec<StationInfo>, NetworkError>;

    async fn connect_station(&self, ssid: &str, password: Option<&str>) -> Result<(), NetworkError>;

    async fn disconnect_station(&self) -> Result<(), NetworkError>;

    /// Remove a saved network profile so the device doesn't autoreconnect
    /// to it (spec §4.6 — used on a client that joined a host's hotspot).
    async fn forget_station(&self, ssid: &str) -> Result<(), NetworkError>;

    async fn get_local_ip(&self) -> Result<std::net::IpAddr, NetworkError>;

    /// Bring up an access point. Per spec §6 the AP IP is always fixed
    /// (`10.0.0.1`, subnet `10.0.0.0/24`, DHCP range `10.0.0.10..50`); the
    /// implementation, not the caller, owns that constant.
    async fn start_ap(&self, ssid: &str, password: &str) -> Result<(), NetworkError>;

    async fn stop_ap(&self) -> Result<(), NetworkError>;

    /// Snapshot the currently-associated station SSID for later restore.
    async fn save_current_station(&self) -> Result<Option<String>, NetworkError>;

    async fn restore_saved_station(&self, ssid: Option<&str>) -> Result<(), NetworkError>;
}

/// Fixed AP parameters (spec §6).
pub const AP_IP: std::net::Ipv4Addr = std::net::Ipv4Addr::new(10, 0, 0, 1);
pub const AP_SUBNET_PREFIX: u8 = 24;
pub const AP_DHCP_RANGE: (std::net::Ipv4Addr, std::net::Ipv4Addr) = (
    std::net::Ipv4Addr::new(10, 0, 0, 10),
    std::net::Ipv4Addr::new(10, 0, 0, 50),
);
