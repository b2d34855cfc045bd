use std::net::IpAddr;
use std::time::Duration;

use rand::Rng;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::control::{NetworkControl, StationInfo, AP_DHCP_RANGE, AP_IP, AP_SUBNET_PREFIX};
use crate::error::NetworkError;

/// Prefix used to derive a hotspot SSID: `"<prefix><4 random chars>"`
/// (spec §4.6).
const HOTSPOT_SSID_PREFIX: &str = "NES-";

/// How long [`SystemNetworkControl::connect_station`] waits for a DHCP
/// lease before giving up (spec §7: "DHCP acquisition (≤ 10s polling)").
const DHCP_POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives the on-device Wi-Fi stack via `wpa_cli` (station), `hostapd` +
/// `udhcpd` (access point), exactly as the spec treats them: opaque
/// external processes, not reimplemented here.
pub struct SystemNetworkControl {
    station_iface: String,
    ap_iface: String,
}

impl SystemNetworkControl {
    pub fn new(station_iface: impl Into<String>, ap_iface: impl Into<String>) -> Self {
        Self {
            station_iface: station_iface.into(),
            ap_iface: ap_iface.into(),
        }
    }

    /// `"<prefix><4 random chars>"`, matching the spec's derivation rule.
    pub fn derive_hotspot_ssid() -> String {
        const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::rng();
        let suffix: String = (0..4)
            .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
            .collect();
        format!("{HOTSPOT_SSID_PREFIX}{suffix}")
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<String, NetworkError> {
        debug!(program, ?args, "running network control command");
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(NetworkError::Io)?;
        if !output.status.success() {
            return Err(NetworkError::Command(format!(
                "{program} {args:?} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl NetworkControl for SystemNetworkControl {
    async fn ensure_station_ready(&self) -> Result<(), NetworkError> {
        self.run("wpa_cli", &["-i", &self.station_iface, "status"]).await?;
        Ok(())
    }

    async fn scan_stations(&self) -> Result<Vec<StationInfo>, NetworkError> {
        self.run("wpa_cli", &["-i", &self.station_iface, "scan"]).await?;
        let out = self
            .run("wpa_cli", &["-i", &self.station_iface, "scan_results"])
            .await?;
        Ok(parse_scan_results(&out))
    }

    async fn connect_station(&self, ssid: &str, password: Option<&str>) -> Result<(), NetworkError> {
        let net_id = self
            .run("wpa_cli", &["-i", &self.station_iface, "add_network"])
            .await?
            .trim()
            .to_string();
        self.run(
            "wpa_cli",
            &["-i", &self.station_iface, "set_network", &net_id, "ssid", &format!("\"{ssid}\"")],
        )
        .await?;
        if let Some(psk) = password {
            self.run(
                "wpa_cli",
                &["-i", &self.station_iface, "set_network", &net_id, "psk", &format!("\"{psk}\"")],
            )
            .await?;
        } else {
            self.run("wpa_cli", &["-i", &self.station_iface, "set_network", &net_id, "key_mgmt", "NONE"])
                .await?;
        }
        self.run("wpa_cli", &["-i", &self.station_iface, "enable_network", &net_id])
            .await
            .map_err(|e| NetworkError::StationConnectFailed {
                ssid: ssid.to_string(),
                reason: e.to_string(),
            })?;

        wait_for_dhcp_lease(&self.station_iface).await
    }

    async fn disconnect_station(&self) -> Result<(), NetworkError> {
        self.run("wpa_cli", &["-i", &self.station_iface, "disconnect"]).await?;
        Ok(())
    }

    async fn forget_station(&self, ssid: &str) -> Result<(), NetworkError> {
        let list = self.run("wpa_cli", &["-i", &self.station_iface, "list_networks"]).await?;
        for line in list.lines().skip(1) {
            let mut fields = line.split('\t');
            let (Some(id), Some(name)) = (fields.next(), fields.next()) else {
                continue;
            };
            if name == ssid {
                self.run("wpa_cli", &["-i", &self.station_iface, "remove_network", id]).await?;
            }
        }
        Ok(())
    }

    async fn get_local_ip(&self) -> Result<IpAddr, NetworkError> {
        let ifaces = if_addrs::get_if_addrs()?;
        ifaces
            .into_iter()
            .find(|a| a.name == self.station_iface && !a.is_loopback())
            .map(|a| a.ip())
            .ok_or(NetworkError::NoInterface)
    }

    async fn start_ap(&self, ssid: &str, password: &str) -> Result<(), NetworkError> {
        self.run(
            "hostapd_cli",
            &["-i", &self.ap_iface, "set", "ssid", ssid],
        )
        .await
        .map_err(|e| NetworkError::ApStartFailed {
            ssid: ssid.to_string(),
            reason: e.to_string(),
        })?;
        self.run("hostapd_cli", &["-i", &self.ap_iface, "set", "wpa_passphrase", password])
            .await
            .map_err(|e| NetworkError::ApStartFailed {
                ssid: ssid.to_string(),
                reason: e.to_string(),
            })?;
        self.run(
            "ip",
            &["addr", "add", &format!("{AP_IP}/{AP_SUBNET_PREFIX}"), "dev", &self.ap_iface],
        )
        .await?;
        self.run(
            "udhcpd",
            &["-S", "-I", &format!("{}", AP_DHCP_RANGE.0), "-r", &format!("{}", AP_DHCP_RANGE.1)],
        )
        .await?;
        Ok(())
    }

    async fn stop_ap(&self) -> Result<(), NetworkError> {
        // Matches the spec's stance on the source's `system("killall …")`:
        // model this opaquely rather than replicating the race (spec §9).
        self.run("hostapd_cli", &["-i", &self.ap_iface, "disable"]).await?;
        Ok(())
    }

    async fn save_current_station(&self) -> Result<Option<String>, NetworkError> {
        let status = self.run("wpa_cli", &["-i", &self.station_iface, "status"]).await?;
        Ok(status.lines().find_map(|l| l.strip_prefix("ssid=").map(str::to_string)))
    }

    async fn restore_saved_station(&self, ssid: Option<&str>) -> Result<(), NetworkError> {
        let Some(ssid) = ssid else {
            return Ok(());
        };
        match self.connect_station(ssid, None).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(ssid, error = %e, "failed to restore prior station connection");
                Err(e)
            }
        }
    }
}

fn parse_scan_results(out: &str) -> Vec<StationInfo> {
    // `wpa_cli scan_results` header: "bssid / frequency / signal level / flags / ssid"
    out.lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let _bssid = fields.next()?;
            let _freq = fields.next()?;
            let rssi: i32 = fields.next()?.parse().ok()?;
            let flags = fields.next().unwrap_or("");
            let ssid = fields.next().unwrap_or("").to_string();
            if ssid.is_empty() {
                return None;
            }
            Some(StationInfo {
                ssid,
                rssi,
                secured: flags.contains("WPA") || flags.contains("WEP"),
                have_creds: false,
            })
        })
        .collect()
}

async fn wait_for_dhcp_lease(iface: &str) -> Result<(), NetworkError> {
    let deadline = tokio::time::Instant::now() + DHCP_POLL_TIMEOUT;
    loop {
        if let Ok(ifaces) = if_addrs::get_if_addrs() {
            if ifaces.iter().any(|a| a.name == iface && !a.is_loopback()) {
                return Ok(());
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(NetworkError::DhcpTimeout(DHCP_POLL_TIMEOUT));
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_hotspot_ssid_has_expected_shape() {
        let ssid = SystemNetworkControl::derive_hotspot_ssid();
        assert!(ssid.starts_with(HOTSPOT_SSID_PREFIX));
        assert_eq!(ssid.len(), HOTSPOT_SSID_PREFIX.len() + 4);
    }

    #[test]
    fn scan_results_parse_ssid_and_rssi() {
        let raw = "bssid\tfrequency\tsignal level\tflags\tssid\n\
                    00:11:22:33:44:55\t2412\t-45\t[WPA2-PSK-CCMP][ESS]\tHomeWifi\n";
        let parsed = parse_scan_results(raw);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].ssid, "HomeWifi");
        assert_eq!(parsed[0].rssi, -45);
        assert!(parsed[0].secured);
    }
}
