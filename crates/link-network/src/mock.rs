use std::net::IpAddr;
use std::sync::Mutex;

use crate::control::{NetworkControl, StationInfo};
use crate::error::NetworkError;

/// In-memory [`NetworkControl`] fake for session/orchestrator tests — never
/// shells out, records calls so tests can assert on ordering (e.g. the
/// "capture then clear" hotspot-teardown rule, spec §9).
#[derive(Default)]
pub struct MockNetworkControl {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    station_ssid: Option<String>,
    ap_up: Option<(String, String)>,
    forgotten: Vec<String>,
    local_ip: Option<IpAddr>,
    calls: Vec<&'static str>,
}

impl MockNetworkControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_station(ssid: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state.lock().expect("mock lock").station_ssid = Some(ssid.into());
        mock
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().expect("mock lock").calls.clone()
    }

    pub fn forgotten_ssids(&self) -> Vec<String> {
        self.state.lock().expect("mock lock").forgotten.clone()
    }

    pub fn ap_is_up(&self) -> bool {
        self.state.lock().expect("mock lock").ap_up.is_some()
    }
}

impl NetworkControl for MockNetworkControl {
    async fn ensure_station_ready(&self) -> Result<(), NetworkError> {
        self.state.lock().expect("mock lock").calls.push("ensure_station_ready");
        Ok(())
    }

    async fn scan_stations(&self) -> Result<Vec<StationInfo>, NetworkError> {
        self.state.lock().expect("mock lock").calls.push("scan_stations");
        Ok(Vec::new())
    }

    async fn connect_station(&self, ssid: &str, _password: Option<&str>) -> Result<(), NetworkError> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push("connect_station");
        state.station_ssid = Some(ssid.to_string());
        Ok(())
    }

    async fn disconnect_station(&self) -> Result<(), NetworkError> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push("disconnect_station");
        state.station_ssid = None;
        Ok(())
    }

    async fn forget_station(&self, ssid: &str) -> Result<(), NetworkError> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push("forget_station");
        state.forgotten.push(ssid.to_string());
        Ok(())
    }

    async fn get_local_ip(&self) -> Result<IpAddr, NetworkError> {
        self.state
            .lock()
            .expect("mock lock")
            .local_ip
            .ok_or(NetworkError::NoInterface)
    }

    async fn start_ap(&self, ssid: &str, password: &str) -> Result<(), NetworkError> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push("start_ap");
        state.ap_up = Some((ssid.to_string(), password.to_string()));
        Ok(())
    }

    async fn stop_ap(&self) -> Result<(), NetworkError> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push("stop_ap");
        state.ap_up = None;
        Ok(())
    }

    async fn save_current_station(&self) -> Result<Option<String>, NetworkError> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push("save_current_station");
        Ok(state.station_ssid.clone())
    }

    async fn restore_saved_station(&self, ssid: Option<&str>) -> Result<(), NetworkError> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push("restore_saved_station");
        state.station_ssid = ssid.map(str::to_string);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_call_order() {
        let mock = MockNetworkControl::with_station("HomeWifi");
        mock.start_ap("NES-ab12", "password123").await.unwrap();
        mock.stop_ap().await.unwrap();
        assert_eq!(mock.calls(), vec!["start_ap", "stop_ap"]);
    }
}
