use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("station scan returned no interfaces")]
    NoInterface,

    #[error("station connect to {ssid:?} failed: {reason}")]
    StationConnectFailed { ssid: String, reason: String },

    #[error("access point {ssid:?} failed to start: {reason}")]
    ApStartFailed { ssid: String, reason: String },

    #[error("DHCP lease not acquired within {0:?}")]
    DhcpTimeout(std::time::Duration),

    #[error("underlying network command failed: {0}")]
    Command(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
