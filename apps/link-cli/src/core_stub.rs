//! Stand-in core collaborators for this demonstration harness (spec §9,
//! "Callback interop with the emulator core"): this CLI never touches a
//! real emulator core, so it supplies the minimal implementations that
//! let the session types run end-to-end and log what a real core would
//! have done.

use link_gb::core_options::CoreOptionWriter;
use link_gb::GbLinkError;
use link_gba::{BridgeHandle, CoreCallbacks};
use tracing::info;

pub struct LoggingCoreCallbacks;

impl CoreCallbacks for LoggingCoreCallbacks {
    fn start(&self, client_id: u16, _handle: BridgeHandle) {
        info!(client_id, "core callback: start");
    }

    fn stop(&self) {
        info!("core callback: stop");
    }

    fn receive(&self, buf: &[u8], remote_client_id: u16) {
        info!(bytes = buf.len(), remote_client_id, "core callback: receive");
    }

    fn connected(&self, remote_client_id: u16) {
        info!(remote_client_id, "core callback: connected");
    }

    fn disconnected(&self) {
        info!("core callback: disconnected");
    }
}

pub struct LoggingOptionWriter;

impl CoreOptionWriter for LoggingOptionWriter {
    fn set_option(&self, key: &str, value: &str) -> Result<(), GbLinkError> {
        info!(key, value, "core option write");
        Ok(())
    }
}
