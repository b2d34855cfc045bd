use std::sync::mpsc as std_mpsc;

/// Functions the bridge hands the core at [`CoreCallbacks::start`] time
/// (spec §4.5 step 1, §6 "interface to emulator core").
///
/// These are synchronous, non-blocking handles suitable for calling from
/// the core's own (non-async) emulation loop: `send` enqueues onto a
/// channel the bridge's async task drains into [`link_transport::Transport`];
/// `poll_receive` is a synonym for the bridge's main poll and is exposed so
/// a core that drives its own timing can ask "is there anything for me"
/// without waiting for the bridge's frame tick.
#[derive(Clone)]
pub struct BridgeHandle {
    outbound: std_mpsc::Sender<Vec<u8>>,
}

impl BridgeHandle {
    pub fn new(outbound: std_mpsc::Sender<Vec<u8>>) -> Self {
        Self { outbound }
    }

    /// Enqueue a raw SIO_DATA payload for the bridge to frame and send.
    /// Never blocks; returns `false` if the bridge has already shut down.
    pub fn send(&self, payload: &[u8]) -> bool {
        self.outbound.send(payload.to_vec()).is_ok()
    }
}

/// The capability set a GBA-core emulator registers at init (spec §4.5,
/// §6). Modeled as a trait, not an inheritance hierarchy (spec §9): the
/// bridge is generic over anything implementing it.
///
/// All calls happen on the caller's thread (expected to be the emulator's
/// main thread, per spec §5's "staged flag plus barrier" discipline) —
/// this trait itself does not spawn anything.
pub trait CoreCallbacks: Send + Sync {
    /// `client_id`: 0 = host, 1 = client (spec §6).
    fn start(&self, client_id: u16, handle: BridgeHandle);

    fn stop(&self);

    /// One payload delivered from `remote_client_id`.
    fn receive(&self, buf: &[u8], remote_client_id: u16);

    fn connected(&self, remote_client_id: u16);

    fn disconnected(&self);
}
