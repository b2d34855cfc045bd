use std::time::Duration;

/// Local input is sent this many frames ahead of `run_frame` (spec §4.4).
pub const INPUT_LATENCY_FRAMES: u32 = 2;

/// Disconnect once stalled for this many consecutive frames with neither
/// side paused (spec §4.3, §8).
pub const STALL_TIMEOUT_FRAMES: u32 = 180;

/// Send one `KEEPALIVE` every this many stall frames.
pub const KEEPALIVE_INTERVAL_FRAMES: u32 = 30;

/// Per-frame receive poll timeout (spec §4.4 step 2).
pub const RECV_POLL_TIMEOUT: Duration = Duration::from_millis(16);

/// Give up polling for this frame after this many 16ms receive attempts.
pub const RECV_POLL_MAX_ITERS: u32 = 10;

/// Initial state transfer chunk size (spec §4.4).
pub const STATE_CHUNK_BYTES: usize = 4096;
