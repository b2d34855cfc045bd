use std::time::Duration;

/// Pending-packet ring depth (spec §3).
pub const QUEUE_SLOTS: usize = 32;

/// Max bytes per queued packet (spec §3).
pub const MAX_PACKET_BYTES: usize = 2048;

/// Bridge drains at most this many received frames per poll tick (spec
/// §4.5 step 1).
pub const MAX_PACKETS_PER_POLL: usize = 64;

/// Bridge delivers at most this many queued packets to the core per frame
/// tick (spec §4.5 step 6).
pub const MAX_DELIVER_PER_TICK: usize = 64;

/// Host sends one `HEARTBEAT` at this cadence (spec §4.5 step 5).
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(500);

/// Bridge disconnects a silent peer after this long (spec §4.5, "connection
/// watchdog").
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(60);

// The 2s-per-frame send stall budget (spec §4.1) is enforced inside
// `Transport::send_frame` itself (link-transport/src/transport.rs), since
// that's the only place that knows both the link mode and the write loop.
