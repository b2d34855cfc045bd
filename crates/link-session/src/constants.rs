use std::time::Duration;

/// How long a host waits for the client's `READY` before giving up and
/// returning to `Waiting` (spec §4.3.1 step 2).
pub const READY_TIMEOUT: Duration = Duration::from_secs(5);
