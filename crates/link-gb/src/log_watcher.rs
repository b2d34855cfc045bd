/// Connection state mirrored from the core's own log output (spec §4 data
/// flow: "CoreAdapter mirrors connection state from core log lines").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GbLinkConnState {
    Disconnected,
    Connecting,
    Connected,
}

/// Matches the handful of log-line shapes the GB core is expected to emit
/// around its embedded link-cable TCP client/server. Unrecognized lines
/// are ignored rather than erroring — a core's log format is not a
/// contract we control.
pub struct LogWatcher {
    state: GbLinkConnState,
}

impl Default for LogWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LogWatcher {
    pub fn new() -> Self {
        Self { state: GbLinkConnState::Disconnected }
    }

    pub fn state(&self) -> GbLinkConnState {
        self.state
    }

    /// Feed one log line; returns `true` if it changed the observed state.
    pub fn observe(&mut self, line: &str) -> bool {
        let next = if contains_any(line, &["link cable connected", "sio: peer connected", "link: connected"]) {
            Some(GbLinkConnState::Connected)
        } else if contains_any(line, &["link cable connecting", "sio: dialing", "link: waiting for peer"]) {
            Some(GbLinkConnState::Connecting)
        } else if contains_any(line, &["link cable disconnected", "sio: peer closed", "link: connection lost"]) {
            Some(GbLinkConnState::Disconnected)
        } else {
            None
        };

        match next {
            Some(state) if state != self.state => {
                self.state = state;
                true
            }
            _ => false,
        }
    }
}

fn contains_any(line: &str, needles: &[&str]) -> bool {
    let lower = line.to_ascii_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_line_transitions_state() {
        let mut watcher = LogWatcher::new();
        assert!(watcher.observe("SIO: peer connected from 10.0.0.10"));
        assert_eq!(watcher.state(), GbLinkConnState::Connected);
    }

    #[test]
    fn unrecognized_line_is_ignored() {
        let mut watcher = LogWatcher::new();
        assert!(!watcher.observe("PPU: frame rendered"));
        assert_eq!(watcher.state(), GbLinkConnState::Disconnected);
    }

    #[test]
    fn repeating_the_same_state_reports_no_change() {
        let mut watcher = LogWatcher::new();
        assert!(watcher.observe("link: connected to peer"));
        assert!(!watcher.observe("link cable connected again"));
    }
}
