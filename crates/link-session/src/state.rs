use link_proto::LinkKind;

/// Which side of the connection this process is playing (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Client,
}

/// The session's active mode, or `Off` if nothing is running (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Off,
    Active { kind: LinkKind, role: Role },
}

impl SessionMode {
    pub fn is_off(self) -> bool {
        matches!(self, SessionMode::Off)
    }
}

/// Sub-states reachable once a TCP endpoint is up (spec §4.3's "Connected"
/// family). Netplay is the only mode that distinguishes `Syncing` (initial
/// state transfer) and `Stalled` (missing this frame's remote input) from
/// plain `Playing`; GBA link and GB link only ever occupy `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectedState {
    Syncing,
    Playing,
    Stalled,
    Connected,
}

/// The shared session lifecycle (spec §4.3), common to all three modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Waiting,
    Connecting,
    Active(ConnectedState),
    /// Entered from any `Active` state via `pause()`; `resume()` returns to
    /// `resume_to`.
    Paused { resume_to: ConnectedState },
    Disconnected,
    Error(String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Waiting => "Waiting",
            SessionState::Connecting => "Connecting",
            SessionState::Active(ConnectedState::Syncing) => "Syncing",
            SessionState::Active(ConnectedState::Playing) => "Playing",
            SessionState::Active(ConnectedState::Stalled) => "Stalled",
            SessionState::Active(ConnectedState::Connected) => "Connected",
            SessionState::Paused { .. } => "Paused",
            SessionState::Disconnected => "Disconnected",
            SessionState::Error(_) => "Error",
        }
    }

    /// Whether `pause()` is legal from this state (spec: "any connected").
    pub fn is_pausable(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_remembers_which_connected_state_to_resume_to() {
        let state = SessionState::Paused {
            resume_to: ConnectedState::Playing,
        };
        assert_eq!(state.name(), "Paused");
        let SessionState::Paused { resume_to } = state else {
            unreachable!()
        };
        assert_eq!(resume_to, ConnectedState::Playing);
    }

    #[test]
    fn only_active_states_are_pausable() {
        assert!(SessionState::Active(ConnectedState::Playing).is_pausable());
        assert!(!SessionState::Waiting.is_pausable());
        assert!(!SessionState::Disconnected.is_pausable());
    }
}
