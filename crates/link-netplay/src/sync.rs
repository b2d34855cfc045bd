use link_proto::netplay::{NetplayCmd, NetplayFrameView};
use link_proto::{encode_input_frame, encode_netplay_frame, try_decode_netplay_frames};
use link_session::Role;
use link_transport::{Transport, TransportError};
use tracing::{debug, trace, warn};

use crate::constants::{
    INPUT_LATENCY_FRAMES, KEEPALIVE_INTERVAL_FRAMES, RECV_POLL_MAX_ITERS, RECV_POLL_TIMEOUT,
    STALL_TIMEOUT_FRAMES,
};
use crate::frame_buffer::FrameBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Playing,
    Stalled,
    Paused,
}

/// What one call to [`FrameSync::step`] accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    RunFrame { frame: u32, p1: u16, p2: u16 },
    SkipFrame,
    Disconnect,
}

/// Lockstep frame synchronizer (spec §4.4): exchanges one `u16` input per
/// frame with the peer and only advances `run_frame` once both sides'
/// inputs for that frame are known.
pub struct FrameSync {
    buffer: FrameBuffer,
    run_frame: u32,
    stall_frames: u32,
    local_paused: bool,
    remote_paused: bool,
    state: SyncState,
}

impl FrameSync {
    pub fn new(role: Role) -> Self {
        Self {
            buffer: FrameBuffer::new(role),
            run_frame: 0,
            stall_frames: 0,
            local_paused: false,
            remote_paused: false,
            state: SyncState::Playing,
        }
    }

    /// Start post-state-transfer: seed the first two frames with neutral
    /// input and begin at `run_frame = 0`, `self_frame = 2` (spec §4.4).
    pub fn seed_after_state_transfer(&mut self) {
        self.buffer.seed_neutral();
        self.run_frame = 0;
    }

    pub fn run_frame(&self) -> u32 {
        self.run_frame
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Whether the emulator loop should mute audio output this tick (spec
    /// §4.4, "audio policy").
    pub fn audio_should_silence(&self) -> bool {
        self.state == SyncState::Stalled
    }

    /// `(host input, client input)` for a completed frame — identical on
    /// both peers for the same `frame` (spec §8, "`get_input(p, f)` returns
    /// identical values on both sides for every completed frame").
    pub fn get_input(&self, frame: u32) -> Option<(u16, u16)> {
        self.buffer.get(frame)
    }

    pub async fn send_pause(&mut self, transport: &mut Transport) -> Result<(), TransportError> {
        transport
            .send_frame(&encode_netplay_frame(NetplayCmd::Pause, self.run_frame, &[]).expect("empty payload"))
            .await?;
        self.local_paused = true;
        self.state = SyncState::Paused;
        Ok(())
    }

    pub async fn send_resume(&mut self, transport: &mut Transport) -> Result<(), TransportError> {
        transport
            .send_frame(&encode_netplay_frame(NetplayCmd::Resume, self.run_frame, &[]).expect("empty payload"))
            .await?;
        self.local_paused = false;
        self.state = if self.remote_paused { SyncState::Paused } else { SyncState::Playing };
        Ok(())
    }

    /// Run the per-frame algorithm once (spec §4.4 steps 1–5).
    pub async fn step(&mut self, transport: &mut Transport, local_input: u16) -> Result<StepOutcome, TransportError> {
        let self_frame = self.run_frame + INPUT_LATENCY_FRAMES;
        if !self.buffer.has_local(self_frame) {
            self.buffer.set_local(self_frame, local_input);
            transport.send_frame(&encode_input_frame(self_frame, local_input)).await?;
        }

        for _ in 0..RECV_POLL_MAX_ITERS {
            if self.buffer.is_complete(self.run_frame) {
                break;
            }
            match transport.fill_once_timeout(RECV_POLL_TIMEOUT).await {
                Ok(_) => {
                    let (frames, consumed) = try_decode_netplay_frames(transport.unread())?;
                    for frame in &frames {
                        if let Some(outcome) = self.dispatch(frame) {
                            transport.consume(consumed);
                            return Ok(outcome);
                        }
                    }
                    transport.consume(consumed);
                }
                Err(TransportError::Timeout(_)) => continue,
                Err(TransportError::Closed) => return Ok(StepOutcome::Disconnect),
                Err(e) => return Err(e),
            }
            if self.buffer.is_complete(self.run_frame) {
                break;
            }
        }

        if self.buffer.is_complete(self.run_frame) {
            self.stall_frames = 0;
            self.state = SyncState::Playing;
            let (p1, p2) = self.buffer.get(self.run_frame).expect("just checked complete");
            let frame = self.run_frame;
            self.run_frame += 1;
            return Ok(StepOutcome::RunFrame { frame, p1, p2 });
        }

        self.stall_frames += 1;
        if self.stall_frames % KEEPALIVE_INTERVAL_FRAMES == 0 {
            trace!(run_frame = self.run_frame, "sending stall keepalive");
            transport
                .send_frame(&encode_netplay_frame(NetplayCmd::Keepalive, self.run_frame, &[]).expect("empty payload"))
                .await?;
        }
        if self.stall_frames > STALL_TIMEOUT_FRAMES && !self.local_paused && !self.remote_paused {
            warn!(run_frame = self.run_frame, "stall timeout exceeded, disconnecting");
            return Ok(StepOutcome::Disconnect);
        }
        self.state = SyncState::Stalled;
        Ok(StepOutcome::SkipFrame)
    }

    fn dispatch(&mut self, frame: &NetplayFrameView<'_>) -> Option<StepOutcome> {
        match frame.cmd {
            NetplayCmd::Input => {
                let value = u16::from_be_bytes(frame.payload.try_into().unwrap_or([0, 0]));
                self.buffer.set_remote(frame.frame, value);
                None
            }
            NetplayCmd::Pause => {
                self.remote_paused = true;
                self.state = SyncState::Paused;
                None
            }
            NetplayCmd::Resume => {
                self.remote_paused = false;
                if !self.local_paused {
                    self.state = SyncState::Playing;
                }
                None
            }
            NetplayCmd::Keepalive => {
                debug!("keepalive received");
                None
            }
            NetplayCmd::Disconnect => Some(StepOutcome::Disconnect),
            NetplayCmd::StateHdr | NetplayCmd::StateAck | NetplayCmd::Ready | NetplayCmd::Ping | NetplayCmd::Pong => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sync_starts_playing_at_frame_zero() {
        let sync = FrameSync::new(Role::Host);
        assert_eq!(sync.run_frame(), 0);
        assert_eq!(sync.state(), SyncState::Playing);
        assert!(!sync.audio_should_silence());
    }

    #[test]
    fn seeding_after_state_transfer_resets_run_frame() {
        let mut sync = FrameSync::new(Role::Host);
        sync.run_frame = 5;
        sync.seed_after_state_transfer();
        assert_eq!(sync.run_frame(), 0);
        assert!(sync.buffer.is_complete(0));
        assert!(sync.buffer.is_complete(1));
    }

    #[test]
    fn remote_pause_silences_without_touching_local_flag() {
        let mut sync = FrameSync::new(Role::Host);
        let frame = NetplayFrameView {
            cmd: NetplayCmd::Pause,
            frame: 0,
            payload: &[],
        };
        assert!(sync.dispatch(&frame).is_none());
        assert_eq!(sync.state(), SyncState::Paused);
        assert!(sync.remote_paused);
        assert!(!sync.local_paused);
    }

    #[test]
    fn disconnect_command_surfaces_as_outcome() {
        let mut sync = FrameSync::new(Role::Host);
        let frame = NetplayFrameView {
            cmd: NetplayCmd::Disconnect,
            frame: 0,
            payload: &[],
        };
        assert_eq!(sync.dispatch(&frame), Some(StepOutcome::Disconnect));
    }
}
