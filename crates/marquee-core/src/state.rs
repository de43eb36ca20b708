//! Playback state machine
//!
//! Owns the canonical playback state, driven only by engine callbacks and
//! explicit commands. Every method returns `Some(new_state)` exactly when the
//! canonical state changed, so the caller can emit one notification per
//! logical transition; repeated identical callbacks collapse to `None`.
//! Pure and synchronous; no I/O here.

use crate::types::PlaybackState;
use tracing::debug;

/// Edge-triggered playback state machine
#[derive(Debug)]
pub struct PlaybackStateMachine {
    state: PlaybackState,
    /// Non-buffering state to return to when buffering ends
    resume_state: PlaybackState,
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            resume_state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_buffering(&self) -> bool {
        self.state == PlaybackState::Buffering
    }

    fn transition(&mut self, next: PlaybackState) -> Option<PlaybackState> {
        if self.state == next {
            return None;
        }
        debug!(from = %self.state, to = %next, "State transition");
        self.state = next.clone();
        Some(next)
    }

    /// Asset load accepted: enter `Loading`. Leaves terminal states; callers
    /// gate on the catalog context being complete.
    pub fn begin_loading(&mut self) -> Option<PlaybackState> {
        self.resume_state = PlaybackState::Loading;
        self.transition(PlaybackState::Loading)
    }

    /// Engine reported prepared. Ends a buffering episode when one is in
    /// flight, otherwise completes the load.
    pub fn on_ready(&mut self) -> Option<PlaybackState> {
        match self.state {
            PlaybackState::Loading => {
                self.resume_state = PlaybackState::Ready;
                self.transition(PlaybackState::Ready)
            }
            PlaybackState::Buffering => {
                let resume = self.resume_state.clone();
                self.transition(resume)
            }
            _ => None,
        }
    }

    /// Engine stalled. Edge-triggered: a no-op while already buffering, and
    /// ignored in terminal or idle states.
    pub fn on_buffer_start(&mut self) -> Option<PlaybackState> {
        if self.state.is_terminal()
            || self.state == PlaybackState::Idle
            || self.state == PlaybackState::Buffering
        {
            return None;
        }
        self.resume_state = self.state.clone();
        self.transition(PlaybackState::Buffering)
    }

    /// Engine recovered: return to the state buffering interrupted
    pub fn on_buffer_end(&mut self) -> Option<PlaybackState> {
        if self.state != PlaybackState::Buffering {
            return None;
        }
        let resume = self.resume_state.clone();
        self.transition(resume)
    }

    /// Explicit play command accepted by the engine
    pub fn play_requested(&mut self) -> Option<PlaybackState> {
        match self.state {
            PlaybackState::Ready | PlaybackState::Paused => {
                self.transition(PlaybackState::Playing)
            }
            PlaybackState::Buffering => {
                // Resume into playback once the stall clears
                self.resume_state = PlaybackState::Playing;
                None
            }
            _ => None,
        }
    }

    /// Explicit pause command or scrub-start accepted by the engine
    pub fn pause_requested(&mut self) -> Option<PlaybackState> {
        match self.state {
            PlaybackState::Playing => self.transition(PlaybackState::Paused),
            PlaybackState::Buffering => {
                self.resume_state = PlaybackState::Paused;
                None
            }
            _ => None,
        }
    }

    /// Engine reached the end of the asset
    pub fn on_ended(&mut self) -> Option<PlaybackState> {
        match self.state {
            PlaybackState::Playing | PlaybackState::Buffering => {
                self.transition(PlaybackState::Ended)
            }
            _ => None,
        }
    }

    /// Terminal playback fault. Only a new load leaves this state.
    pub fn on_error(&mut self, message: String) -> Option<PlaybackState> {
        self.transition(PlaybackState::Error(message))
    }
}

impl Default for PlaybackStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_machine() -> PlaybackStateMachine {
        let mut machine = PlaybackStateMachine::new();
        machine.begin_loading();
        machine.on_ready();
        machine.play_requested();
        assert_eq!(machine.state(), &PlaybackState::Playing);
        machine
    }

    #[test]
    fn test_load_ready_play_pause() {
        let mut machine = PlaybackStateMachine::new();

        assert_eq!(machine.begin_loading(), Some(PlaybackState::Loading));
        assert_eq!(machine.on_ready(), Some(PlaybackState::Ready));
        assert_eq!(machine.play_requested(), Some(PlaybackState::Playing));
        assert_eq!(machine.pause_requested(), Some(PlaybackState::Paused));
        assert_eq!(machine.play_requested(), Some(PlaybackState::Playing));
    }

    #[test]
    fn test_buffering_is_edge_triggered() {
        let mut machine = playing_machine();

        assert_eq!(machine.on_buffer_start(), Some(PlaybackState::Buffering));
        // Second identical callback collapses
        assert_eq!(machine.on_buffer_start(), None);
        assert_eq!(machine.on_buffer_end(), Some(PlaybackState::Playing));
        assert_eq!(machine.on_buffer_end(), None);
    }

    #[test]
    fn test_buffering_resumes_previous_state() {
        let mut machine = playing_machine();
        machine.pause_requested();

        machine.on_buffer_start();
        assert_eq!(machine.on_buffer_end(), Some(PlaybackState::Paused));
    }

    #[test]
    fn test_ready_ends_buffering_episode() {
        let mut machine = playing_machine();
        machine.on_buffer_start();

        // STATE_READY doubles as buffer-end
        assert_eq!(machine.on_ready(), Some(PlaybackState::Playing));
    }

    #[test]
    fn test_pause_during_buffering_changes_resume_target() {
        let mut machine = playing_machine();
        machine.on_buffer_start();

        assert_eq!(machine.pause_requested(), None);
        assert_eq!(machine.on_buffer_end(), Some(PlaybackState::Paused));
    }

    #[test]
    fn test_error_is_terminal_until_new_load() {
        let mut machine = playing_machine();

        assert_eq!(
            machine.on_error("decoder died".into()),
            Some(PlaybackState::Error("decoder died".into()))
        );
        assert_eq!(machine.on_buffer_start(), None);
        assert_eq!(machine.play_requested(), None);
        assert_eq!(machine.on_ready(), None);

        // A new load leaves the terminal state
        assert_eq!(machine.begin_loading(), Some(PlaybackState::Loading));
    }

    #[test]
    fn test_duplicate_error_collapses() {
        let mut machine = playing_machine();
        machine.on_error("net down".into());
        assert_eq!(machine.on_error("net down".into()), None);
    }

    #[test]
    fn test_ended_from_playing() {
        let mut machine = playing_machine();
        assert_eq!(machine.on_ended(), Some(PlaybackState::Ended));
        assert_eq!(machine.on_ended(), None);
    }

    #[test]
    fn test_buffering_ignored_before_load() {
        let mut machine = PlaybackStateMachine::new();
        assert_eq!(machine.on_buffer_start(), None);
    }

    #[test]
    fn test_play_ignored_without_asset() {
        let mut machine = PlaybackStateMachine::new();
        assert_eq!(machine.play_requested(), None);
    }
}
