// Normal-mode button actions
//
// Level triggered with a per-button rate limit: a held button fires,
// then fires again each debounce interval for as long as it is held.
// Buttons are gated independently of each other.

use log::info;

use crate::board::{AudioPlayer, Button, ButtonLevels, log_err};
use crate::config::MonitorConfig;
use crate::kernel::clock::Instant;

pub const PLAY_TRACK: u16 = 2;
pub const RECORD_TRACK: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    Play(u16),
    Stop,
    Restart,
}

impl PlaybackAction {
    pub const fn for_button(button: Button) -> Self {
        match button {
            Button::Play => PlaybackAction::Play(PLAY_TRACK),
            Button::Record => PlaybackAction::Play(RECORD_TRACK),
            Button::Stop => PlaybackAction::Stop,
            Button::Light => PlaybackAction::Restart,
        }
    }
}

/// What the caller must do after dispatch. Restart is left to the
/// firmware since only it owns the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Restart,
}

pub struct PlaybackDispatcher {
    last_action: [Option<Instant>; 4],
    awaiting_release: bool,
}

impl Default for PlaybackDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackDispatcher {
    pub const fn new() -> Self {
        Self {
            last_action: [None; 4],
            awaiting_release: false,
        }
    }

    /// Ignore all buttons until every one has been released, so a press
    /// that closed the calibration menu does not also fire here.
    pub fn hold_until_release(&mut self) {
        self.awaiting_release = true;
    }

    pub fn update<A: AudioPlayer>(
        &mut self,
        buttons: ButtonLevels,
        now: Instant,
        cfg: &MonitorConfig,
        audio: &mut A,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::Continue;

        if self.awaiting_release {
            if buttons.any() {
                return outcome;
            }
            self.awaiting_release = false;
        }

        for button in Button::ALL {
            if !buttons.held(button) || !self.ready(button, now, cfg) {
                continue;
            }
            self.last_action[button.index()] = Some(now);

            match PlaybackAction::for_button(button) {
                PlaybackAction::Play(track) => {
                    info!("playback: {} -> track {}", button, track);
                    log_err("playback: play", audio.play(track));
                }
                PlaybackAction::Stop => {
                    info!("playback: stop");
                    log_err("playback: stop", audio.stop());
                }
                PlaybackAction::Restart => {
                    info!("playback: restart requested");
                    outcome = DispatchOutcome::Restart;
                }
            }
        }

        outcome
    }

    fn ready(&self, button: Button, now: Instant, cfg: &MonitorConfig) -> bool {
        self.last_action[button.index()]
            .is_none_or(|t| now.millis_since(t) >= cfg.playback_debounce_ms)
    }
}
