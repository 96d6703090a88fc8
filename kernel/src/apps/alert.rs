// Low-battery alert: segment 0 blink + audio cue retrigger
//
// Driven entirely by timestamps compared each tick; nothing sleeps
// except the short stop->play settle gap when a cue (re)starts.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::board::{AudioPlayer, Color, log_err};
use crate::config::MonitorConfig;
use crate::kernel::clock::Instant;

pub const ALERT_TRACK: u16 = 1;

pub const SEGMENT0_OK: Color = Color::Yellow;
pub const SEGMENT0_ALARM: Color = Color::Red;
pub const SEGMENT0_BLANK: Color = Color::Off;

pub struct AlertCoordinator {
    was_low: bool,
    blink_on: bool,
    blink_toggled_at: Instant,
    cue_playing: bool,
    cue_started_at: Option<Instant>,
    cue_starts: u32,
}

impl Default for AlertCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertCoordinator {
    pub const fn new() -> Self {
        Self {
            was_low: false,
            blink_on: false,
            blink_toggled_at: Instant::ZERO,
            cue_playing: false,
            cue_started_at: None,
            cue_starts: 0,
        }
    }

    /// Advance one tick; returns the color segment 0 should show.
    pub fn update<A, D>(
        &mut self,
        low: bool,
        now: Instant,
        cfg: &MonitorConfig,
        audio: &mut A,
        delay: &mut D,
    ) -> Color
    where
        A: AudioPlayer,
        D: DelayNs,
    {
        if !low {
            if self.was_low {
                info!("alert: battery recovered");
                log_err("alert: stop", audio.stop());
                self.cue_playing = false;
                self.cue_started_at = None;
                self.blink_on = false;
                self.was_low = false;
            }
            return SEGMENT0_OK;
        }

        if !self.was_low {
            info!("alert: battery low");
            self.was_low = true;
            self.blink_on = true;
            self.blink_toggled_at = now;
        } else if now.millis_since(self.blink_toggled_at) >= cfg.blink_half_period_ms {
            self.blink_on = !self.blink_on;
            self.blink_toggled_at = now;
        }

        self.update_cue(now, cfg, audio, delay);

        if self.blink_on {
            SEGMENT0_ALARM
        } else {
            SEGMENT0_BLANK
        }
    }

    fn update_cue<A, D>(&mut self, now: Instant, cfg: &MonitorConfig, audio: &mut A, delay: &mut D)
    where
        A: AudioPlayer,
        D: DelayNs,
    {
        let period = cfg.cue_period_ms();
        let since_start = self.cue_started_at.map(|t| now.millis_since(t));

        if self.cue_playing && since_start.is_some_and(|ms| ms >= period) {
            self.cue_playing = false;
        }

        let due = since_start.is_none_or(|ms| ms >= period);
        if self.cue_playing || !due {
            return;
        }

        log_err("alert: stop", audio.stop());
        delay.delay_ms(cfg.audio_settle_ms);
        log_err("alert: play", audio.play(ALERT_TRACK));

        self.cue_playing = true;
        self.cue_started_at = Some(now);
        self.cue_starts = self.cue_starts.wrapping_add(1);
        debug!("alert: cue #{} at {}", self.cue_starts, now);
    }

    pub fn is_cue_playing(&self) -> bool {
        self.cue_playing
    }

    pub fn cue_starts(&self) -> u32 {
        self.cue_starts
    }
}
