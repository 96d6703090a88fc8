// Runtime tunables for the monitor
//
// Built once at boot from MonitorConfig::defaults(), optionally tweaked
// by the board, then sanitized. Out-of-range fields are clamped rather
// than rejected.

use crate::drivers::battery::Divider;

pub const MAX_VOLUME: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    pub divider: Divider,
    /// Half-width of the dead band around every threshold, volts.
    pub hysteresis_v: f32,
    pub blink_half_period_ms: u64,
    /// How long a low-battery cue counts as playing.
    pub cue_duration_ms: u64,
    /// Added on top of `cue_duration_ms` before the cue may retrigger.
    pub cue_extra_delay_ms: u64,
    /// Blocking gap between stop and play when restarting a cue.
    pub audio_settle_ms: u32,
    pub playback_debounce_ms: u64,
    pub gesture_window_ms: u64,
    pub gesture_hold_ms: u64,
    pub menu_adjust_repeat_ms: u64,
    pub menu_commit_repeat_ms: u64,
    pub volume: u8,
    pub backlight: u8,
}

impl MonitorConfig {
    pub const fn defaults() -> Self {
        Self {
            divider: Divider::REFERENCE,
            hysteresis_v: 0.1,
            blink_half_period_ms: 250,
            cue_duration_ms: 250,
            cue_extra_delay_ms: 0,
            audio_settle_ms: 20,
            playback_debounce_ms: 1000,
            gesture_window_ms: 750,
            gesture_hold_ms: 1500,
            menu_adjust_repeat_ms: 300,
            menu_commit_repeat_ms: 500,
            volume: 20,
            backlight: 255,
        }
    }

    pub fn sanitize(&mut self) {
        if !self.hysteresis_v.is_finite() || self.hysteresis_v <= 0.0 {
            log::warn!("config: hysteresis {} invalid, using 0.1", self.hysteresis_v);
            self.hysteresis_v = 0.1;
        }
        self.blink_half_period_ms = self.blink_half_period_ms.max(1);
        self.cue_duration_ms = self.cue_duration_ms.max(1);
        // settle is a blocking pause inside the tick
        self.audio_settle_ms = self.audio_settle_ms.min(1000);
        self.gesture_hold_ms = self.gesture_hold_ms.max(1);
        self.volume = self.volume.min(MAX_VOLUME);
        if self.divider.max_code == 0 {
            self.divider.max_code = Divider::REFERENCE.max_code;
        }
    }

    /// Minimum spacing between low-battery cue starts.
    pub const fn cue_period_ms(&self) -> u64 {
        self.cue_duration_ms + self.cue_extra_delay_ms
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
