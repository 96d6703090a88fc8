// Calibration entry/exit gesture on the Stop button
//
//   Idle --held--> FirstPress --held within window--> Holding
//   Holding --held for hold_ms--> Toggle, then Latched until release
//
// Release from any state goes back to Idle. Latched guarantees a single
// toggle per continuous hold.

use log::debug;

use crate::config::MonitorConfig;
use crate::kernel::clock::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    FirstPress { at: Instant },
    Holding { since: Instant },
    Latched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    None,
    Toggle,
}

pub struct GestureDetector {
    phase: Phase,
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDetector {
    pub const fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn update(&mut self, stop_held: bool, now: Instant, cfg: &MonitorConfig) -> GestureEvent {
        if !stop_held {
            if !matches!(self.phase, Phase::Idle) {
                debug!("gesture: released in {:?}", self.phase);
            }
            self.phase = Phase::Idle;
            return GestureEvent::None;
        }

        match self.phase {
            Phase::Idle => {
                self.phase = Phase::FirstPress { at: now };
            }
            Phase::FirstPress { at } => {
                if now.millis_since(at) <= cfg.gesture_window_ms {
                    self.phase = Phase::Holding { since: now };
                } else {
                    self.phase = Phase::FirstPress { at: now };
                }
            }
            Phase::Holding { since } => {
                if now.millis_since(since) >= cfg.gesture_hold_ms {
                    self.phase = Phase::Latched;
                    return GestureEvent::Toggle;
                }
            }
            Phase::Latched => {}
        }

        GestureEvent::None
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }
}
