// Threshold ladder: calibrated volts -> bar segments + low-battery flag
//
// Every threshold has a dead band of +/- buffer around it. Inside the
// band the previous state is held, so a reading sitting on a boundary
// never flickers.
//
//   segment 0   low when v <= t0 - buf, recovered when v >= t0 + buf
//   segment i   lit when v >= ti + buf, cleared when v <= ti - buf

use crate::drivers::storage::{THRESHOLD_COUNT, ThresholdTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LadderState {
    pub low_battery: bool,
    /// Bit i set = segment i lit, for i >= 1. Bit 0 is unused; segment 0
    /// belongs to the alert coordinator.
    lit: u16,
}

impl LadderState {
    pub const fn new() -> Self {
        Self {
            low_battery: false,
            lit: 0,
        }
    }

    pub const fn is_lit(&self, index: usize) -> bool {
        index > 0 && index < THRESHOLD_COUNT && self.lit & (1 << index) != 0
    }

    pub fn lit_count(&self) -> u32 {
        self.lit.count_ones()
    }
}

pub fn evaluate(prev: LadderState, volts: f32, table: &ThresholdTable, buffer: f32) -> LadderState {
    let levels = table.levels();
    let mut next = prev;

    let t0 = levels[0];
    if volts <= t0 - buffer {
        next.low_battery = true;
    } else if volts >= t0 + buffer {
        next.low_battery = false;
    }

    for (i, &t) in levels.iter().enumerate().skip(1) {
        if volts >= t + buffer {
            next.lit |= 1 << i;
        } else if volts <= t - buffer {
            next.lit &= !(1 << i);
        }
    }

    next
}
