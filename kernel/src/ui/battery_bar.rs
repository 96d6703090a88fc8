// Main screen: segmented battery bar plus a voltage readout
//
// Segments are redrawn only when their color changes. invalidate()
// forces the frame and every segment to be painted again, e.g. after
// leaving the calibration screens.

use core::fmt::Write as _;

use super::stack_fmt::StackFmt;
use super::widget::Region;
use super::{BG, FG, SCREEN_W, centivolts};
use crate::apps::ladder::LadderState;
use crate::board::{Color, Display, log_err};
use crate::drivers::storage::THRESHOLD_COUNT;

// ── Layout constants ──────────────────────────────────────────────

const TITLE_Y: u16 = 12;
const READOUT_Y: u16 = 44;
const READOUT_REGION: Region = Region::new(0, READOUT_Y, SCREEN_W, 20);

const BAR_X: u16 = 8;
const BAR_Y: u16 = 96;
const SEG_W: u16 = 24;
const SEG_GAP: u16 = 4;
const SEG_H: u16 = 96;
const FRAME: u16 = 2;
const BAR_W: u16 = THRESHOLD_COUNT as u16 * (SEG_W + SEG_GAP) + SEG_GAP;

const TIP_W: u16 = 8;
const TIP_H: u16 = 32;
const TIP_REGION: Region = Region::new(
    BAR_X + BAR_W + FRAME * 2,
    BAR_Y + (SEG_H + (SEG_GAP + FRAME) * 2 - TIP_H) / 2,
    TIP_W,
    TIP_H,
);

// battery terminal nub, 8x32, rounded on the right
const TIP_BITMAP: [u8; 32] = [
    0xF0, 0xF8, 0xFC, 0xFC, 0xFE, 0xFE, 0xFE, 0xFE, //
    0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, //
    0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, //
    0xFE, 0xFE, 0xFE, 0xFE, 0xFC, 0xFC, 0xF8, 0xF0, //
];

pub const SEGMENT_LIT: Color = Color::Yellow;
pub const SEGMENT_DARK: Color = Color::Dim;

pub const fn segment_region(index: usize) -> Region {
    Region::new(
        BAR_X + FRAME + SEG_GAP + index as u16 * (SEG_W + SEG_GAP),
        BAR_Y + FRAME + SEG_GAP,
        SEG_W,
        SEG_H,
    )
}

pub struct BatteryBar {
    drawn: [Option<Color>; THRESHOLD_COUNT],
    shown_centivolts: Option<i32>,
    frame_drawn: bool,
}

impl Default for BatteryBar {
    fn default() -> Self {
        Self::new()
    }
}

impl BatteryBar {
    pub const fn new() -> Self {
        Self {
            drawn: [None; THRESHOLD_COUNT],
            shown_centivolts: None,
            frame_drawn: false,
        }
    }

    pub fn invalidate(&mut self) {
        self.drawn = [None; THRESHOLD_COUNT];
        self.shown_centivolts = None;
        self.frame_drawn = false;
    }

    /// Segments 1.. from the ladder; segment 0 is painted by the alert path.
    pub fn draw_ladder<D: Display>(&mut self, d: &mut D, ladder: &LadderState) {
        self.ensure_frame(d);
        for i in 1..THRESHOLD_COUNT {
            let color = if ladder.is_lit(i) { SEGMENT_LIT } else { SEGMENT_DARK };
            self.draw_segment(d, i, color);
        }
    }

    pub fn draw_segment<D: Display>(&mut self, d: &mut D, index: usize, color: Color) {
        self.ensure_frame(d);
        let Some(slot) = self.drawn.get_mut(index) else {
            return;
        };
        if *slot == Some(color) {
            return;
        }
        *slot = Some(color);
        log_err("bar: segment", d.fill_region(segment_region(index), color));
    }

    pub fn draw_reading<D: Display>(&mut self, d: &mut D, volts: f32) {
        self.ensure_frame(d);
        let cv = centivolts(volts);
        if self.shown_centivolts == Some(cv) {
            return;
        }
        self.shown_centivolts = Some(cv);

        let mut text = StackFmt::<16>::new();
        let _ = write!(text, "{:.2} V", volts);
        log_err("bar: readout", d.fill_region(READOUT_REGION, BG));
        d.set_text_color(FG, BG);
        d.set_text_cursor(BAR_X, READOUT_Y);
        log_err("bar: readout", d.write_text(text.as_str()));
    }

    fn ensure_frame<D: Display>(&mut self, d: &mut D) {
        if self.frame_drawn {
            return;
        }
        self.frame_drawn = true;

        log_err("bar: clear", d.clear(BG));
        d.set_text_color(FG, BG);
        d.set_text_cursor(BAR_X, TITLE_Y);
        log_err("bar: title", d.write_text("BATTERY"));

        let outer = Region::new(
            BAR_X,
            BAR_Y,
            BAR_W + FRAME * 2,
            SEG_H + (SEG_GAP + FRAME) * 2,
        );
        log_err("bar: frame", d.fill_region(outer, FG));
        log_err("bar: frame", d.fill_region(outer.inset(FRAME), BG));
        log_err("bar: tip", d.draw_bitmap(TIP_REGION, &TIP_BITMAP, FG));
    }
}
