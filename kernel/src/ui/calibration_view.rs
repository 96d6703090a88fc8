// Calibration screens
//
// One full-screen page per menu state. draw_page paints everything;
// draw_value repaints just the value being edited; draw_live keeps the
// calibrated voltage line current and only touches the panel when the
// displayed digits change.

use core::fmt::Write as _;

use super::stack_fmt::StackFmt;
use super::widget::Region;
use super::{ACCENT, BG, FG, SCREEN_W, centivolts};
use crate::apps::calibration::{Calibration, MenuState};
use crate::board::{Display, log_err};
use crate::drivers::storage::THRESHOLD_COUNT;

// ── Layout constants ──────────────────────────────────────────────

const MARGIN_X: u16 = 12;
const TITLE_Y: u16 = 12;
const VALUE_Y: u16 = 60;
const VALUE_REGION: Region = Region::new(0, VALUE_Y, SCREEN_W, 20);
const LIVE_Y: u16 = 100;
const LIVE_REGION: Region = Region::new(0, LIVE_Y, SCREEN_W, 20);
const HINT_Y: u16 = 160;
const LINE_H: u16 = 24;

pub struct CalibrationView {
    shown_centivolts: Option<i32>,
}

impl Default for CalibrationView {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationView {
    pub const fn new() -> Self {
        Self {
            shown_centivolts: None,
        }
    }

    pub fn draw_page<D: Display>(
        &mut self,
        d: &mut D,
        state: MenuState,
        cal: &Calibration,
        volts: f32,
    ) {
        log_err("calib: clear", d.clear(BG));
        self.shown_centivolts = None;

        let mut title = StackFmt::<24>::new();
        let hints: &[&str] = match state {
            MenuState::Top => {
                let _ = write!(title, "CALIBRATION");
                &["PLAY   offset", "STOP   thresholds", "LIGHT  exit"]
            }
            MenuState::Offset => {
                let _ = write!(title, "OFFSET");
                &["PLAY +  STOP -", "REC save  LIGHT back"]
            }
            MenuState::Threshold { index } => {
                let _ = write!(title, "THRESHOLD {}/{}", index + 1, THRESHOLD_COUNT);
                &["PLAY +  STOP -", "REC save+next  LIGHT back"]
            }
        };

        d.set_text_color(ACCENT, BG);
        d.set_text_cursor(MARGIN_X, TITLE_Y);
        log_err("calib: title", d.write_text(title.as_str()));

        d.set_text_color(FG, BG);
        for (row, hint) in hints.iter().enumerate() {
            d.set_text_cursor(MARGIN_X, HINT_Y + row as u16 * LINE_H);
            log_err("calib: hint", d.write_text(hint));
        }

        self.draw_value(d, state, cal);
        self.draw_live(d, volts);
    }

    pub fn draw_value<D: Display>(&mut self, d: &mut D, state: MenuState, cal: &Calibration) {
        let mut text = StackFmt::<24>::new();
        match state {
            MenuState::Top => return,
            MenuState::Offset => {
                let _ = write!(text, "{:+.2} V", cal.offset);
            }
            MenuState::Threshold { index } => match cal.thresholds.get(index) {
                Some(level) => {
                    let _ = write!(text, "{:.2} V", level);
                }
                None => return,
            },
        }

        log_err("calib: value", d.fill_region(VALUE_REGION, BG));
        d.set_text_color(ACCENT, BG);
        d.set_text_cursor(MARGIN_X, VALUE_Y);
        log_err("calib: value", d.write_text(text.as_str()));
    }

    pub fn draw_live<D: Display>(&mut self, d: &mut D, volts: f32) {
        let cv = centivolts(volts);
        if self.shown_centivolts == Some(cv) {
            return;
        }
        self.shown_centivolts = Some(cv);

        let mut text = StackFmt::<24>::new();
        let _ = write!(text, "now {:.2} V", volts);
        log_err("calib: live", d.fill_region(LIVE_REGION, BG));
        d.set_text_color(FG, BG);
        d.set_text_cursor(MARGIN_X, LIVE_Y);
        log_err("calib: live", d.write_text(text.as_str()));
    }
}
