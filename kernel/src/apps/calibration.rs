// Calibration menu: offset and threshold editing
//
// A flat state enum plus a dispatch table keyed on (state, button). Each
// update performs at most one action; the view redraws only when the
// menu reports a change.
//
//   Top        Play -> Offset, Stop -> Threshold{0}, Light -> exit
//   Offset     Play/Stop +/-0.01, Record save -> Top, Light -> Top
//   Threshold  Play/Stop +/-0.1, Record save + next index, Light -> Top
//
// Edits apply to the live calibration immediately; Record only decides
// whether they are persisted.

use log::{debug, info};

use crate::board::{Button, ButtonLevels, NvStorage};
use crate::config::MonitorConfig;
use crate::drivers::storage::{ConfigStore, THRESHOLD_COUNT, ThresholdTable};
use crate::kernel::clock::Instant;
use crate::ui::widget::wrap_next;

pub const OFFSET_STEP: f32 = 0.01;
pub const THRESHOLD_STEP: f32 = 0.1;
/// Offset substituted when an adjustment produces NaN.
pub const OFFSET_FALLBACK: f32 = 1.38;

/// The live calibration values the monitor runs on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub offset: f32,
    pub thresholds: ThresholdTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Top,
    Offset,
    Threshold { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

impl Step {
    const fn sign(self) -> f32 {
        match self {
            Step::Up => 1.0,
            Step::Down => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Ignore,
    Enter(MenuState),
    Exit,
    AdjustOffset(Step),
    SaveOffset,
    AdjustThreshold(Step),
    SaveThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeat {
    Adjust,
    Commit,
}

impl MenuAction {
    const fn repeat(self) -> Repeat {
        match self {
            MenuAction::AdjustOffset(_) | MenuAction::AdjustThreshold(_) => Repeat::Adjust,
            _ => Repeat::Commit,
        }
    }
}

/// The dispatch table.
pub const fn dispatch(state: MenuState, button: Button) -> MenuAction {
    match (state, button) {
        (MenuState::Top, Button::Play) => MenuAction::Enter(MenuState::Offset),
        (MenuState::Top, Button::Stop) => MenuAction::Enter(MenuState::Threshold { index: 0 }),
        (MenuState::Top, Button::Record) => MenuAction::Ignore,
        (MenuState::Top, Button::Light) => MenuAction::Exit,

        (MenuState::Offset, Button::Play) => MenuAction::AdjustOffset(Step::Up),
        (MenuState::Offset, Button::Stop) => MenuAction::AdjustOffset(Step::Down),
        (MenuState::Offset, Button::Record) => MenuAction::SaveOffset,
        (MenuState::Offset, Button::Light) => MenuAction::Enter(MenuState::Top),

        (MenuState::Threshold { .. }, Button::Play) => MenuAction::AdjustThreshold(Step::Up),
        (MenuState::Threshold { .. }, Button::Stop) => MenuAction::AdjustThreshold(Step::Down),
        (MenuState::Threshold { .. }, Button::Record) => MenuAction::SaveThreshold,
        (MenuState::Threshold { .. }, Button::Light) => MenuAction::Enter(MenuState::Top),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    None,
    /// Only the edited value changed.
    Value,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuResult {
    Stay,
    Exit,
}

pub struct CalibrationMenu {
    state: MenuState,
    last_action: Option<Instant>,
    awaiting_release: bool,
    redraw: Redraw,
}

impl CalibrationMenu {
    /// Open at the top level. Input is ignored until every button has
    /// been released, so the hold that opened the menu is not read as a
    /// selection.
    pub const fn open() -> Self {
        Self {
            state: MenuState::Top,
            last_action: None,
            awaiting_release: true,
            redraw: Redraw::Full,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn take_redraw(&mut self) -> Redraw {
        core::mem::replace(&mut self.redraw, Redraw::None)
    }

    pub fn update<S: NvStorage>(
        &mut self,
        buttons: ButtonLevels,
        now: Instant,
        cfg: &MonitorConfig,
        cal: &mut Calibration,
        store: &mut ConfigStore<S>,
    ) -> MenuResult {
        if self.awaiting_release {
            if buttons.any() {
                return MenuResult::Stay;
            }
            self.awaiting_release = false;
        }

        let Some(button) = buttons.first_held() else {
            return MenuResult::Stay;
        };

        let action = dispatch(self.state, button);
        if action == MenuAction::Ignore || !self.throttle_elapsed(action, now, cfg) {
            return MenuResult::Stay;
        }
        self.last_action = Some(now);
        debug!("calib: {:?} + {} -> {:?}", self.state, button, action);

        match action {
            MenuAction::Ignore => {}
            MenuAction::Enter(state) => {
                info!("calib: {:?} -> {:?}", self.state, state);
                self.state = state;
                self.redraw = Redraw::Full;
            }
            MenuAction::Exit => {
                info!("calib: exit");
                return MenuResult::Exit;
            }
            MenuAction::AdjustOffset(step) => {
                cal.offset += step.sign() * OFFSET_STEP;
                if cal.offset.is_nan() {
                    cal.offset = OFFSET_FALLBACK;
                }
                self.mark_value();
            }
            MenuAction::SaveOffset => {
                store.save_offset(cal.offset);
                self.state = MenuState::Top;
                self.redraw = Redraw::Full;
            }
            MenuAction::AdjustThreshold(step) => {
                let index = self.threshold_index();
                if let Some(level) = cal.thresholds.get_mut(index) {
                    *level += step.sign() * THRESHOLD_STEP;
                }
                self.mark_value();
            }
            MenuAction::SaveThreshold => {
                let index = self.threshold_index();
                if let Some(level) = cal.thresholds.get(index) {
                    store.save_threshold(index, level);
                }
                self.state = MenuState::Threshold {
                    index: wrap_next(index, THRESHOLD_COUNT),
                };
                self.redraw = Redraw::Full;
            }
        }

        MenuResult::Stay
    }

    fn threshold_index(&self) -> usize {
        match self.state {
            MenuState::Threshold { index } => index,
            _ => 0,
        }
    }

    fn mark_value(&mut self) {
        if self.redraw == Redraw::None {
            self.redraw = Redraw::Value;
        }
    }

    fn throttle_elapsed(&self, action: MenuAction, now: Instant, cfg: &MonitorConfig) -> bool {
        let wait = match action.repeat() {
            Repeat::Adjust => cfg.menu_adjust_repeat_ms,
            Repeat::Commit => cfg.menu_commit_repeat_ms,
        };
        self.last_action
            .is_none_or(|t| now.millis_since(t) >= wait)
    }
}
