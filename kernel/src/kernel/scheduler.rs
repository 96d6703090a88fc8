// Fixed-order tick scheduler
//
// Every tick runs the same phases in the same order. Calibration is a
// branch of the tick, not a nested loop: while a menu session exists
// the battery bar is not painted and playback buttons are ignored, but
// sampling and the low-battery alert keep running.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{error, info};

use super::clock::Instant;
use super::state::DeviceState;
use crate::apps::calibration::{CalibrationMenu, MenuResult, Redraw};
use crate::apps::gesture::GestureEvent;
use crate::apps::ladder;
use crate::apps::playback::DispatchOutcome;
use crate::board::{
    AudioPlayer, Button, Color, Display, Indicator, Inputs, NvStorage, log_err,
};
use crate::config::MonitorConfig;
use crate::drivers::battery::VoltageSampler;
use crate::drivers::storage::ConfigStore;

pub const INDICATOR_ON: Color = Color::White;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Battery,
    Alert,
    Gesture,
    Calibration,
    Indicator,
    Playback,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Battery => write!(f, "Battery"),
            Phase::Alert => write!(f, "Alert"),
            Phase::Gesture => write!(f, "Gesture"),
            Phase::Calibration => write!(f, "Calibration"),
            Phase::Indicator => write!(f, "Indicator"),
            Phase::Playback => write!(f, "Playback"),
        }
    }
}

pub const TICK_ORDER: [Phase; 6] = [
    Phase::Battery,
    Phase::Alert,
    Phase::Gesture,
    Phase::Calibration,
    Phase::Indicator,
    Phase::Playback,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    Display,
    AudioPlayer,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Display => write!(f, "display not detected"),
            InitError::AudioPlayer => write!(f, "audio player not detected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The user asked for a reset; the caller owns the watchdog.
    Restart,
}

/// Peripherals handed to the monitor at boot.
pub struct Outputs<D, A, S, L, W> {
    pub display: D,
    pub audio: A,
    pub storage: S,
    pub indicator: L,
    pub delay: W,
}

pub struct Monitor<D, A, S, L, W> {
    display: D,
    audio: A,
    store: ConfigStore<S>,
    indicator: L,
    delay: W,
    cfg: MonitorConfig,
    state: DeviceState,
}

impl<D, A, S, L, W> Monitor<D, A, S, L, W>
where
    D: Display,
    A: AudioPlayer,
    S: NvStorage,
    L: Indicator,
    W: DelayNs,
{
    pub fn boot(parts: Outputs<D, A, S, L, W>, mut cfg: MonitorConfig) -> Result<Self, InitError> {
        cfg.sanitize();
        let Outputs {
            mut display,
            mut audio,
            storage,
            indicator,
            delay,
        } = parts;

        if let Err(e) = display.init() {
            error!("boot: display init failed: {:?}", e);
            return Err(InitError::Display);
        }
        log_err("boot: backlight", display.set_backlight(cfg.backlight));

        if let Err(e) = audio.init() {
            error!("boot: audio init failed: {:?}", e);
            return Err(InitError::AudioPlayer);
        }
        log_err("boot: volume", audio.set_volume(cfg.volume));

        let mut store = ConfigStore::new(storage);
        let loaded = store.load();
        if loaded.was_repaired() {
            info!("boot: stored calibration was repaired");
        }

        let mut state = DeviceState::new(&loaded, VoltageSampler::new(cfg.divider));
        state.bar.draw_ladder(&mut display, &state.ladder);
        info!("boot: monitor ready");

        Ok(Self {
            display,
            audio,
            store,
            indicator,
            delay,
            cfg,
            state,
        })
    }

    pub fn tick(&mut self, now: Instant, inputs: &Inputs) -> TickOutcome {
        let mut outcome = TickOutcome::Continue;
        for phase in TICK_ORDER {
            match phase {
                Phase::Battery => self.run_battery(inputs),
                Phase::Alert => self.run_alert(now),
                Phase::Gesture => self.run_gesture(now, inputs),
                Phase::Calibration => self.run_calibration(now, inputs),
                Phase::Indicator => self.run_indicator(inputs),
                Phase::Playback => outcome = self.run_playback(now, inputs),
            }
        }
        outcome
    }

    fn run_battery(&mut self, inputs: &Inputs) {
        let state = &mut self.state;
        state.volts = state
            .sampler
            .sample(inputs.sensor_code, state.calibration.offset);
        state.ladder = ladder::evaluate(
            state.ladder,
            state.volts,
            &state.calibration.thresholds,
            self.cfg.hysteresis_v,
        );

        if !state.in_calibration() {
            state.bar.draw_ladder(&mut self.display, &state.ladder);
            state.bar.draw_reading(&mut self.display, state.volts);
        }
    }

    fn run_alert(&mut self, now: Instant) {
        let state = &mut self.state;
        let color = state.alert.update(
            state.ladder.low_battery,
            now,
            &self.cfg,
            &mut self.audio,
            &mut self.delay,
        );
        if !state.in_calibration() {
            state.bar.draw_segment(&mut self.display, 0, color);
        }
    }

    fn run_gesture(&mut self, now: Instant, inputs: &Inputs) {
        let state = &mut self.state;
        let stop_held = inputs.buttons.held(Button::Stop);
        let was_idle = state.gesture.is_idle();
        let event = state.gesture.update(stop_held, now, &self.cfg);
        if !stop_held {
            state.before_hold = None;
        } else if was_idle && state.in_calibration() {
            state.before_hold = Some(state.calibration);
        }
        if event != GestureEvent::Toggle {
            return;
        }

        if state.menu.take().is_some() {
            // the closing hold also drove Stop menu actions; undo them
            if let Some(cal) = state.before_hold.take() {
                state.calibration = cal;
            }
            info!("calib: closed by gesture");
            state.bar.invalidate();
            state.playback.hold_until_release();
        } else {
            info!("calib: opened");
            state.menu = Some(CalibrationMenu::open());
        }
    }

    fn run_calibration(&mut self, now: Instant, inputs: &Inputs) {
        let Self {
            display,
            store,
            cfg,
            state,
            ..
        } = self;
        let Some(menu) = state.menu.as_mut() else {
            return;
        };

        let result = menu.update(inputs.buttons, now, cfg, &mut state.calibration, store);
        if result == MenuResult::Exit {
            state.menu = None;
            state.bar.invalidate();
            state.playback.hold_until_release();
            return;
        }

        match menu.take_redraw() {
            Redraw::Full => {
                state
                    .calibration_view
                    .draw_page(display, menu.state(), &state.calibration, state.volts)
            }
            Redraw::Value => {
                state
                    .calibration_view
                    .draw_value(display, menu.state(), &state.calibration)
            }
            Redraw::None => {}
        }
        state.calibration_view.draw_live(display, state.volts);
    }

    fn run_indicator(&mut self, inputs: &Inputs) {
        let on = inputs.trigger_active;
        if self.state.indicator_on == Some(on) {
            return;
        }
        self.state.indicator_on = Some(on);
        self.indicator
            .set_all(if on { INDICATOR_ON } else { Color::Off });
    }

    fn run_playback(&mut self, now: Instant, inputs: &Inputs) -> TickOutcome {
        if self.state.in_calibration() {
            return TickOutcome::Continue;
        }
        match self
            .state
            .playback
            .update(inputs.buttons, now, &self.cfg, &mut self.audio)
        {
            DispatchOutcome::Continue => TickOutcome::Continue,
            DispatchOutcome::Restart => TickOutcome::Restart,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn display(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn audio(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn indicator(&mut self) -> &mut L {
        &mut self.indicator
    }

    pub fn store(&mut self) -> &mut ConfigStore<S> {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::MenuState;
    use crate::apps::alert::ALERT_TRACK;
    use crate::apps::calibration::OFFSET_STEP;
    use crate::apps::playback::PLAY_TRACK;
    use crate::board::ButtonLevels;
    use crate::drivers::storage::{OFFSET_ADDR, ThresholdTable};
    use crate::fakes::{AudioCall, DrawOp, FakeAudio, FakeDisplay, FakeIndicator, RamStorage};
    use crate::ui::battery_bar::{SEGMENT_LIT, segment_region};
    use embedded_hal_mock::eh1::delay::NoopDelay;

    type TestMonitor = Monitor<FakeDisplay, FakeAudio, RamStorage, FakeIndicator, NoopDelay>;

    fn parts(storage: RamStorage) -> Outputs<FakeDisplay, FakeAudio, RamStorage, FakeIndicator, NoopDelay> {
        Outputs {
            display: FakeDisplay::default(),
            audio: FakeAudio::default(),
            storage,
            indicator: FakeIndicator::default(),
            delay: NoopDelay,
        }
    }

    fn boot_with_offset(offset: f32) -> TestMonitor {
        let mut ram = RamStorage::new();
        ram.write_f32(OFFSET_ADDR, offset);
        let mut m = Monitor::boot(parts(ram), MonitorConfig::defaults()).unwrap();
        m.audio().calls.clear();
        m.display().take();
        m
    }

    /// Run ticks every 10ms over [from, to) with fixed inputs.
    fn run(m: &mut TestMonitor, from: u64, to: u64, inputs: Inputs) -> TickOutcome {
        let mut last = TickOutcome::Continue;
        for t in (from..to).step_by(10) {
            last = m.tick(Instant::from_millis(t), &inputs);
        }
        last
    }

    // 614 -> 15.862 V through the reference divider
    const CODE: u16 = 614;

    #[test]
    fn tick_order_is_fixed() {
        assert_eq!(
            TICK_ORDER,
            [
                Phase::Battery,
                Phase::Alert,
                Phase::Gesture,
                Phase::Calibration,
                Phase::Indicator,
                Phase::Playback,
            ]
        );
    }

    #[test]
    fn boot_halts_on_missing_display() {
        let mut p = parts(RamStorage::new());
        p.display.broken = true;
        assert_eq!(
            Monitor::boot(p, MonitorConfig::defaults()).err(),
            Some(InitError::Display)
        );
    }

    #[test]
    fn boot_halts_on_missing_audio() {
        let mut p = parts(RamStorage::new());
        p.audio.missing = true;
        assert_eq!(
            Monitor::boot(p, MonitorConfig::defaults()).err(),
            Some(InitError::AudioPlayer)
        );
    }

    #[test]
    fn boot_configures_peripherals_and_repairs_storage() {
        let mut m = Monitor::boot(parts(RamStorage::erased()), MonitorConfig::defaults()).unwrap();
        assert!(m.display().ops.contains(&DrawOp::Backlight(255)));
        assert_eq!(m.audio().calls, [AudioCall::Init, AudioCall::Volume(20)]);
        assert_eq!(m.state().calibration.offset, 0.0);
        assert_eq!(m.state().calibration.thresholds, ThresholdTable::defaults());
    }

    #[test]
    fn healthy_battery_paints_bar_without_alert() {
        // 15.862 - 2.072 = 13.79 V
        let mut m = boot_with_offset(2.072);
        run(&mut m, 0, 100, Inputs::new(CODE));

        assert!((m.state().volts - 13.79).abs() < 0.01);
        assert!(!m.state().ladder.low_battery);
        assert!(m.state().ladder.is_lit(2));
        assert!(!m.state().ladder.is_lit(3));

        let d = m.display();
        assert_eq!(d.fills_of(segment_region(0)), [Color::Yellow]);
        assert_eq!(d.fills_of(segment_region(2)), [SEGMENT_LIT]);
        assert!(d.texts().contains(&"13.79 V"));
        assert!(m.audio().calls.is_empty());
    }

    #[test]
    fn low_battery_blinks_and_cues() {
        let mut m = boot_with_offset(0.0);
        run(&mut m, 0, 1000, Inputs::new(0));

        assert!(m.state().ladder.low_battery);
        assert_eq!(m.audio().plays(ALERT_TRACK), 4);
        let seg0 = m.display().fills_of(segment_region(0));
        assert_eq!(seg0, [Color::Red, Color::Off, Color::Red, Color::Off]);

        run(&mut m, 1000, 1100, Inputs::new(CODE));
        assert!(!m.state().ladder.low_battery);
        assert_eq!(m.audio().calls.last(), Some(&AudioCall::Stop));
    }

    #[test]
    fn stop_hold_enters_calibration_and_blocks_playback() {
        let mut m = boot_with_offset(0.0);
        let stop = Inputs::new(CODE).pressing(Button::Stop);

        run(&mut m, 0, 1600, stop);
        assert!(m.state().in_calibration());
        assert!(m.display().texts().contains(&"CALIBRATION"));

        // Stop was a normal-mode action until the toggle, then ignored
        let stops_in_normal_mode = m.audio().stops();
        run(&mut m, 1600, 4000, stop);
        assert_eq!(m.audio().stops(), stops_in_normal_mode);

        let play = Inputs::new(CODE).pressing(Button::Play);
        run(&mut m, 4000, 4010, Inputs::new(CODE));
        run(&mut m, 4010, 4020, play);
        assert_eq!(m.audio().plays(PLAY_TRACK), 0);
        assert_eq!(
            m.state().menu.as_ref().map(|menu| menu.state()),
            Some(MenuState::Offset)
        );
    }

    #[test]
    fn light_in_top_menu_returns_to_bar() {
        let mut m = boot_with_offset(0.0);
        run(&mut m, 0, 1600, Inputs::new(CODE).pressing(Button::Stop));
        run(&mut m, 1600, 1700, Inputs::new(CODE));
        m.display().take();

        let out = run(&mut m, 1700, 1710, Inputs::new(CODE).pressing(Button::Light));
        assert!(!m.state().in_calibration());
        assert_eq!(out, TickOutcome::Continue);

        run(&mut m, 1710, 1720, Inputs::new(CODE));
        assert!(m.display().texts().contains(&"BATTERY"));
    }

    #[test]
    fn second_stop_hold_closes_calibration_cleanly() {
        let mut m = boot_with_offset(0.0);
        let stop = Inputs::new(CODE).pressing(Button::Stop);
        run(&mut m, 0, 1600, stop);
        run(&mut m, 1600, 1700, Inputs::new(CODE));
        assert!(m.state().in_calibration());
        let before = m.state().calibration;
        let stops = m.audio().stops();
        m.display().take();

        // Top -> Threshold{0}, then repeated -0.1 steps until the toggle
        run(&mut m, 1700, 3400, stop);
        assert!(!m.state().in_calibration());
        assert_eq!(m.state().calibration, before);
        assert!(m.display().texts().contains(&"BATTERY"));
        assert_eq!(m.audio().stops(), stops);

        run(&mut m, 3400, 3410, Inputs::new(CODE));
        run(&mut m, 3410, 3420, stop);
        assert_eq!(m.audio().stops(), stops + 1);
    }

    #[test]
    fn short_stop_press_in_menu_keeps_its_edit() {
        let mut m = boot_with_offset(0.0);
        run(&mut m, 0, 1600, Inputs::new(CODE).pressing(Button::Stop));
        run(&mut m, 1600, 1700, Inputs::new(CODE));
        run(&mut m, 1700, 1710, Inputs::new(CODE).pressing(Button::Play));
        run(&mut m, 1710, 1720, Inputs::new(CODE));

        run(&mut m, 2500, 2510, Inputs::new(CODE).pressing(Button::Stop));
        run(&mut m, 2510, 2520, Inputs::new(CODE));
        assert!(m.state().in_calibration());
        assert!((m.state().calibration.offset + OFFSET_STEP).abs() < 1e-6);
    }

    #[test]
    fn offset_edit_applies_live() {
        let mut m = boot_with_offset(0.0);
        run(&mut m, 0, 1600, Inputs::new(CODE).pressing(Button::Stop));
        run(&mut m, 1600, 1700, Inputs::new(CODE));
        run(&mut m, 1700, 1710, Inputs::new(CODE).pressing(Button::Play));
        run(&mut m, 1710, 1720, Inputs::new(CODE));
        let before = m.state().volts;

        run(&mut m, 2500, 2510, Inputs::new(CODE).pressing(Button::Play));
        run(&mut m, 2510, 2520, Inputs::new(CODE));
        assert!((before - m.state().volts - 0.01).abs() < 1e-4);
    }

    #[test]
    fn light_in_normal_mode_requests_restart() {
        let mut m = boot_with_offset(0.0);
        let out = m.tick(Instant::from_millis(0), &Inputs::new(CODE).pressing(Button::Light));
        assert_eq!(out, TickOutcome::Restart);
    }

    #[test]
    fn indicator_follows_trigger_on_change_only() {
        let mut m = boot_with_offset(0.0);
        let mut triggered = Inputs::new(CODE);
        triggered.trigger_active = true;

        run(&mut m, 0, 50, Inputs::new(CODE));
        run(&mut m, 50, 100, triggered);
        run(&mut m, 100, 150, Inputs::new(CODE));
        assert_eq!(m.indicator().history, [Color::Off, INDICATOR_ON, Color::Off]);
    }

    #[test]
    fn record_plays_track_three() {
        let inputs = Inputs {
            sensor_code: CODE,
            buttons: ButtonLevels::NONE.with(Button::Record),
            trigger_active: false,
        };
        let mut m = boot_with_offset(0.0);
        m.tick(Instant::from_millis(0), &inputs);
        assert_eq!(m.audio().calls, [AudioCall::Play(crate::apps::playback::RECORD_TRACK)]);
    }
}
