// All mutable device state, owned by the Monitor and lent to each
// component per tick. Nothing here touches hardware.

use crate::apps::{
    AlertCoordinator, Calibration, CalibrationMenu, GestureDetector, LadderState,
    PlaybackDispatcher,
};
use crate::drivers::battery::VoltageSampler;
use crate::drivers::storage::LoadedConfig;
use crate::ui::{BatteryBar, CalibrationView};

pub struct DeviceState {
    pub calibration: Calibration,
    pub sampler: VoltageSampler,
    pub volts: f32,
    pub ladder: LadderState,
    pub alert: AlertCoordinator,
    pub gesture: GestureDetector,
    pub playback: PlaybackDispatcher,
    /// Present while calibration mode is active.
    pub menu: Option<CalibrationMenu>,
    /// Live calibration as it stood when the current Stop hold began
    /// inside the menu; put back if that hold closes the menu.
    pub before_hold: Option<Calibration>,
    pub indicator_on: Option<bool>,
    pub bar: BatteryBar,
    pub calibration_view: CalibrationView,
}

impl DeviceState {
    pub fn new(loaded: &LoadedConfig, sampler: VoltageSampler) -> Self {
        Self {
            calibration: Calibration {
                offset: loaded.offset,
                thresholds: loaded.thresholds,
            },
            sampler,
            volts: 0.0,
            ladder: LadderState::new(),
            alert: AlertCoordinator::new(),
            gesture: GestureDetector::new(),
            playback: PlaybackDispatcher::new(),
            menu: None,
            before_hold: None,
            indicator_on: None,
            bar: BatteryBar::new(),
            calibration_view: CalibrationView::new(),
        }
    }

    pub fn in_calibration(&self) -> bool {
        self.menu.is_some()
    }
}
