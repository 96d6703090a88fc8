// Control logic run each tick by the scheduler
//
// Each component owns its own timing state and is handed the
// peripherals it needs per call; none of them hold hardware.

pub mod alert;
pub mod calibration;
pub mod gesture;
pub mod ladder;
pub mod playback;

pub use alert::AlertCoordinator;
pub use calibration::{Calibration, CalibrationMenu, MenuState};
pub use gesture::{GestureDetector, GestureEvent};
pub use ladder::LadderState;
pub use playback::{DispatchOutcome, PlaybackDispatcher};
