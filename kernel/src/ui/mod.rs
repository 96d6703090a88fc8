// Screen layouts drawn through the Display capability
//
// Layout constants assume a 320x240 landscape panel.

pub mod battery_bar;
pub mod calibration_view;
pub mod stack_fmt;
pub mod widget;

pub use battery_bar::BatteryBar;
pub use calibration_view::CalibrationView;

use crate::board::Color;

pub const SCREEN_W: u16 = 320;

pub const BG: Color = Color::Off;
pub const FG: Color = Color::White;
pub const ACCENT: Color = Color::Green;

/// Volts to hundredths, rounded half away from zero. NaN maps to 0.
pub(crate) fn centivolts(volts: f32) -> i32 {
    let scaled = volts * 100.0;
    if scaled >= 0.0 {
        (scaled + 0.5) as i32
    } else {
        (scaled - 0.5) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centivolts_rounds() {
        assert_eq!(centivolts(13.786), 1379);
        assert_eq!(centivolts(-0.014), -1);
        assert_eq!(centivolts(f32::NAN), 0);
    }
}
