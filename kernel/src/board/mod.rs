//! Capability interfaces between the control core and the hardware.
//!
//! The core never names a chip. It drives a [`Display`], an
//! [`AudioPlayer`], a [`NvStorage`] and an [`Indicator`], and receives a
//! per-tick [`Inputs`] snapshot. Drivers in `drivers/` implement these for
//! real parts; the firmware crate wires them to pins.

pub mod button;

pub use button::{Button, ButtonLevels, Inputs};

use crate::ui::widget::Region;

/// Logical colors used by the UI. Panels map these to their native format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Off,
    White,
    Yellow,
    Red,
    Green,
    Dim,
}

impl Color {
    pub const fn name(self) -> &'static str {
        match self {
            Color::Off => "off",
            Color::White => "white",
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Green => "green",
            Color::Dim => "dim",
        }
    }
}

impl core::fmt::Display for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Graphics output surface.
pub trait Display {
    type Error: core::fmt::Debug;

    /// Bring the panel up. Called once at boot; an error here is fatal.
    fn init(&mut self) -> Result<(), Self::Error>;

    fn clear(&mut self, color: Color) -> Result<(), Self::Error>;

    fn fill_region(&mut self, region: Region, color: Color) -> Result<(), Self::Error>;

    /// 1bpp bitmap, row-major, MSB first, rows padded to whole bytes.
    /// Set bits are drawn in `color`; clear bits are left untouched.
    fn draw_bitmap(&mut self, region: Region, data: &[u8], color: Color)
    -> Result<(), Self::Error>;

    fn set_text_cursor(&mut self, x: u16, y: u16);

    fn set_text_color(&mut self, fg: Color, bg: Color);

    /// Draw at the cursor and advance it past the text.
    fn write_text(&mut self, text: &str) -> Result<(), Self::Error>;

    fn set_backlight(&mut self, level: u8) -> Result<(), Self::Error>;
}

/// Track-based audio cue player.
pub trait AudioPlayer {
    type Error: core::fmt::Debug;

    /// Probe for the module and reset it. An error here is fatal at boot.
    fn init(&mut self) -> Result<(), Self::Error>;

    fn play(&mut self, track: u16) -> Result<(), Self::Error>;

    fn stop(&mut self) -> Result<(), Self::Error>;

    fn set_volume(&mut self, level: u8) -> Result<(), Self::Error>;
}

/// Word-addressed float storage that survives power loss.
///
/// Infallible by contract: implementations log bus faults and hand back
/// NaN from a failed read, which the config repair path then handles.
pub trait NvStorage {
    fn read_f32(&mut self, addr: u16) -> f32;

    fn write_f32(&mut self, addr: u16, value: f32);
}

/// Status LEDs driven as one group.
pub trait Indicator {
    fn set_all(&mut self, color: Color);
}

/// One-shot raw conversion from the battery sense channel.
pub trait SensorAdc {
    fn read_code(&mut self) -> u16;
}

/// Log and drop a peripheral error; the tick keeps running.
pub(crate) fn log_err<E: core::fmt::Debug>(what: &str, result: Result<(), E>) {
    if let Err(e) = result {
        log::warn!("{}: {:?}", what, e);
    }
}
