// embedded-graphics adapter for the board Display surface
//
// Any RGB565 DrawTarget that can bring itself up (see Panel) becomes a
// board::Display. Text is FONT_10X20 anchored at the top-left of the
// cursor; bitmaps are 1bpp ImageRaw with clear bits left untouched.

use embedded_graphics::image::{GetPixel, ImageRaw};
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::{BinaryColor, Rgb565, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::digital::OutputPin;

use crate::board::{Color, Display};
use crate::ui::widget::Region;

pub const FONT: &MonoFont<'static> = &FONT_10X20;

/// A draw target with its own power-up sequence.
pub trait Panel: DrawTarget<Color = Rgb565> {
    fn init(&mut self) -> Result<(), Self::Error>;
}

pub const fn rgb565(color: Color) -> Rgb565 {
    match color {
        Color::Off => Rgb565::BLACK,
        Color::White => Rgb565::WHITE,
        Color::Yellow => Rgb565::YELLOW,
        Color::Red => Rgb565::RED,
        Color::Green => Rgb565::GREEN,
        Color::Dim => Rgb565::new(6, 12, 6),
    }
}

#[derive(Debug)]
pub enum Error<T, B> {
    Panel(T),
    Backlight(B),
}

impl<T: core::fmt::Debug, B: core::fmt::Debug> core::fmt::Display for Error<T, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Panel(e) => write!(f, "panel: {:?}", e),
            Error::Backlight(e) => write!(f, "backlight: {:?}", e),
        }
    }
}

pub struct GraphicsDisplay<T, BL> {
    panel: T,
    backlight: BL,
    cursor: Point,
    fg: Rgb565,
    bg: Rgb565,
}

impl<T: Panel, BL: OutputPin> GraphicsDisplay<T, BL> {
    pub fn new(panel: T, backlight: BL) -> Self {
        Self {
            panel,
            backlight,
            cursor: Point::zero(),
            fg: Rgb565::WHITE,
            bg: Rgb565::BLACK,
        }
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn release(self) -> (T, BL) {
        (self.panel, self.backlight)
    }
}

impl<T, BL> Display for GraphicsDisplay<T, BL>
where
    T: Panel,
    T::Error: core::fmt::Debug,
    BL: OutputPin,
{
    type Error = Error<T::Error, BL::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.panel.init().map_err(Error::Panel)
    }

    fn clear(&mut self, color: Color) -> Result<(), Self::Error> {
        self.panel.clear(rgb565(color)).map_err(Error::Panel)
    }

    fn fill_region(&mut self, region: Region, color: Color) -> Result<(), Self::Error> {
        self.panel
            .fill_solid(&region.to_rect(), rgb565(color))
            .map_err(Error::Panel)
    }

    fn draw_bitmap(&mut self, region: Region, data: &[u8], color: Color) -> Result<(), Self::Error> {
        let raw = ImageRaw::<BinaryColor>::new(data, region.w as u32);
        let origin = region.top_left();
        let fg = rgb565(color);
        let h = region.h as i32;
        let w = region.w as i32;

        let pixels = (0..h)
            .flat_map(|y| (0..w).map(move |x| Point::new(x, y)))
            .filter(|&p| raw.pixel(p) == Some(BinaryColor::On))
            .map(|p| Pixel(origin + p, fg));
        self.panel.draw_iter(pixels).map_err(Error::Panel)
    }

    fn set_text_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Point::new(x as i32, y as i32);
    }

    fn set_text_color(&mut self, fg: Color, bg: Color) {
        self.fg = rgb565(fg);
        self.bg = rgb565(bg);
    }

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error> {
        let style = MonoTextStyleBuilder::new()
            .font(FONT)
            .text_color(self.fg)
            .background_color(self.bg)
            .build();
        self.cursor = Text::with_baseline(text, self.cursor, style, Baseline::Top)
            .draw(&mut self.panel)
            .map_err(Error::Panel)?;
        Ok(())
    }

    fn set_backlight(&mut self, level: u8) -> Result<(), Self::Error> {
        let result = if level > 0 {
            self.backlight.set_high()
        } else {
            self.backlight.set_low()
        };
        result.map_err(Error::Backlight)
    }
}
