// ST7789 TFT driver (board-independent)
// 320x240 landscape, RGB565 over 4-wire SPI. No framebuffer; every
// draw opens a RAM window and streams pixels into it, so large solid
// fills go through a chunked fast path. MISO is only used once, to read
// the panel ID at init.

use core::fmt;

use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{Dimensions, OriginDimensions, Size};
use embedded_graphics_core::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics_core::primitives::Rectangle;
use embedded_graphics_core::Pixel;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};

use log::debug;

use super::display::Panel;

pub const WIDTH: u16 = 320;
pub const HEIGHT: u16 = 240;

pub const SPI_FREQ_MHZ: u32 = 40;

// pixels per SPI write in fill_solid
const FILL_CHUNK_PX: usize = 64;

mod cmd {
    pub const SW_RESET: u8 = 0x01;
    pub const READ_ID: u8 = 0x04;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const NORMAL_ON: u8 = 0x13;
    pub const INVERT_ON: u8 = 0x21;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDR: u8 = 0x2A;
    pub const ROW_ADDR: u8 = 0x2B;
    pub const WRITE_RAM: u8 = 0x2C;
    pub const MEMORY_ACCESS: u8 = 0x36;
    pub const PIXEL_FORMAT: u8 = 0x3A;
}

// MADCTL: row/column exchange + column mirror = landscape
const MADCTL_LANDSCAPE: u8 = 0x60;
// COLMOD: 16 bits per pixel
const COLMOD_RGB565: u8 = 0x55;

#[derive(Debug)]
pub enum Error<S, P> {
    Spi(S),
    Pin(P),
    /// ID read back as all zeros or all ones: nothing is driving MISO.
    Absent,
}

impl<S: fmt::Debug, P: fmt::Debug> fmt::Display for Error<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "st7789 spi: {:?}", e),
            Error::Pin(e) => write!(f, "st7789 pin: {:?}", e),
            Error::Absent => f.write_str("st7789: no panel answered RDDID"),
        }
    }
}

pub struct St7789<SPI, DC, RST, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    delay: D,
}

impl<SPI, DC, RST, D, PE> St7789<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = PE>,
    RST: OutputPin<Error = PE>,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, delay: D) -> Self {
        Self { spi, dc, rst, delay }
    }

    pub fn reset(&mut self) -> Result<(), Error<SPI::Error, PE>> {
        self.rst.set_high().map_err(Error::Pin)?;
        self.delay.delay_ms(10);
        self.rst.set_low().map_err(Error::Pin)?;
        self.delay.delay_ms(10);
        self.rst.set_high().map_err(Error::Pin)?;
        self.delay.delay_ms(120);
        Ok(())
    }

    /// RDDID. In 4-wire mode one dummy clock precedes the 24 ID bits, so
    /// four bytes are clocked in and shifted back into line.
    pub fn read_id(&mut self) -> Result<[u8; 3], Error<SPI::Error, PE>> {
        let mut raw = [0u8; 4];
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi
            .transaction(&mut [Operation::Write(&[cmd::READ_ID]), Operation::Read(&mut raw)])
            .map_err(Error::Spi)?;
        self.dc.set_high().map_err(Error::Pin)?;

        let [a, b, c, _] = (u32::from_be_bytes(raw) << 1).to_be_bytes();
        Ok([a, b, c])
    }

    fn init_display(&mut self) -> Result<(), Error<SPI::Error, PE>> {
        self.send_command(cmd::SW_RESET)?;
        self.delay.delay_ms(150);

        self.send_command(cmd::SLEEP_OUT)?;
        self.delay.delay_ms(10);

        self.send_command(cmd::PIXEL_FORMAT)?;
        self.send_data(&[COLMOD_RGB565])?;

        self.send_command(cmd::MEMORY_ACCESS)?;
        self.send_data(&[MADCTL_LANDSCAPE])?;

        // IPS panels ship with inverted polarity
        self.send_command(cmd::INVERT_ON)?;
        self.send_command(cmd::NORMAL_ON)?;
        self.delay.delay_ms(10);

        self.send_command(cmd::DISPLAY_ON)?;
        self.delay.delay_ms(10);
        Ok(())
    }

    /// Open an inclusive RAM window and leave the controller in write mode.
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Error<SPI::Error, PE>> {
        self.send_command(cmd::COLUMN_ADDR)?;
        self.send_data(&[(x0 >> 8) as u8, x0 as u8, (x1 >> 8) as u8, x1 as u8])?;
        self.send_command(cmd::ROW_ADDR)?;
        self.send_data(&[(y0 >> 8) as u8, y0 as u8, (y1 >> 8) as u8, y1 as u8])?;
        self.send_command(cmd::WRITE_RAM)
    }

    fn send_command(&mut self, cmd: u8) -> Result<(), Error<SPI::Error, PE>> {
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi.write(&[cmd]).map_err(Error::Spi)?;
        self.dc.set_high().map_err(Error::Pin)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Error<SPI::Error, PE>> {
        self.dc.set_high().map_err(Error::Pin)?;
        self.spi.write(data).map_err(Error::Spi)
    }

    pub fn release(self) -> (SPI, DC, RST, D) {
        (self.spi, self.dc, self.rst, self.delay)
    }
}

impl<SPI, DC, RST, D> OriginDimensions for St7789<SPI, DC, RST, D> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<SPI, DC, RST, D, PE> DrawTarget for St7789<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = PE>,
    RST: OutputPin<Error = PE>,
    D: DelayNs,
{
    type Color = Rgb565;
    type Error = Error<SPI::Error, PE>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x < 0 || p.y < 0 || p.x >= WIDTH as i32 || p.y >= HEIGHT as i32 {
                continue;
            }
            let (x, y) = (p.x as u16, p.y as u16);
            self.set_window(x, y, x, y)?;
            self.send_data(&color.into_storage().to_be_bytes())?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        self.set_window(
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        )?;

        let [hi, lo] = color.into_storage().to_be_bytes();
        let mut chunk = [0u8; FILL_CHUNK_PX * 2];
        for px in chunk.chunks_exact_mut(2) {
            px[0] = hi;
            px[1] = lo;
        }

        let mut remaining = area.size.width as usize * area.size.height as usize;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK_PX);
            self.send_data(&chunk[..n * 2])?;
            remaining -= n;
        }
        Ok(())
    }
}

impl<SPI, DC, RST, D, PE> Panel for St7789<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin<Error = PE>,
    RST: OutputPin<Error = PE>,
    D: DelayNs,
{
    fn init(&mut self) -> Result<(), Self::Error> {
        self.reset()?;
        let id = self.read_id()?;
        if id == [0x00; 3] || id == [0xFF; 3] {
            return Err(Error::Absent);
        }
        debug!("st7789: id {:02x}{:02x}{:02x}", id[0], id[1], id[2]);
        self.init_display()
    }
}
