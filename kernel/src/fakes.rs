// Test doubles for the capability traits. Each records what the core
// asked of it so tests can assert on the call sequence.

use std::string::String;
use std::vec::Vec;

use crate::board::{AudioPlayer, Color, Display, Indicator, NvStorage};
use crate::ui::widget::Region;

pub struct RamStorage {
    mem: [u8; 256],
    pub writes: usize,
}

impl RamStorage {
    pub fn new() -> Self {
        Self {
            mem: [0; 256],
            writes: 0,
        }
    }

    /// Contents of a never-written EEPROM.
    pub fn erased() -> Self {
        Self {
            mem: [0xFF; 256],
            writes: 0,
        }
    }
}

impl NvStorage for RamStorage {
    fn read_f32(&mut self, addr: u16) -> f32 {
        let a = addr as usize;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.mem[a..a + 4]);
        f32::from_le_bytes(bytes)
    }

    fn write_f32(&mut self, addr: u16, value: f32) {
        let a = addr as usize;
        self.mem[a..a + 4].copy_from_slice(&value.to_le_bytes());
        self.writes += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Init,
    Play(u16),
    Stop,
    Volume(u8),
}

#[derive(Default)]
pub struct FakeAudio {
    pub calls: Vec<AudioCall>,
    pub missing: bool,
}

impl FakeAudio {
    pub fn plays(&self, track: u16) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == AudioCall::Play(track))
            .count()
    }

    pub fn stops(&self) -> usize {
        self.calls.iter().filter(|c| **c == AudioCall::Stop).count()
    }
}

impl AudioPlayer for FakeAudio {
    type Error = &'static str;

    fn init(&mut self) -> Result<(), Self::Error> {
        if self.missing {
            return Err("no reply");
        }
        self.calls.push(AudioCall::Init);
        Ok(())
    }

    fn play(&mut self, track: u16) -> Result<(), Self::Error> {
        self.calls.push(AudioCall::Play(track));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.calls.push(AudioCall::Stop);
        Ok(())
    }

    fn set_volume(&mut self, level: u8) -> Result<(), Self::Error> {
        self.calls.push(AudioCall::Volume(level));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Init,
    Clear(Color),
    Fill(Region, Color),
    Bitmap(Region, Color),
    Text(u16, u16, String),
    Backlight(u8),
}

#[derive(Default)]
pub struct FakeDisplay {
    pub ops: Vec<DrawOp>,
    pub broken: bool,
    cursor: (u16, u16),
}

impl FakeDisplay {
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(_, _, s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fills_of(&self, region: Region) -> Vec<Color> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill(r, c) if *r == region => Some(*c),
                _ => None,
            })
            .collect()
    }

    pub fn take(&mut self) -> Vec<DrawOp> {
        core::mem::take(&mut self.ops)
    }
}

impl Display for FakeDisplay {
    type Error = &'static str;

    fn init(&mut self) -> Result<(), Self::Error> {
        if self.broken {
            return Err("panel not responding");
        }
        self.ops.push(DrawOp::Init);
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Clear(color));
        Ok(())
    }

    fn fill_region(&mut self, region: Region, color: Color) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Fill(region, color));
        Ok(())
    }

    fn draw_bitmap(
        &mut self,
        region: Region,
        _data: &[u8],
        color: Color,
    ) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Bitmap(region, color));
        Ok(())
    }

    fn set_text_cursor(&mut self, x: u16, y: u16) {
        self.cursor = (x, y);
    }

    fn set_text_color(&mut self, _fg: Color, _bg: Color) {}

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error> {
        self.ops
            .push(DrawOp::Text(self.cursor.0, self.cursor.1, String::from(text)));
        Ok(())
    }

    fn set_backlight(&mut self, level: u8) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Backlight(level));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeIndicator {
    pub history: Vec<Color>,
}

impl Indicator for FakeIndicator {
    fn set_all(&mut self, color: Color) {
        self.history.push(color);
    }
}
