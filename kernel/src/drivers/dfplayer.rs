// DFPlayer Mini MP3 module over UART (9600 8N1)
//
// Every command is one fixed 10-byte frame:
//   7E FF 06 CMD FB PH PL CSH CSL EF
// with the checksum the two's complement of bytes 1..=6. Feedback (FB)
// is left off. The only frames read back are the ones the module sends
// on its own after a reset: online (0x3F) once storage has mounted, or
// error (0x40).

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};
use log::{debug, info};

use crate::board::AudioPlayer;
use crate::config::MAX_VOLUME;

pub const FRAME_LEN: usize = 10;

const START: u8 = 0x7E;
const VERSION: u8 = 0xFF;
const LENGTH: u8 = 0x06;
const END: u8 = 0xEF;
const NO_FEEDBACK: u8 = 0x00;

// cold power-up to online takes 1-3 s
const BOOT_TIMEOUT_MS: u32 = 3000;
const POLL_MS: u32 = 10;

mod cmd {
    pub const PLAY_TRACK: u8 = 0x03;
    pub const SET_VOLUME: u8 = 0x06;
    pub const RESET: u8 = 0x0C;
    pub const STOP: u8 = 0x16;
    pub const ONLINE: u8 = 0x3F;
    pub const ERROR: u8 = 0x40;
}

#[derive(Debug)]
pub enum Error<E> {
    Serial(E),
    /// No online frame arrived within the boot timeout.
    NoReply,
    /// The module answered with an error frame.
    Module(u16),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Serial(e) => write!(f, "dfplayer serial: {:?}", e),
            Error::NoReply => f.write_str("dfplayer: no reply"),
            Error::Module(code) => write!(f, "dfplayer: module error {}", code),
        }
    }
}

fn checksum(body: &[u8]) -> u16 {
    let sum = body.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    0u16.wrapping_sub(sum)
}

pub fn frame(command: u8, param: u16) -> [u8; FRAME_LEN] {
    let [ph, pl] = param.to_be_bytes();
    let mut f = [START, VERSION, LENGTH, command, NO_FEEDBACK, ph, pl, 0, 0, END];
    let [ch, cl] = checksum(&f[1..7]).to_be_bytes();
    f[7] = ch;
    f[8] = cl;
    f
}

/// Validate a received frame; returns (command, parameter).
pub fn parse(f: &[u8; FRAME_LEN]) -> Option<(u8, u16)> {
    if f[0] != START || f[9] != END || f[2] != LENGTH {
        return None;
    }
    let sent = u16::from_be_bytes([f[7], f[8]]);
    if sent != checksum(&f[1..7]) {
        return None;
    }
    Some((f[3], u16::from_be_bytes([f[5], f[6]])))
}

pub struct DfPlayer<U, D> {
    serial: U,
    delay: D,
    rx: [u8; FRAME_LEN],
    rx_len: usize,
}

impl<U, D> DfPlayer<U, D>
where
    U: Read + Write + ReadReady,
    D: DelayNs,
{
    pub fn new(serial: U, delay: D) -> Self {
        Self {
            serial,
            delay,
            rx: [0; FRAME_LEN],
            rx_len: 0,
        }
    }

    pub fn send(&mut self, command: u8, param: u16) -> Result<(), Error<U::Error>> {
        debug!("dfplayer: cmd {:#04x} param {}", command, param);
        self.serial
            .write_all(&frame(command, param))
            .map_err(Error::Serial)?;
        self.serial.flush().map_err(Error::Serial)
    }

    /// Reset the module and wait for it to report online. Returns the
    /// storage mask from the online frame.
    pub fn reset(&mut self) -> Result<u16, Error<U::Error>> {
        self.rx_len = 0;
        self.send(cmd::RESET, 0)?;

        let mut waited = 0;
        loop {
            match self.poll_frame()? {
                Some((cmd::ONLINE, mask)) => return Ok(mask),
                Some((cmd::ERROR, code)) => return Err(Error::Module(code)),
                Some((other, _)) => debug!("dfplayer: skipped frame {:#04x}", other),
                None => {}
            }
            if waited >= BOOT_TIMEOUT_MS {
                return Err(Error::NoReply);
            }
            self.delay.delay_ms(POLL_MS);
            waited += POLL_MS;
        }
    }

    fn poll_frame(&mut self) -> Result<Option<(u8, u16)>, Error<U::Error>> {
        while self.serial.read_ready().map_err(Error::Serial)? {
            let mut byte = [0u8; 1];
            if self.serial.read(&mut byte).map_err(Error::Serial)? == 0 {
                break;
            }
            if let Some(parsed) = self.push(byte[0]) {
                return Ok(Some(parsed));
            }
        }
        Ok(None)
    }

    // resyncs on the start byte; a bad frame is dropped whole
    fn push(&mut self, byte: u8) -> Option<(u8, u16)> {
        if self.rx_len == 0 && byte != START {
            return None;
        }
        self.rx[self.rx_len] = byte;
        self.rx_len += 1;
        if self.rx_len < FRAME_LEN {
            return None;
        }
        self.rx_len = 0;
        parse(&self.rx)
    }

    pub fn release(self) -> (U, D) {
        (self.serial, self.delay)
    }
}

impl<U, D> AudioPlayer for DfPlayer<U, D>
where
    U: Read + Write + ReadReady,
    D: DelayNs,
{
    type Error = Error<U::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        let online = self.reset()?;
        info!("dfplayer: online, storage mask {:#04x}", online);
        Ok(())
    }

    fn play(&mut self, track: u16) -> Result<(), Self::Error> {
        self.send(cmd::PLAY_TRACK, track)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.send(cmd::STOP, 0)
    }

    fn set_volume(&mut self, level: u8) -> Result<(), Self::Error> {
        self.send(cmd::SET_VOLUME, level.min(MAX_VOLUME) as u16)
    }
}
