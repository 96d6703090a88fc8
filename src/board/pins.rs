//! GPIO |     Function       |      Notes
//! -----+--------------------+----------------------------------
//!  0   | ADC1 - Battery     | Divider tap, 11 dB, curve-calibrated mV
//!  1   | TFT backlight      | Active high
//!  2   | I2C0 SDA           | 24C32 EEPROM, external 4.7K pull-up
//!  3   | I2C0 SCL           |
//!  5   | SPI2 MISO          | ST7789 SDO, read once for the panel ID
//!  6   | SPI2 SCK           | ST7789 clock
//!  7   | SPI2 MOSI          | ST7789 SDA
//! 10   | TFT RST            | Active low
//! 11   | TFT DC             | Data/Command select
//! 14   | TFT CS             |
//! 16   | UART1 TX           | -> DFPlayer RX, 9600 8N1
//! 17   | UART1 RX           | <- DFPlayer TX
//! 18   | Button Play        | Active LOW, internal pullup
//! 19   | Button Stop        | Active LOW, internal pullup
//! 20   | Button Record      | Active LOW, internal pullup
//! 21   | Button Light       | Active LOW, internal pullup
//! 22   | Trigger input      | Active LOW, internal pullup
//! 23   | Status LED         | Active high
//! 12/13| USB-Serial-JTAG    | Log console

// ----- Battery -----
pub const BATTERY_ADC: u8 = 0;

// ----- EEPROM (I2C) -----
pub const I2C_SDA: u8 = 2;
pub const I2C_SCL: u8 = 3;
pub const I2C_FREQ_KHZ: u32 = 400;

// ----- TFT (SPI) -----
pub const TFT_SCK: u8 = 6;
pub const TFT_MOSI: u8 = 7;
pub const TFT_MISO: u8 = 5;
pub const TFT_RST: u8 = 10;
pub const TFT_DC: u8 = 11;
pub const TFT_CS: u8 = 14;
pub const TFT_BL: u8 = 1;

// ----- Audio (UART1) -----
pub const AUDIO_TX: u8 = 16;
pub const AUDIO_RX: u8 = 17;
pub const AUDIO_BAUD: u32 = 9600;

// ----- Buttons (digital) -----
pub const BTN_PLAY: u8 = 18;
pub const BTN_STOP: u8 = 19;
pub const BTN_RECORD: u8 = 20;
pub const BTN_LIGHT: u8 = 21;

// ----- Trigger + indicator -----
pub const TRIGGER: u8 = 22;
pub const STATUS_LED: u8 = 23;
