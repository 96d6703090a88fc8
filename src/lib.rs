// voltbar firmware: battery monitor on ESP32-C6 with an ST7789 TFT,
// DFPlayer audio and a 24C32 EEPROM

#![no_std]

pub mod board;
