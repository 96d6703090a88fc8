// Hardware drivers: chip-level and protocol-level, board-independent.
//
// Each module is generic over embedded-hal / embedded-io traits; only
// pin assignments and bus setup (in the firmware crate) are
// board-specific.

pub mod battery;
pub mod dfplayer;
pub mod display;
pub mod eeprom;
pub mod input;
pub mod led;
pub mod st7789;
pub mod storage;
