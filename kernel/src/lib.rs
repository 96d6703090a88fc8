// Control core for the voltbar battery monitor
//
// Hardware-agnostic: everything talks to peripherals through the
// capability traits in board/ or embedded-hal. The firmware crate
// supplies concrete pins and buses; tests supply fakes and mocks.

#![cfg_attr(not(test), no_std)]

pub mod apps;
pub mod board;
pub mod config;
pub mod drivers;
pub mod kernel;
pub mod ui;

#[cfg(test)]
pub(crate) mod fakes;
