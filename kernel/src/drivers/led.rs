// Single status LED used as the Indicator. Any color other than Off
// lights it.

use embedded_hal::digital::OutputPin;

use crate::board::{Color, Indicator, log_err};

pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, lit: false }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Indicator for StatusLed<P> {
    fn set_all(&mut self, color: Color) {
        self.lit = color != Color::Off;
        let result = if self.lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        log_err("led", result);
    }
}
