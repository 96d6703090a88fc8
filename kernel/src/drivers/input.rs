// Debounced digital inputs
//
// Four buttons (Play, Stop, Record, Light) and the external trigger, all
// pulled up and active low. The whole snapshot must hold still for
// DEBOUNCE_MS before it replaces the stable one; longer timing (repeat
// gating, gestures) lives in the apps that consume the snapshot.

use embedded_hal::digital::InputPin;

use crate::board::{Button, ButtonLevels, Inputs};
use crate::kernel::clock::Instant;

const DEBOUNCE_MS: u64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Levels {
    buttons: ButtonLevels,
    trigger: bool,
}

pub struct InputDriver<P> {
    buttons: [P; 4],
    trigger: P,
    stable: Levels,
    candidate: Levels,
    candidate_since: Instant,
}

impl<P: InputPin> InputDriver<P> {
    /// `buttons` in [`Button::index`] order: Play, Stop, Record, Light.
    pub fn new(buttons: [P; 4], trigger: P) -> Self {
        Self {
            buttons,
            trigger,
            stable: Levels::default(),
            candidate: Levels::default(),
            candidate_since: Instant::ZERO,
        }
    }

    /// Sample every pin and combine with the sensor code into a tick
    /// snapshot. A pin that fails to read counts as released.
    pub fn poll(&mut self, now: Instant, sensor_code: u16) -> Inputs {
        let raw = self.read_raw();

        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since = now;
        }
        if now.millis_since(self.candidate_since) >= DEBOUNCE_MS {
            self.stable = self.candidate;
        }

        Inputs {
            sensor_code,
            buttons: self.stable.buttons,
            trigger_active: self.stable.trigger,
        }
    }

    fn read_raw(&mut self) -> Levels {
        let mut levels = Levels::default();
        for button in Button::ALL {
            let held = self.buttons[button.index()].is_low().unwrap_or(false);
            levels.buttons.set(button, held);
        }
        levels.trigger = self.trigger.is_low().unwrap_or(false);
        levels
    }

    pub fn is_debouncing(&self) -> bool {
        self.candidate != self.stable
    }

    pub fn release(self) -> ([P; 4], P) {
        (self.buttons, self.trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    fn pin(levels: &[State]) -> PinMock {
        let expectations: Vec<Transaction> = levels.iter().map(|&s| Transaction::get(s)).collect();
        PinMock::new(&expectations)
    }

    fn done(driver: InputDriver<PinMock>) {
        let (buttons, mut trigger) = driver.release();
        for mut b in buttons {
            b.done();
        }
        trigger.done();
    }

    #[test]
    fn press_must_settle_before_it_counts() {
        use State::{High, Low};
        // Play, Stop, Record, Light, trigger
        let mut driver = InputDriver::new(
            [
                pin(&[High, High, High]),
                pin(&[Low, Low, Low]),
                pin(&[High, High, High]),
                pin(&[High, High, High]),
            ],
            pin(&[Low, Low, Low]),
        );

        let first = driver.poll(Instant::from_millis(0), 100);
        assert_eq!(first.buttons, ButtonLevels::NONE);
        assert!(driver.is_debouncing());

        let early = driver.poll(Instant::from_millis(20), 100);
        assert!(!early.buttons.held(Button::Stop));

        let settled = driver.poll(Instant::from_millis(30), 101);
        assert!(settled.buttons.held(Button::Stop));
        assert!(!settled.buttons.held(Button::Play));
        assert!(settled.trigger_active);
        assert_eq!(settled.sensor_code, 101);
        assert!(!driver.is_debouncing());

        done(driver);
    }

    #[test]
    fn bounce_restarts_the_window() {
        use State::{High, Low};
        let mut driver = InputDriver::new(
            [
                pin(&[Low, High, Low, Low]),
                pin(&[High, High, High, High]),
                pin(&[High, High, High, High]),
                pin(&[High, High, High, High]),
            ],
            pin(&[High, High, High, High]),
        );

        driver.poll(Instant::from_millis(0), 0);
        driver.poll(Instant::from_millis(10), 0);
        driver.poll(Instant::from_millis(20), 0);
        let at_40 = driver.poll(Instant::from_millis(40), 0);
        // pressed again at 20, so not stable until 50
        assert!(!at_40.buttons.held(Button::Play));

        done(driver);
    }
}
