//! Button definitions and the per-tick input snapshot.
//!
//! Four momentary buttons plus one external trigger, all pulled up and
//! active low. The snapshot is taken once per tick so every phase of the
//! tick sees the same levels.

/// All physical buttons on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Play,
    Stop,
    Record,
    Light,
}

impl Button {
    /// Priority order when several buttons are held at once.
    pub const ALL: [Button; 4] = [Button::Play, Button::Stop, Button::Record, Button::Light];

    pub const fn index(self) -> usize {
        match self {
            Button::Play => 0,
            Button::Stop => 1,
            Button::Record => 2,
            Button::Light => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Button::Play => "Play",
            Button::Stop => "Stop",
            Button::Record => "Record",
            Button::Light => "Light",
        }
    }
}

impl core::fmt::Display for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Held/released state of all buttons, one bit per [`Button::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonLevels(u8);

impl ButtonLevels {
    pub const NONE: Self = Self(0);

    pub const fn held(self, button: Button) -> bool {
        self.0 & (1 << button.index()) != 0
    }

    pub const fn with(self, button: Button) -> Self {
        Self(self.0 | (1 << button.index()))
    }

    pub fn set(&mut self, button: Button, held: bool) {
        if held {
            self.0 |= 1 << button.index();
        } else {
            self.0 &= !(1 << button.index());
        }
    }

    pub const fn any(self) -> bool {
        self.0 != 0
    }

    /// First held button in [`Button::ALL`] order.
    pub fn first_held(self) -> Option<Button> {
        Button::ALL.into_iter().find(|&b| self.held(b))
    }
}

/// Everything the tick reads from the outside world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    /// Raw converter code from the battery sense divider.
    pub sensor_code: u16,
    pub buttons: ButtonLevels,
    pub trigger_active: bool,
}

impl Inputs {
    pub const fn new(sensor_code: u16) -> Self {
        Self {
            sensor_code,
            buttons: ButtonLevels::NONE,
            trigger_active: false,
        }
    }

    pub const fn pressing(mut self, button: Button) -> Self {
        self.buttons = self.buttons.with(button);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_track_each_button_independently() {
        let mut levels = ButtonLevels::NONE.with(Button::Stop);
        assert!(levels.held(Button::Stop));
        assert!(!levels.held(Button::Play));

        levels.set(Button::Light, true);
        levels.set(Button::Stop, false);
        assert!(!levels.held(Button::Stop));
        assert!(levels.held(Button::Light));
        assert!(levels.any());
    }

    #[test]
    fn first_held_follows_priority_order() {
        let levels = ButtonLevels::NONE.with(Button::Light).with(Button::Stop);
        assert_eq!(levels.first_held(), Some(Button::Stop));
        assert_eq!(ButtonLevels::NONE.first_held(), None);
    }
}
