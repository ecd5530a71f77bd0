// Display power control
//
// Two states, one transition function. Everything that can turn the
// screen off or on (idle timeout, long press, touch wake, settings UI)
// goes through Screensaver::set_active.

pub mod screensaver;

pub use screensaver::Screensaver;

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    #[default]
    Awake,
    Screensaver,
}

impl PowerState {
    pub const fn from_active(screensaver_active: bool) -> Self {
        if screensaver_active {
            PowerState::Screensaver
        } else {
            PowerState::Awake
        }
    }

    pub const fn is_screensaver(self) -> bool {
        matches!(self, PowerState::Screensaver)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::Awake => f.write_str("awake"),
            PowerState::Screensaver => f.write_str("screensaver"),
        }
    }
}
