// Touch debounce and long-press tracking
//
// One raw pressed/released sample per poll. A press only counts once it
// has been held continuously for the debounce window, which filters
// contact bounce and ghost touches. A release always wipes the whole
// per-touch record.
//
// 50ms debounce, 3s long-press-to-sleep (see settings for overrides).

use embedded_hal::digital::InputPin;

pub const DEBOUNCE_MS: u64 = 50;
pub const LONG_PRESS_MS: u64 = 3000;

/// Raw touch level from the panel controller.
pub trait TouchInput {
    fn is_pressed(&mut self) -> bool;
}

/// Touch-interrupt line of a panel controller wired to a GPIO.
///
/// Read errors count as "not pressed" so a flaky line can never hold
/// the screen awake.
pub struct PinTouch<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> PinTouch<P> {
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }
}

impl<P: InputPin> TouchInput for PinTouch<P> {
    fn is_pressed(&mut self) -> bool {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        level.unwrap_or(false)
    }
}

/// Debounced view of the current contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Released,
    /// Down, but not yet held for the debounce window.
    Settling,
    Confirmed,
}

/// Per-touch-cycle record. Never persisted, reset on every release.
#[derive(Debug, Clone, Copy)]
pub struct TouchTracker {
    debounce_ms: u64,
    press_start_ms: Option<u64>,
    debounce_confirmed: bool,
    activity_counted: bool,
    long_press_start_ms: Option<u64>,
    wait_for_release: bool,
}

impl TouchTracker {
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            press_start_ms: None,
            debounce_confirmed: false,
            activity_counted: false,
            long_press_start_ms: None,
            wait_for_release: false,
        }
    }

    /// Feed one raw sample taken at `now_ms`.
    pub fn sample(&mut self, pressed: bool, now_ms: u64) -> Contact {
        if !pressed {
            self.reset();
            return Contact::Released;
        }

        let start = *self.press_start_ms.get_or_insert(now_ms);
        if !self.debounce_confirmed && now_ms.saturating_sub(start) >= self.debounce_ms {
            self.debounce_confirmed = true;
        }

        if self.debounce_confirmed {
            Contact::Confirmed
        } else {
            Contact::Settling
        }
    }

    /// Clear every per-touch field.
    pub fn reset(&mut self) {
        *self = Self::new(self.debounce_ms);
    }

    /// Returns true the first time it is called for the current touch.
    pub fn count_activity(&mut self) -> bool {
        !core::mem::replace(&mut self.activity_counted, true)
    }

    /// Start timing a long press, or report how long the tracked one
    /// has been held.
    pub fn track_long_press(&mut self, now_ms: u64) -> Option<u64> {
        match self.long_press_start_ms {
            None => {
                self.long_press_start_ms = Some(now_ms);
                None
            }
            Some(start) => Some(now_ms.saturating_sub(start)),
        }
    }

    pub fn clear_long_press(&mut self) {
        self.long_press_start_ms = None;
    }

    /// Ignore the still-held finger until it is lifted.
    pub fn hold_until_release(&mut self) {
        self.wait_for_release = true;
    }

    pub fn set_debounce_ms(&mut self, debounce_ms: u64) {
        self.debounce_ms = debounce_ms;
    }

    pub fn is_touching(&self) -> bool {
        self.press_start_ms.is_some()
    }

    pub fn press_start_ms(&self) -> Option<u64> {
        self.press_start_ms
    }

    pub fn debounce_confirmed(&self) -> bool {
        self.debounce_confirmed
    }

    pub fn activity_counted(&self) -> bool {
        self.activity_counted
    }

    pub fn long_press_active(&self) -> bool {
        self.long_press_start_ms.is_some()
    }

    pub fn long_press_start_ms(&self) -> Option<u64> {
        self.long_press_start_ms
    }

    pub fn wait_for_release(&self) -> bool {
        self.wait_for_release
    }
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS)
    }
}
