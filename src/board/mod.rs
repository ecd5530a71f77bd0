//! Tracker panel board support (ESP32-C3)
//!
//! Maps the panel's touch-interrupt line and backlight to the
//! controller's collaborators, so nothing else needs GPIO numbers.
//! This revision has no frame buffer of its own: the screensaver
//! "scene" is the panel with its backlight off.
//!
//! GPIO |     Function      |      Notes
//! -----+-------------------+----------------------------------
//!  2   | Backlight enable  | Active HIGH, panel dark when low
//!  7   | Touch INT         | Active LOW while a finger is down, internal pullup

use core::cell::RefCell;

use critical_section::Mutex;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::peripherals::{GPIO2, GPIO7};
use log::debug;

use crate::drivers::PinTouch;
use crate::kernel::{SpinLock, TimedLock};
use crate::ui::{Scene, ScreenId};

pub type Touch = PinTouch<Input<'static>>;

/// Backlight-only scene; shared with the render path through its lock.
pub struct BacklightScene {
    lock: SpinLock,
    backlight: Mutex<RefCell<Output<'static>>>,
}

impl BacklightScene {
    fn set_backlight(&self, on: bool) {
        critical_section::with(|cs| {
            let mut bl = self.backlight.borrow_ref_mut(cs);
            if on {
                bl.set_high();
            } else {
                bl.set_low();
            }
        });
    }
}

impl TimedLock for BacklightScene {
    fn try_lock_for(&self, timeout_ms: u32) -> bool {
        self.lock.try_lock_for(timeout_ms)
    }

    fn unlock(&self) {
        self.lock.unlock();
    }
}

impl Scene for BacklightScene {
    fn show_screen(&self, screen: ScreenId) {
        self.set_backlight(screen != ScreenId::Screensaver);
    }

    fn invalidate_and_redraw(&self, screen: ScreenId) {
        debug!("scene: full redraw of {}", screen);
    }

    fn refresh_screensaver(&self) {}
}

/// Complete board hardware, ready for the controller.
pub struct Board {
    pub touch: Touch,
    pub scene: BacklightScene,
}

impl Board {
    pub fn init(touch_int: GPIO7<'static>, backlight: GPIO2<'static>) -> Self {
        let touch = Input::new(touch_int, InputConfig::default().with_pull(Pull::Up));
        let backlight = Output::new(backlight, Level::High, OutputConfig::default());

        Board {
            touch: PinTouch::active_low(touch),
            scene: BacklightScene {
                lock: SpinLock::new(),
                backlight: Mutex::new(RefCell::new(backlight)),
            },
        }
    }
}
