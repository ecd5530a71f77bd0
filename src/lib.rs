// Screensaver and display-power control for a touch-panel tracker
//
// Portable core (no_std): activity clock, awake/screensaver state
// machine, touch debounce + long-press-to-sleep, bounded-wait locking
// against the render path. Board wiring lives behind `esp32c3`.

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "esp32c3")]
pub mod board;
pub mod drivers;
pub mod kernel;
pub mod power;
pub mod settings;
pub mod state;
pub mod ui;

#[cfg(test)]
mod testing;
