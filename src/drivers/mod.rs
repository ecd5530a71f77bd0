// Input and power drivers, board-independent.
//
// Pin assignments and the concrete platform lock live in board/.

pub mod power_lock;
pub mod touch;

pub use power_lock::{FreqLock, LockState, NoFreqLock, PowerLockAdapter};
pub use touch::{Contact, PinTouch, TouchInput, TouchTracker};
