// Timing and locking primitives shared by the controller
//
// clock:    monotonic ms since boot
// lock:     bounded-wait locks, RAII guards, ordered state/scene pair
// throttle: at-most-once-per-period gate
// poll:     driver poll-rate policy

pub mod clock;
pub mod lock;
pub mod poll;
pub mod throttle;

pub use clock::{Clock, EmbassyClock};
pub use lock::{DualGuard, Held, LockError, SpinLock, TimedLock};
pub use poll::PollRate;
pub use throttle::Throttle;
