// Monotonic millisecond clock
//
// Milliseconds since boot as u64. At 1 kHz a u64 does not wrap within
// any realistic uptime, so callers subtract timestamps directly.

use embassy_time::Instant;

/// Source of "now" for the activity ledger and touch timing.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Clock backed by the embassy time driver (esp-rtos on target,
/// the std driver on the host).
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
