// Poll-rate policy for the periodic driver
//
// Awake, or finger on the panel: poll fast so the 50ms debounce and
// the long-press timer resolve promptly.
// Screensaver with nothing touching: poll slower, waking takes at
// most one extra period.

use core::fmt;

/// Base driver period (ms)
pub const BASE_TICK_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollRate {
    #[default]
    Fast,
    Slow,
}

impl PollRate {
    // base ticks between polls at this rate
    pub const fn divisor(self) -> u32 {
        match self {
            PollRate::Fast => 1,
            PollRate::Slow => 5,
        }
    }

    pub const fn interval_ms(self) -> u32 {
        self.divisor() * BASE_TICK_MS
    }

    pub const fn select(screensaver_active: bool, touching: bool) -> Self {
        if screensaver_active && !touching {
            PollRate::Slow
        } else {
            PollRate::Fast
        }
    }
}

impl fmt::Display for PollRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollRate::Fast => write!(f, "Fast({}ms)", self.interval_ms()),
            PollRate::Slow => write!(f, "Slow({}ms)", self.interval_ms()),
        }
    }
}
