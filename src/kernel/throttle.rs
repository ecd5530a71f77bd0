// Fixed-cadence gate
//
// `due()` answers true at most once per period. The first call is
// always due so a fresh throttle fires immediately.

#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    period_ms: u64,
    last_ms: Option<u64>,
}

impl Throttle {
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last_ms: None,
        }
    }

    pub fn due(&mut self, now_ms: u64) -> bool {
        match self.last_ms {
            Some(last) if now_ms.saturating_sub(last) < self.period_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    /// Treat `now_ms` as the last firing.
    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }

    pub fn set_period(&mut self, period_ms: u64) {
        self.period_ms = period_ms;
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
