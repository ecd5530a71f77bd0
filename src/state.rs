//! Shared application state
//!
//! The slice of application state the screensaver shares with the rest
//! of the firmware: the activity ledger, the configured timeout, the
//! current screen and the "screensaver active" mirror.
//!
//! Writes go through the state lock ([`SharedState::lock_for`]). The
//! mirror flag is an atomic so UI code can read it without locking,
//! at the cost of being at most one tick stale.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::kernel::{Held, SpinLock, TimedLock};
use crate::ui::ScreenId;

/// Fields guarded by the state lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateFields {
    /// Monotonic ms of the last recognised user interaction.
    pub last_activity_ms: u64,
    /// Idle seconds before the screensaver engages; 0 = never.
    pub timeout_sec: u16,
    pub current_screen: ScreenId,
}

pub struct SharedState {
    lock: SpinLock,
    screensaver_active: AtomicBool,
    fields: Mutex<CriticalSectionRawMutex, Cell<StateFields>>,
}

/// The state lock, held.
pub type StateGuard<'a> = Held<'a, SharedState>;

impl SharedState {
    pub const fn new(timeout_sec: u16) -> Self {
        Self {
            lock: SpinLock::new(),
            screensaver_active: AtomicBool::new(false),
            fields: Mutex::new(Cell::new(StateFields {
                last_activity_ms: 0,
                timeout_sec,
                current_screen: ScreenId::Main,
            })),
        }
    }

    pub fn lock_for(&self, timeout_ms: u32) -> Option<StateGuard<'_>> {
        Held::acquire(self, timeout_ms)
    }

    /// Lock-free read of the mirrored flag.
    #[inline]
    pub fn screensaver_active(&self) -> bool {
        self.screensaver_active.load(Ordering::Acquire)
    }

    /// Consistent copy of all guarded fields, taken without the state
    /// lock. Read-only; never use it to decide a write.
    pub fn snapshot(&self) -> StateFields {
        self.fields.lock(|f| f.get())
    }

    fn update(&self, f: impl FnOnce(&mut StateFields)) {
        self.fields.lock(|cell| {
            let mut fields = cell.get();
            f(&mut fields);
            cell.set(fields);
        });
    }
}

impl TimedLock for SharedState {
    fn try_lock_for(&self, timeout_ms: u32) -> bool {
        self.lock.try_lock_for(timeout_ms)
    }

    fn unlock(&self) {
        self.lock.unlock();
    }
}

impl Held<'_, SharedState> {
    pub fn fields(&self) -> StateFields {
        self.lock().snapshot()
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.fields().last_activity_ms
    }

    /// Record activity at `now_ms`. The ledger never moves backwards.
    pub fn stamp_activity(&self, now_ms: u64) {
        self.lock().update(|f| {
            f.last_activity_ms = f.last_activity_ms.max(now_ms);
        });
    }

    pub fn set_timeout_sec(&self, secs: u16) {
        self.lock().update(|f| f.timeout_sec = secs);
    }

    pub fn current_screen(&self) -> ScreenId {
        self.fields().current_screen
    }

    pub fn set_current_screen(&self, screen: ScreenId) {
        self.lock().update(|f| f.current_screen = screen);
    }

    pub fn set_screensaver_active(&self, active: bool) {
        self.lock()
            .screensaver_active
            .store(active, Ordering::Release);
    }
}
