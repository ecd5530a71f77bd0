// Bounded-wait locks and the ordered state/scene guard
//
// Every lock in this crate is taken with a timeout; a miss is a soft
// failure the caller retries on a later tick. Guards release on drop so
// early returns cannot leak a held lock.
//
// Lock order is fixed system-wide: state lock first, scene lock second,
// released in reverse.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_time::{Duration, Instant};

/// A lock that can be acquired with a bounded wait.
pub trait TimedLock {
    /// Try to take the lock, waiting at most `timeout_ms`.
    fn try_lock_for(&self, timeout_ms: u32) -> bool;
    fn unlock(&self);
}

impl<L: TimedLock + ?Sized> TimedLock for &L {
    fn try_lock_for(&self, timeout_ms: u32) -> bool {
        (**self).try_lock_for(timeout_ms)
    }

    fn unlock(&self) {
        (**self).unlock()
    }
}

/// Spin lock with a deadline.
///
/// Meant for resources shared with interrupt handlers or another
/// executor. A holder on the same cooperative executor can never
/// release while we spin, so the wait simply times out.
pub struct SpinLock {
    locked: AtomicBool,
}

impl SpinLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    // cs: riscv32imc has no compare-exchange
    fn try_take(&self) -> bool {
        critical_section::with(|_| {
            if self.locked.load(Ordering::Relaxed) {
                false
            } else {
                self.locked.store(true, Ordering::Relaxed);
                true
            }
        })
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimedLock for SpinLock {
    fn try_lock_for(&self, timeout_ms: u32) -> bool {
        if self.try_take() {
            return true;
        }
        let deadline = Instant::now() + Duration::from_millis(timeout_ms as u64);
        while Instant::now() < deadline {
            if self.try_take() {
                return true;
            }
            core::hint::spin_loop();
        }
        false
    }

    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// Scoped ownership of a [`TimedLock`]; unlocks on drop.
pub struct Held<'a, L: TimedLock + ?Sized> {
    lock: &'a L,
}

impl<'a, L: TimedLock + ?Sized> Held<'a, L> {
    pub fn acquire(lock: &'a L, timeout_ms: u32) -> Option<Self> {
        lock.try_lock_for(timeout_ms).then(|| Self { lock })
    }

    pub fn lock(&self) -> &'a L {
        self.lock
    }
}

impl<L: TimedLock + ?Sized> Drop for Held<'_, L> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

/// Which lock of the ordered pair could not be taken in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    State,
    Scene,
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::State => f.write_str("state lock busy"),
            LockError::Scene => f.write_str("scene lock busy"),
        }
    }
}

/// Both locks needed to mutate the screen, held in the fixed order.
pub struct DualGuard<'a, S: TimedLock + ?Sized, G: TimedLock + ?Sized> {
    // fields drop in declaration order: scene is released before state
    scene: Held<'a, G>,
    state: Held<'a, S>,
}

impl<'a, S: TimedLock + ?Sized, G: TimedLock + ?Sized> DualGuard<'a, S, G> {
    /// Take the state lock, then the scene lock. If the scene lock times
    /// out the state lock is released before returning.
    pub fn acquire(state: &'a S, scene: &'a G, timeout_ms: u32) -> Result<Self, LockError> {
        let state = Held::acquire(state, timeout_ms).ok_or(LockError::State)?;
        let scene = Held::acquire(scene, timeout_ms).ok_or(LockError::Scene)?;
        Ok(Self { scene, state })
    }

    pub fn state(&self) -> &Held<'a, S> {
        &self.state
    }

    pub fn scene(&self) -> &'a G {
        self.scene.lock()
    }
}
