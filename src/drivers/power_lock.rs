// CPU-frequency power lock adapter
//
// Held while the screen is on so touch handling and rendering run at
// full clock; released in screensaver so the platform may scale down.
// Best effort throughout: failures are logged and swallowed, and if the
// lock could not be created at boot every later call is a no-op.

use core::convert::Infallible;
use core::fmt;

use log::{info, warn};

/// Platform power-management lock (e.g. a DFS "max CPU freq" lock).
pub trait FreqLock {
    type Error: fmt::Debug;

    fn create(&mut self) -> Result<(), Self::Error>;
    fn acquire(&mut self) -> Result<(), Self::Error>;
    fn release(&mut self) -> Result<(), Self::Error>;
}

/// For targets without frequency scaling.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFreqLock;

impl FreqLock for NoFreqLock {
    type Error = Infallible;

    fn create(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn acquire(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Uncreated,
    /// Creation failed; scaling stays wherever the platform left it.
    Unavailable,
    Released,
    Held,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LockState::Uncreated => "uncreated",
            LockState::Unavailable => "unavailable",
            LockState::Released => "released",
            LockState::Held => "held",
        };
        f.write_str(s)
    }
}

pub struct PowerLockAdapter<L> {
    lock: L,
    state: LockState,
}

impl<L: FreqLock> PowerLockAdapter<L> {
    pub const fn new(lock: L) -> Self {
        Self {
            lock,
            state: LockState::Uncreated,
        }
    }

    /// Create the platform lock. Only the first call does anything.
    pub fn create(&mut self) {
        if self.state != LockState::Uncreated {
            return;
        }
        match self.lock.create() {
            Ok(()) => {
                self.state = LockState::Released;
                info!("power lock: created");
            }
            Err(e) => {
                self.state = LockState::Unavailable;
                warn!("power lock: create failed ({:?}), frequency scaling left alone", e);
            }
        }
    }

    pub fn on_screen_on(&mut self) {
        if self.state != LockState::Released {
            return;
        }
        match self.lock.acquire() {
            Ok(()) => self.state = LockState::Held,
            Err(e) => warn!("power lock: acquire failed: {:?}", e),
        }
    }

    pub fn on_screen_off(&mut self) {
        if self.state != LockState::Held {
            return;
        }
        match self.lock.release() {
            Ok(()) => self.state = LockState::Released,
            Err(e) => warn!("power lock: release failed: {:?}", e),
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_held(&self) -> bool {
        self.state == LockState::Held
    }

    pub fn inner(&self) -> &L {
        &self.lock
    }

    pub fn inner_mut(&mut self) -> &mut L {
        &mut self.lock
    }
}
