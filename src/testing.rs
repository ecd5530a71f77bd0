// Host test doubles for the controller's collaborators.

use std::cell::{Cell, RefCell};
use std::vec::Vec;

use crate::drivers::power_lock::FreqLock;
use crate::drivers::touch::TouchInput;
use crate::kernel::{Clock, TimedLock};
use crate::ui::{Scene, ScreenId};

#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn at(ms: u64) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Debug, Default)]
pub struct FakeFreqLock {
    pub creates: u32,
    pub acquires: u32,
    pub releases: u32,
    pub fail_create: bool,
    pub fail_acquire: bool,
    pub fail_release: bool,
}

impl FreqLock for FakeFreqLock {
    type Error = &'static str;

    fn create(&mut self) -> Result<(), Self::Error> {
        self.creates += 1;
        if self.fail_create { Err("no pm") } else { Ok(()) }
    }

    fn acquire(&mut self) -> Result<(), Self::Error> {
        self.acquires += 1;
        if self.fail_acquire { Err("acquire") } else { Ok(()) }
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.releases += 1;
        if self.fail_release { Err("release") } else { Ok(()) }
    }
}

/// Touch level shared with the test body.
pub struct FakeTouch<'a>(pub &'a Cell<bool>);

impl TouchInput for FakeTouch<'_> {
    fn is_pressed(&mut self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCall {
    Show(ScreenId),
    Redraw(ScreenId),
    RefreshScreensaver,
}

/// Scene that records calls and checks they happen under its lock.
#[derive(Default)]
pub struct RecordingScene {
    pub busy: Cell<bool>,
    locked: Cell<bool>,
    pub calls: RefCell<Vec<SceneCall>>,
}

impl RecordingScene {
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    pub fn take_calls(&self) -> Vec<SceneCall> {
        core::mem::take(&mut *self.calls.borrow_mut())
    }

    fn record(&self, call: SceneCall) {
        assert!(self.locked.get(), "{:?} outside the scene lock", call);
        self.calls.borrow_mut().push(call);
    }
}

impl TimedLock for RecordingScene {
    fn try_lock_for(&self, _timeout_ms: u32) -> bool {
        if self.busy.get() || self.locked.get() {
            return false;
        }
        self.locked.set(true);
        true
    }

    fn unlock(&self) {
        self.locked.set(false);
    }
}

impl Scene for RecordingScene {
    fn show_screen(&self, screen: ScreenId) {
        self.record(SceneCall::Show(screen));
    }

    fn invalidate_and_redraw(&self, screen: ScreenId) {
        self.record(SceneCall::Redraw(screen));
    }

    fn refresh_screensaver(&self) {
        self.record(SceneCall::RefreshScreensaver);
    }
}
