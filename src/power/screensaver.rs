//! Screensaver controller
//!
//! Owns the awake/screensaver state machine, the per-touch tracking and
//! the screen to restore on wake. Driven by [`Screensaver::tick`] from a
//! fixed-rate loop; no threads of its own.
//!
//! Per tick, in order:
//!   1. in screensaver, refresh the screensaver visual (throttled)
//!   2. awake with a timeout set: enter screensaver once idle long enough
//!   3. sample the touch panel and run wake / activity / long-press
//!
//! Lock contention never loses a transition: the condition that asked
//! for it (idle time, finger on glass) is still true on the next tick.

use log::{debug, info, warn};

use crate::drivers::power_lock::{FreqLock, PowerLockAdapter};
use crate::drivers::touch::{Contact, TouchInput, TouchTracker};
use crate::kernel::{Clock, DualGuard, Held, PollRate, Throttle};
use crate::power::PowerState;
use crate::settings::ScreensaverSettings;
use crate::state::SharedState;
use crate::ui::{Scene, ScreenId};

const ELAPSED_LOG_MS: u64 = 30_000;
const TOUCH_LOG_MS: u64 = 5_000;

pub struct Screensaver<'a, C, S, L, T> {
    clock: C,
    state: &'a SharedState,
    scene: S,
    power: PowerLockAdapter<L>,
    touch: T,
    settings: ScreensaverSettings,

    power_state: PowerState,
    tracker: TouchTracker,
    previous_screen: Option<ScreenId>,
    // init could not stamp the ledger; tick retries before any idle check
    init_pending: bool,

    visual_refresh: Throttle,
    elapsed_log: Throttle,
    touch_log: Throttle,
}

impl<'a, C, S, L, T> Screensaver<'a, C, S, L, T>
where
    C: Clock,
    S: Scene,
    L: FreqLock,
    T: TouchInput,
{
    pub fn new(
        clock: C,
        state: &'a SharedState,
        scene: S,
        freq_lock: L,
        touch: T,
        settings: ScreensaverSettings,
    ) -> Self {
        Self {
            clock,
            state,
            scene,
            power: PowerLockAdapter::new(freq_lock),
            touch,
            settings,
            power_state: PowerState::Awake,
            tracker: TouchTracker::new(settings.debounce_ms as u64),
            previous_screen: None,
            init_pending: false,
            visual_refresh: Throttle::new(settings.refresh_interval_ms as u64),
            elapsed_log: Throttle::new(ELAPSED_LOG_MS),
            touch_log: Throttle::new(TOUCH_LOG_MS),
        }
    }

    /// Start in the awake state with the activity clock at "now" and the
    /// power lock held.
    pub fn init(&mut self) {
        self.tracker.reset();
        self.previous_screen = None;
        self.power_state = PowerState::Awake;
        self.visual_refresh.reset();
        self.elapsed_log.reset();
        self.touch_log.reset();

        let now = self.clock.now_ms();
        self.init_pending = !self.init_ledger(now);
        if self.init_pending {
            warn!("screensaver: state lock busy during init, retrying on tick");
        }

        self.power.create();
        self.power.on_screen_on();

        info!(
            "screensaver: initialized (timeout {}s, long press {}ms)",
            self.settings.timeout_sec, self.settings.long_press_ms
        );
    }

    /// The one transition function. `true` enters screensaver, `false`
    /// wakes. Returns true only if the state actually changed.
    pub fn set_active(&mut self, active: bool) -> bool {
        let target = PowerState::from_active(active);
        if self.power_state == target {
            return false;
        }

        let guard = match DualGuard::acquire(
            self.state,
            &self.scene,
            self.settings.lock_timeout_ms as u32,
        ) {
            Ok(guard) => guard,
            Err(e) => {
                warn!(
                    "screensaver: {} -> {} deferred: {}",
                    self.power_state, target, e
                );
                return false;
            }
        };
        let state = guard.state();
        let scene = guard.scene();
        let now = self.clock.now_ms();

        match target {
            PowerState::Screensaver => {
                let current = state.current_screen();
                if current != ScreenId::Screensaver {
                    self.previous_screen = Some(current);
                }
                scene.refresh_screensaver();
                scene.show_screen(ScreenId::Screensaver);
                state.set_current_screen(ScreenId::Screensaver);
                self.power.on_screen_off();
                self.visual_refresh.mark(now);
            }
            PowerState::Awake => {
                self.power.on_screen_on();
                let screen = self.previous_screen.take().unwrap_or_else(|| {
                    warn!("screensaver: no screen to restore, using {}", ScreenId::Main);
                    ScreenId::Main
                });
                scene.show_screen(screen);
                // partial updates leave compositing artifacts behind
                scene.invalidate_and_redraw(screen);
                state.set_current_screen(screen);
            }
        }

        state.set_screensaver_active(active);
        // entering screensaver counts as activity so the timeout does
        // not refire; waking restarts the countdown from now
        state.stamp_activity(now);
        self.power_state = target;
        self.tracker.clear_long_press();

        info!(
            "screensaver: {}",
            if active { "on (screen off)" } else { "off (screen on)" }
        );
        true
    }

    /// Mirrored flag, may lag a transition by one tick.
    pub fn is_active(&self) -> bool {
        self.state.screensaver_active()
    }

    /// Best effort: dropped if the state lock is busy.
    pub fn reset_activity(&self) {
        self.stamp_activity(self.clock.now_ms());
    }

    pub fn elapsed_since_activity_ms(&self) -> u64 {
        self.clock
            .now_ms()
            .saturating_sub(self.state.snapshot().last_activity_ms)
    }

    /// Change the idle timeout (0 disables it). The countdown restarts
    /// from now.
    pub fn set_timeout(&mut self, timeout_sec: u16) -> bool {
        let Some(state) = self.state.lock_for(self.settings.lock_timeout_ms as u32) else {
            warn!("screensaver: state lock busy, timeout unchanged");
            return false;
        };
        state.set_timeout_sec(timeout_sec);
        state.stamp_activity(self.clock.now_ms());
        self.settings.timeout_sec = timeout_sec;
        info!("screensaver: timeout set to {}s", timeout_sec);
        true
    }

    /// Swap in new settings, e.g. after the settings file is reloaded.
    /// Returns false if the new timeout could not be stored; the old one
    /// stays in force and a later call retries it.
    pub fn apply_settings(&mut self, settings: ScreensaverSettings) -> bool {
        self.tracker.set_debounce_ms(settings.debounce_ms as u64);
        self.visual_refresh
            .set_period(settings.refresh_interval_ms as u64);
        self.settings = ScreensaverSettings {
            timeout_sec: self.settings.timeout_sec,
            ..settings
        };

        if self.state.snapshot().timeout_sec == settings.timeout_sec {
            self.settings.timeout_sec = settings.timeout_sec;
            return true;
        }
        self.set_timeout(settings.timeout_sec)
    }

    pub fn tick(&mut self) {
        let now = self.clock.now_ms();

        if self.init_pending {
            if !self.init_ledger(now) {
                debug!("screensaver: state lock still busy, init deferred");
                return;
            }
            self.init_pending = false;
            info!("screensaver: deferred init done");
        }

        if self.power_state.is_screensaver() && self.visual_refresh.due(now) {
            self.refresh_visual();
        }

        if self.power_state == PowerState::Awake {
            self.check_idle_timeout(now);
        }

        let pressed = self.touch.is_pressed();
        if self.touch_log.due(now) {
            debug!(
                "screensaver: touch raw={} state={} timeout={}s",
                if pressed { "pressed" } else { "released" },
                self.power_state,
                self.settings.timeout_sec
            );
        }
        self.process_touch(pressed, now);
    }

    /// Press notification from the UI framework.
    pub fn on_touch_pressed(&mut self) {
        let now = self.clock.now_ms();
        self.process_touch(true, now);
    }

    /// Release notification from the UI framework.
    pub fn on_touch_released(&mut self) {
        let now = self.clock.now_ms();
        self.process_touch(false, now);
    }

    pub fn power_state(&self) -> PowerState {
        self.power_state
    }

    pub fn tracker(&self) -> &TouchTracker {
        &self.tracker
    }

    pub fn power_lock(&self) -> &PowerLockAdapter<L> {
        &self.power
    }

    pub fn previous_screen(&self) -> Option<ScreenId> {
        self.previous_screen
    }

    pub fn settings(&self) -> &ScreensaverSettings {
        &self.settings
    }

    pub fn poll_rate(&self) -> PollRate {
        PollRate::select(self.power_state.is_screensaver(), self.tracker.is_touching())
    }

    fn init_ledger(&self, now: u64) -> bool {
        let Some(state) = self.state.lock_for(self.settings.lock_timeout_ms as u32) else {
            return false;
        };
        state.set_timeout_sec(self.settings.timeout_sec);
        state.set_screensaver_active(false);
        state.stamp_activity(now);
        true
    }

    fn refresh_visual(&self) {
        match Held::acquire(&self.scene, self.settings.lock_timeout_ms as u32) {
            Some(scene) => scene.lock().refresh_screensaver(),
            None => debug!("screensaver: scene lock busy, visual refresh skipped"),
        }
    }

    fn check_idle_timeout(&mut self, now: u64) {
        let fields = self.state.snapshot();
        if fields.timeout_sec == 0 {
            return;
        }

        let elapsed = now.saturating_sub(fields.last_activity_ms);
        if self.elapsed_log.due(now) {
            info!(
                "screensaver: idle {}s / {}s",
                elapsed / 1000,
                fields.timeout_sec
            );
        }

        if elapsed >= fields.timeout_sec as u64 * 1000 {
            info!("screensaver: timeout after {}s idle", elapsed / 1000);
            self.set_active(true);
        }
    }

    fn stamp_activity(&self, now: u64) -> bool {
        match self
            .state
            .lock_for(self.settings.activity_lock_timeout_ms as u32)
        {
            Some(state) => {
                state.stamp_activity(now);
                true
            }
            None => {
                debug!("screensaver: activity reset dropped, state lock busy");
                false
            }
        }
    }

    // shared by tick() and the press/release handlers
    fn process_touch(&mut self, pressed: bool, now: u64) {
        if self.tracker.sample(pressed, now) != Contact::Confirmed {
            return;
        }

        match self.power_state {
            PowerState::Screensaver => {
                if self.tracker.wait_for_release() {
                    return;
                }
                info!("screensaver: touch wake");
                if self.set_active(false) {
                    // the waking touch is already accounted for
                    self.tracker.count_activity();
                }
            }
            PowerState::Awake => {
                if self.tracker.count_activity() {
                    self.stamp_activity(now);
                }
                if let Some(held) = self.tracker.track_long_press(now) {
                    if held >= self.settings.long_press_ms as u64 {
                        info!("screensaver: long-press screen-off");
                        if self.set_active(true) {
                            self.tracker.hold_until_release();
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::power_lock::LockState;
    use crate::testing::{FakeFreqLock, FakeTouch, ManualClock, RecordingScene, SceneCall};
    use std::cell::Cell;

    const BOOT_MS: u64 = 1_000;

    struct Rig {
        clock: ManualClock,
        state: SharedState,
        scene: RecordingScene,
        touch: Cell<bool>,
    }

    type Ctl<'r> = Screensaver<'r, &'r ManualClock, &'r RecordingScene, FakeFreqLock, FakeTouch<'r>>;

    impl Rig {
        fn new() -> Self {
            Self {
                clock: ManualClock::at(BOOT_MS),
                state: SharedState::new(0),
                scene: RecordingScene::default(),
                touch: Cell::new(false),
            }
        }

        fn build(&self, settings: ScreensaverSettings, freq_lock: FakeFreqLock) -> Ctl<'_> {
            Screensaver::new(
                &self.clock,
                &self.state,
                &self.scene,
                freq_lock,
                FakeTouch(&self.touch),
                settings,
            )
        }

        fn controller(&self, settings: ScreensaverSettings) -> Ctl<'_> {
            let mut ctl = self.build(settings, FakeFreqLock::default());
            ctl.init();
            ctl
        }

        fn show_screen(&self, screen: ScreenId) {
            self.state.lock_for(1).unwrap().set_current_screen(screen);
        }

        fn last_activity(&self) -> u64 {
            self.state.snapshot().last_activity_ms
        }

        // tick every `step` ms for `duration` ms, finger at `pressed`
        fn hold(&self, ctl: &mut Ctl<'_>, pressed: bool, duration: u64, step: u64) {
            self.touch.set(pressed);
            let end = self.clock.now_ms() + duration;
            while self.clock.now_ms() < end {
                self.clock.advance(step);
                ctl.tick();
            }
        }

        fn screensaver_entries(&self) -> usize {
            self.scene
                .calls
                .borrow()
                .iter()
                .filter(|c| **c == SceneCall::Show(ScreenId::Screensaver))
                .count()
        }
    }

    fn settings(timeout_sec: u16) -> ScreensaverSettings {
        ScreensaverSettings {
            timeout_sec,
            lock_timeout_ms: 2,
            activity_lock_timeout_ms: 2,
            ..ScreensaverSettings::defaults()
        }
    }

    #[test]
    fn init_starts_awake_with_activity_at_now() {
        let rig = Rig::new();
        let ctl = rig.controller(settings(300));

        assert_eq!(ctl.power_state(), PowerState::Awake);
        assert!(!ctl.is_active());
        assert_eq!(rig.last_activity(), BOOT_MS);
        assert_eq!(rig.state.snapshot().timeout_sec, 300);
        assert_eq!(ctl.power_lock().state(), LockState::Held);
    }

    #[test]
    fn round_trip_restores_previous_screen() {
        let rig = Rig::new();
        rig.show_screen(ScreenId::History);
        let mut ctl = rig.controller(settings(0));

        assert!(ctl.set_active(true));
        assert!(ctl.is_active());
        assert_eq!(ctl.previous_screen(), Some(ScreenId::History));
        assert_eq!(ctl.power_lock().state(), LockState::Released);
        assert_eq!(
            rig.scene.take_calls(),
            [
                SceneCall::RefreshScreensaver,
                SceneCall::Show(ScreenId::Screensaver)
            ]
        );

        assert!(ctl.set_active(false));
        assert!(!ctl.is_active());
        assert_eq!(ctl.power_state(), PowerState::Awake);
        assert_eq!(rig.state.snapshot().current_screen, ScreenId::History);
        assert_eq!(ctl.power_lock().state(), LockState::Held);
        assert_eq!(ctl.power_lock().inner().acquires, 2);
        assert_eq!(
            rig.scene.take_calls(),
            [
                SceneCall::Show(ScreenId::History),
                SceneCall::Redraw(ScreenId::History)
            ]
        );
        assert!(!rig.scene.is_locked());
        assert!(rig.state.lock_for(0).is_some());
    }

    #[test]
    fn repeated_request_is_not_a_change() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(0));
        assert!(!ctl.set_active(false));
        assert!(ctl.set_active(true));
        assert!(!ctl.set_active(true));
        assert_eq!(rig.screensaver_entries(), 1);
    }

    #[test]
    fn idle_timeout_fires_exactly_once() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(300));

        rig.clock.set(BOOT_MS + 299_999);
        ctl.tick();
        assert!(!ctl.is_active());

        rig.clock.advance(1);
        ctl.tick();
        assert!(ctl.is_active());
        assert_eq!(rig.last_activity(), BOOT_MS + 300_000);

        rig.hold(&mut ctl, false, 600_000, 1_000);
        assert_eq!(rig.screensaver_entries(), 1);
    }

    #[test]
    fn zero_timeout_never_fires() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(0));
        rig.clock.advance(10 * 3600 * 1000);
        ctl.tick();
        assert!(!ctl.is_active());
        assert_eq!(rig.screensaver_entries(), 0);
    }

    #[test]
    fn graze_during_screensaver_does_not_wake() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(0));
        assert!(ctl.set_active(true));
        let stamped = rig.last_activity();

        rig.hold(&mut ctl, true, 30, 10);
        rig.hold(&mut ctl, false, 20, 10);

        assert!(ctl.is_active());
        assert!(!ctl.tracker().activity_counted());
        assert!(!ctl.tracker().long_press_active());
        assert_eq!(rig.last_activity(), stamped);
    }

    #[test]
    fn graze_while_awake_is_not_activity() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(300));
        rig.clock.set(50_000);
        rig.hold(&mut ctl, true, 30, 10);
        assert!(!ctl.tracker().activity_counted());
        assert_eq!(rig.last_activity(), BOOT_MS);
    }

    #[test]
    fn one_activity_refresh_per_touch() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(300));
        rig.clock.set(100_000);

        // first sample at 100_010, confirmed at 100_060
        rig.hold(&mut ctl, true, 500, 10);
        assert_eq!(rig.last_activity(), 100_060);
        assert!(ctl.tracker().activity_counted());

        rig.hold(&mut ctl, false, 10, 10);
        rig.hold(&mut ctl, true, 100, 10);
        assert_eq!(rig.last_activity(), 100_570);
    }

    #[test]
    fn long_press_sleeps_once_and_waits_for_release() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(300));
        rig.clock.set(10_000);

        // confirmed at 10_060, long press tracked from there
        rig.hold(&mut ctl, true, 3_050, 10);
        assert!(!ctl.is_active());
        rig.hold(&mut ctl, true, 10, 10);
        assert!(ctl.is_active());
        assert!(ctl.tracker().wait_for_release());
        assert_eq!(rig.last_activity(), 13_060);

        // finger still down: no wake, no second transition
        rig.hold(&mut ctl, true, 2_000, 10);
        assert!(ctl.is_active());
        assert_eq!(rig.screensaver_entries(), 1);

        // lift, then a fresh touch wakes
        rig.hold(&mut ctl, false, 50, 10);
        assert!(!ctl.tracker().wait_for_release());
        rig.hold(&mut ctl, true, 60, 10);
        assert!(!ctl.is_active());
        assert!(ctl.tracker().activity_counted());
    }

    #[test]
    fn wake_stamps_activity_and_does_not_retimeout() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(300));
        assert!(ctl.set_active(true));

        rig.clock.set(2_000_000);
        rig.hold(&mut ctl, true, 60, 10);
        assert!(!ctl.is_active());
        assert_eq!(rig.last_activity(), 2_000_060);

        rig.hold(&mut ctl, false, 100, 10);
        assert!(!ctl.is_active());
    }

    #[test]
    fn scene_lock_contention_leaves_state_unchanged() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(300));

        rig.scene.busy.set(true);
        assert!(!ctl.set_active(true));
        assert!(!ctl.is_active());
        assert_eq!(ctl.power_state(), PowerState::Awake);
        assert!(ctl.power_lock().is_held());
        // state lock was released on the way out
        assert!(rig.state.lock_for(0).is_some());

        // the timeout retries on the next tick once the scene frees up
        rig.clock.advance(300_000);
        ctl.tick();
        assert!(!ctl.is_active());
        rig.scene.busy.set(false);
        rig.clock.advance(10);
        ctl.tick();
        assert!(ctl.is_active());
    }

    #[test]
    fn state_lock_contention_leaves_state_unchanged() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(0));

        let held = rig.state.lock_for(0).unwrap();
        assert!(!ctl.set_active(true));
        assert_eq!(ctl.power_state(), PowerState::Awake);
        assert!(rig.scene.take_calls().is_empty());
        drop(held);

        assert!(ctl.set_active(true));
    }

    #[test]
    fn activity_reset_is_dropped_while_state_locked() {
        let rig = Rig::new();
        let ctl = rig.controller(settings(300));
        rig.clock.set(5_000);

        let held = rig.state.lock_for(0).unwrap();
        ctl.reset_activity();
        drop(held);
        assert_eq!(rig.last_activity(), BOOT_MS);

        ctl.reset_activity();
        assert_eq!(rig.last_activity(), 5_000);
        assert_eq!(ctl.elapsed_since_activity_ms(), 0);
        rig.clock.advance(1_234);
        assert_eq!(ctl.elapsed_since_activity_ms(), 1_234);
    }

    #[test]
    fn screensaver_visual_refresh_is_throttled() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(0));
        assert!(ctl.set_active(true));
        rig.scene.take_calls();

        rig.hold(&mut ctl, false, 3_000, 10);
        let refreshes = rig
            .scene
            .take_calls()
            .into_iter()
            .filter(|c| *c == SceneCall::RefreshScreensaver)
            .count();
        assert_eq!(refreshes, 3);
    }

    #[test]
    fn missing_previous_screen_falls_back_to_main() {
        let rig = Rig::new();
        rig.show_screen(ScreenId::Screensaver);
        let mut ctl = rig.controller(settings(0));

        assert!(ctl.set_active(true));
        assert_eq!(ctl.previous_screen(), None);
        rig.scene.take_calls();

        assert!(ctl.set_active(false));
        assert_eq!(
            rig.scene.take_calls(),
            [
                SceneCall::Show(ScreenId::Main),
                SceneCall::Redraw(ScreenId::Main)
            ]
        );
    }

    #[test]
    fn set_timeout_restarts_countdown() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(0));
        rig.clock.set(900_000);

        assert!(ctl.set_timeout(600));
        assert_eq!(rig.state.snapshot().timeout_sec, 600);
        assert_eq!(rig.last_activity(), 900_000);

        rig.clock.advance(599_000);
        ctl.tick();
        assert!(!ctl.is_active());
        rig.clock.advance(1_000);
        ctl.tick();
        assert!(ctl.is_active());
    }

    #[test]
    fn event_handlers_share_the_debounce_path() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(0));
        assert!(ctl.set_active(true));

        rig.clock.advance(1_000);
        ctl.on_touch_pressed();
        assert!(ctl.is_active());
        ctl.on_touch_released();
        rig.clock.advance(40);
        ctl.on_touch_pressed();
        assert!(ctl.is_active());

        rig.clock.advance(50);
        ctl.on_touch_pressed();
        assert!(!ctl.is_active());

        ctl.on_touch_released();
        assert!(!ctl.tracker().is_touching());
    }

    #[test]
    fn apply_settings_updates_debounce_and_timeout() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(300));
        let mut next = settings(600);
        next.debounce_ms = 100;

        assert!(ctl.apply_settings(next));
        assert_eq!(rig.state.snapshot().timeout_sec, 600);

        rig.clock.set(50_000);
        rig.hold(&mut ctl, true, 60, 10);
        assert!(!ctl.tracker().debounce_confirmed());
        rig.hold(&mut ctl, true, 60, 10);
        assert!(ctl.tracker().debounce_confirmed());
    }

    #[test]
    fn poll_rate_follows_state_and_touch() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(0));
        assert_eq!(ctl.poll_rate(), PollRate::Fast);
        assert!(ctl.set_active(true));
        assert_eq!(ctl.poll_rate(), PollRate::Slow);
        rig.hold(&mut ctl, true, 10, 10);
        assert_eq!(ctl.poll_rate(), PollRate::Fast);
    }

    #[test]
    fn busy_state_lock_at_init_never_leaves_ledger_at_zero() {
        let rig = Rig::new();
        rig.clock.set(600_000);
        let mut ctl = rig.build(settings(300), FakeFreqLock::default());

        let held = rig.state.lock_for(0).unwrap();
        ctl.init();
        drop(held);
        assert_eq!(ctl.power_state(), PowerState::Awake);

        rig.clock.advance(10);
        ctl.tick();
        assert!(!ctl.is_active());
        assert_eq!(rig.last_activity(), 600_010);
        assert_eq!(rig.state.snapshot().timeout_sec, 300);

        rig.clock.advance(299_989);
        ctl.tick();
        assert!(!ctl.is_active());
        rig.clock.advance(1);
        ctl.tick();
        assert!(ctl.is_active());
    }

    #[test]
    fn deferred_init_holds_off_idle_check_while_lock_busy() {
        let rig = Rig::new();
        rig.clock.set(600_000);
        let mut ctl = rig.build(settings(300), FakeFreqLock::default());

        let held = rig.state.lock_for(0).unwrap();
        ctl.init();
        rig.clock.advance(10);
        ctl.tick();
        drop(held);
        assert!(!ctl.is_active());
        assert_eq!(rig.screensaver_entries(), 0);
    }

    #[test]
    fn apply_settings_retries_timeout_after_lock_contention() {
        let rig = Rig::new();
        let mut ctl = rig.controller(settings(300));

        let held = rig.state.lock_for(0).unwrap();
        assert!(!ctl.apply_settings(settings(600)));
        drop(held);
        assert_eq!(ctl.settings().timeout_sec, 300);
        assert_eq!(rig.state.snapshot().timeout_sec, 300);

        assert!(ctl.apply_settings(settings(600)));
        assert_eq!(ctl.settings().timeout_sec, 600);
        assert_eq!(rig.state.snapshot().timeout_sec, 600);
    }

    #[test]
    fn power_lock_release_failure_does_not_block_screensaver() {
        let rig = Rig::new();
        let freq_lock = FakeFreqLock {
            fail_release: true,
            ..FakeFreqLock::default()
        };
        let mut ctl = rig.build(settings(0), freq_lock);
        ctl.init();

        assert!(ctl.set_active(true));
        assert!(ctl.is_active());
        assert_eq!(ctl.power_state(), PowerState::Screensaver);
        assert_eq!(ctl.power_lock().inner().releases, 1);
        // release never went through, so the lock is still ours
        assert_eq!(ctl.power_lock().state(), LockState::Held);

        assert!(ctl.set_active(false));
        assert!(!ctl.is_active());
    }

    #[test]
    fn power_lock_acquire_failure_still_restores_screen() {
        let rig = Rig::new();
        rig.show_screen(ScreenId::Settings);
        let freq_lock = FakeFreqLock {
            fail_acquire: true,
            ..FakeFreqLock::default()
        };
        let mut ctl = rig.build(settings(0), freq_lock);
        ctl.init();
        assert_eq!(ctl.power_lock().state(), LockState::Released);

        assert!(ctl.set_active(true));
        rig.scene.take_calls();

        assert!(ctl.set_active(false));
        assert!(!ctl.is_active());
        assert_eq!(rig.state.snapshot().current_screen, ScreenId::Settings);
        assert_eq!(
            rig.scene.take_calls(),
            [
                SceneCall::Show(ScreenId::Settings),
                SceneCall::Redraw(ScreenId::Settings)
            ]
        );
        assert_eq!(ctl.power_lock().inner().acquires, 2);
    }
}
