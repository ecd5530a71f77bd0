// Scene collaborator
//
// The rendering side owns every on-screen object. The controller only
// asks it to swap or redraw whole screens, and only while holding the
// scene lock (after the state lock).

use core::fmt;

use crate::kernel::TimedLock;

/// Top-level screens of the tracker UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    Main,
    Settings,
    Wifi,
    Server,
    AddServer,
    History,
    Screensaver,
}

impl ScreenId {
    pub const fn name(self) -> &'static str {
        match self {
            ScreenId::Main => "Main",
            ScreenId::Settings => "Settings",
            ScreenId::Wifi => "Wifi",
            ScreenId::Server => "Server",
            ScreenId::AddServer => "Add Server",
            ScreenId::History => "History",
            ScreenId::Screensaver => "Screensaver",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the controller needs from the rendering subsystem.
///
/// The [`TimedLock`] half is the scene lock. The other methods must only
/// be called while it is held; they take `&self` because the widget tree
/// lives behind that lock, not behind a Rust borrow.
pub trait Scene: TimedLock {
    /// Load `screen` as the active screen.
    fn show_screen(&self, screen: ScreenId);

    /// Invalidate every object on `screen` and force a full repaint.
    fn invalidate_and_redraw(&self, screen: ScreenId);

    /// Rebuild the screensaver contents (clock, dimmed counters).
    fn refresh_screensaver(&self);
}

impl<S: Scene + ?Sized> Scene for &S {
    fn show_screen(&self, screen: ScreenId) {
        (**self).show_screen(screen)
    }

    fn invalidate_and_redraw(&self, screen: ScreenId) {
        (**self).invalidate_and_redraw(screen)
    }

    fn refresh_screensaver(&self) {
        (**self).refresh_screensaver()
    }
}
