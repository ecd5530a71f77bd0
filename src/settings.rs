// Screensaver settings with a text persistence format.
// key=value lines, '#' comments, unknown keys ignored for forward compat.
//
//   screen_off=300        idle seconds before screensaver, 0 = never
//   debounce_ms=50
//   long_press_ms=3000    hold time for long-press-to-sleep
//   lock_timeout_ms=50    state+scene lock wait in a transition
//   activity_lock_ms=10   state lock wait for an activity reset
//   refresh_ms=1000       screensaver visual refresh cadence

use core::fmt;

use crate::drivers::touch::{DEBOUNCE_MS, LONG_PRESS_MS};

/// Screen-off choices offered by the settings screen.
pub const TIMEOUT_PRESETS_SEC: [u16; 9] = [0, 300, 600, 900, 1800, 3600, 5400, 7200, 14400];

const TIMEOUT_PRESET_LABELS: [&str; 9] = [
    "Off", "5 min", "10 min", "15 min", "30 min", "60 min", "90 min", "120 min", "240 min",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreensaverSettings {
    pub timeout_sec: u16,
    pub debounce_ms: u16,
    pub long_press_ms: u16,
    pub lock_timeout_ms: u16,
    pub activity_lock_timeout_ms: u16,
    pub refresh_interval_ms: u16,
}

impl Default for ScreensaverSettings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ScreensaverSettings {
    pub const fn defaults() -> Self {
        Self {
            timeout_sec: 300,
            debounce_ms: DEBOUNCE_MS as u16,
            long_press_ms: LONG_PRESS_MS as u16,
            lock_timeout_ms: 50,
            activity_lock_timeout_ms: 10,
            refresh_interval_ms: 1000,
        }
    }

    pub fn sanitize(&mut self) {
        self.timeout_sec = nearest_preset(self.timeout_sec);
        self.debounce_ms = self.debounce_ms.clamp(10, 500);
        self.long_press_ms = self.long_press_ms.clamp(500, 10_000);
        self.lock_timeout_ms = self.lock_timeout_ms.clamp(1, 200);
        self.activity_lock_timeout_ms = self.activity_lock_timeout_ms.clamp(1, 100);
        self.refresh_interval_ms = self.refresh_interval_ms.clamp(100, 60_000);
    }

    /// Defaults overridden by whatever `data` sets, then sanitized.
    pub fn parse(data: &[u8]) -> Self {
        let mut s = Self::defaults();
        for line in data.split(|&b| b == b'\n') {
            let line = line.trim_ascii();
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            if let Some(eq) = line.iter().position(|&b| b == b'=') {
                let key = line[..eq].trim_ascii();
                let val = line[eq + 1..].trim_ascii();
                s.apply(key, val);
            }
        }
        s.sanitize();
        s
    }

    fn apply(&mut self, key: &[u8], val: &[u8]) {
        let Some(v) = parse_number(val) else {
            return;
        };
        match key {
            b"screen_off" => self.timeout_sec = v,
            b"debounce_ms" => self.debounce_ms = v,
            b"long_press_ms" => self.long_press_ms = v,
            b"lock_timeout_ms" => self.lock_timeout_ms = v,
            b"activity_lock_ms" => self.activity_lock_timeout_ms = v,
            b"refresh_ms" => self.refresh_interval_ms = v,
            _ => {}
        }
    }

    /// Serialize into `buf`, returns bytes written (truncates if short).
    pub fn write(&self, buf: &mut [u8]) -> usize {
        let mut out = SliceOut { buf, len: 0 };
        // SliceOut never errors, it truncates
        let _ = self.write_fmt_into(&mut out);
        out.len
    }

    fn write_fmt_into(&self, out: &mut impl fmt::Write) -> fmt::Result {
        out.write_str("# screensaver settings\n")?;
        out.write_str("# screen_off is in seconds, 0 = never\n\n")?;
        writeln!(out, "screen_off={}", self.timeout_sec)?;
        writeln!(out, "debounce_ms={}", self.debounce_ms)?;
        writeln!(out, "long_press_ms={}", self.long_press_ms)?;
        writeln!(out, "lock_timeout_ms={}", self.lock_timeout_ms)?;
        writeln!(out, "activity_lock_ms={}", self.activity_lock_timeout_ms)?;
        writeln!(out, "refresh_ms={}", self.refresh_interval_ms)
    }
}

/// Index of `secs` in [`TIMEOUT_PRESETS_SEC`]; unknown values select "Off".
pub fn preset_index(secs: u16) -> usize {
    TIMEOUT_PRESETS_SEC
        .iter()
        .position(|&p| p == secs)
        .unwrap_or(0)
}

pub fn preset_secs(idx: usize) -> Option<u16> {
    TIMEOUT_PRESETS_SEC.get(idx).copied()
}

pub fn preset_label(idx: usize) -> &'static str {
    TIMEOUT_PRESET_LABELS.get(idx).copied().unwrap_or("?")
}

// Only an explicit 0 means "never"; any other value snaps to the
// nearest real timeout.
fn nearest_preset(secs: u16) -> u16 {
    if secs == 0 {
        return 0;
    }
    TIMEOUT_PRESETS_SEC[1..]
        .iter()
        .copied()
        .min_by_key(|p| p.abs_diff(secs))
        .unwrap_or(TIMEOUT_PRESETS_SEC[1])
}

// Plain decimal digits only; no sign, no overflow.
fn parse_number(s: &[u8]) -> Option<u16> {
    if s.is_empty() || !s.iter().all(u8::is_ascii_digit) {
        return None;
    }
    core::str::from_utf8(s).ok()?.parse().ok()
}

struct SliceOut<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl fmt::Write for SliceOut<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.len;
        let n = s.len().min(room);
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}
