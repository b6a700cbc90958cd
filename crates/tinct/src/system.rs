//! System light/dark preference.
//!
//! [`OsAppearance`] asks the OS through `dark-light`. The OS gives no change
//! signal of its own, so hosts call [`OsAppearance::refresh`] when they learn
//! the preference may have changed. [`FixedAppearance`] holds a value set by
//! the caller.

use std::cell::Cell;

use dark_light::Mode;

use crate::mode::SystemColorScheme;
use crate::subscription::{Signal, Subscription};

/// Source of the system color scheme preference.
pub trait SystemAppearance {
    fn color_scheme(&self) -> SystemColorScheme;

    /// Calls `callback` after each change of [`color_scheme`](Self::color_scheme).
    fn connect_changed(&self, callback: Box<dyn Fn()>) -> Subscription;
}

/// The OS preference, detected with `dark-light`.
pub struct OsAppearance {
    current: Cell<SystemColorScheme>,
    changed: Signal<()>,
}

impl OsAppearance {
    pub fn new() -> Self {
        Self {
            current: Cell::new(detect()),
            changed: Signal::new(),
        }
    }

    /// Re-detects the preference, notifying if it changed.
    ///
    /// Returns the new preference.
    pub fn refresh(&self) -> SystemColorScheme {
        let detected = detect();
        if self.current.replace(detected) != detected {
            tracing::debug!(scheme = ?detected, "system color scheme changed");
            self.changed.emit(&());
        }
        detected
    }
}

impl Default for OsAppearance {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemAppearance for OsAppearance {
    fn color_scheme(&self) -> SystemColorScheme {
        self.current.get()
    }

    fn connect_changed(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.changed.connect(move |_| callback())
    }
}

fn detect() -> SystemColorScheme {
    match dark_light::detect() {
        Ok(mode) => from_mode(mode),
        Err(err) => {
            tracing::warn!(error = %err, "could not detect system color scheme");
            SystemColorScheme::Default
        }
    }
}

fn from_mode(mode: Mode) -> SystemColorScheme {
    match mode {
        Mode::Dark => SystemColorScheme::PreferDark,
        Mode::Light => SystemColorScheme::PreferLight,
        Mode::Unspecified => SystemColorScheme::Default,
    }
}

/// A preference that changes only when told to.
#[derive(Default)]
pub struct FixedAppearance {
    current: Cell<SystemColorScheme>,
    changed: Signal<()>,
}

impl FixedAppearance {
    pub fn new(scheme: SystemColorScheme) -> Self {
        Self {
            current: Cell::new(scheme),
            changed: Signal::new(),
        }
    }

    /// Sets the preference, notifying if it changed.
    pub fn set(&self, scheme: SystemColorScheme) {
        if self.current.replace(scheme) != scheme {
            self.changed.emit(&());
        }
    }

    pub fn connection_count(&self) -> usize {
        self.changed.connection_count()
    }
}

impl SystemAppearance for FixedAppearance {
    fn color_scheme(&self) -> SystemColorScheme {
        self.current.get()
    }

    fn connect_changed(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.changed.connect(move |_| callback())
    }
}
