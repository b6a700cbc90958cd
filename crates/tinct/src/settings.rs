//! The key/value settings store the manager and bindings read from.
//!
//! [`Settings`] is the seam to the host's store. [`MemorySettings`] is a
//! complete in-process implementation used by tests and headless hosts, and
//! [`ThemeSettings`] is a serializable snapshot of every key this crate reads.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tinct_template::ColorVariable;

use crate::colors::settings_key;
use crate::error::ThemeError;
use crate::mode::{Choice, ColorScheme, ThemeMode};
use crate::subscription::{Signal, Subscription};

/// Key of the [`ThemeMode`] enum setting.
pub const THEME_KEY: &str = "theme";

/// Key of the [`ColorScheme`] enum setting used in custom mode.
pub const CUSTOM_COLOR_SCHEME_KEY: &str = "custom-color-scheme";

/// Every key that affects theme resolution.
pub fn theme_keys() -> [&'static str; 6] {
    [
        THEME_KEY,
        CUSTOM_COLOR_SCHEME_KEY,
        settings_key(ColorVariable::Bg),
        settings_key(ColorVariable::Fg),
        settings_key(ColorVariable::CardBg),
        settings_key(ColorVariable::SearchBg),
    ]
}

/// A key/value store with per-key change notification.
///
/// Unset string keys read as `""` and unset enum keys as `0`.
pub trait Settings {
    fn get_string(&self, key: &str) -> String;

    fn set_string(&self, key: &str, value: &str);

    fn get_enum(&self, key: &str) -> i32;

    fn set_enum(&self, key: &str, value: i32);

    /// Calls `callback` with the key after each change to `key`.
    fn connect_changed(&self, key: &str, callback: Box<dyn Fn(&str)>) -> Subscription;
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    String(String),
    Enum(i32),
}

/// In-memory [`Settings`].
///
/// Writes that do not change the stored value emit nothing. Clones share the
/// same store.
#[derive(Clone, Default)]
pub struct MemorySettings {
    values: Rc<RefCell<HashMap<String, Value>>>,
    changed: Rc<Signal<str>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the values of `snapshot`.
    pub fn from_snapshot(snapshot: &ThemeSettings) -> Self {
        let settings = Self::new();
        snapshot.apply_to(&settings);
        settings
    }

    /// Reads every theme key into a snapshot.
    pub fn snapshot(&self) -> ThemeSettings {
        ThemeSettings::read_from(self)
    }

    /// Number of connected change callbacks.
    pub fn connection_count(&self) -> usize {
        self.changed.connection_count()
    }

    fn store(&self, key: &str, value: Value) {
        let previous = self.values.borrow_mut().insert(key.to_string(), value.clone());
        if previous.as_ref() == Some(&value) {
            return;
        }
        tracing::debug!(key, value = ?value, "setting changed");
        self.changed.emit(key);
    }
}

impl Settings for MemorySettings {
    fn get_string(&self, key: &str) -> String {
        match self.values.borrow().get(key) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    fn set_string(&self, key: &str, value: &str) {
        self.store(key, Value::String(value.to_string()));
    }

    fn get_enum(&self, key: &str) -> i32 {
        match self.values.borrow().get(key) {
            Some(Value::Enum(v)) => *v,
            _ => 0,
        }
    }

    fn set_enum(&self, key: &str, value: i32) {
        self.store(key, Value::Enum(value));
    }

    fn connect_changed(&self, key: &str, callback: Box<dyn Fn(&str)>) -> Subscription {
        let key = key.to_string();
        self.changed.connect(move |changed: &str| {
            if changed == key {
                callback(changed);
            }
        })
    }
}

/// A snapshot of the theme settings.
///
/// Field names match the settings keys, so a YAML file reads naturally:
///
/// ```yaml
/// theme: custom
/// custom-color-scheme: light
/// custom-bg-color: "#fafafa"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ThemeSettings {
    pub theme: ThemeMode,
    pub custom_color_scheme: ColorScheme,
    pub custom_bg_color: String,
    pub custom_fg_color: String,
    pub custom_card_bg_color: String,
    pub custom_search_bg_color: String,
}

impl ThemeSettings {
    pub fn from_yaml(text: &str) -> Result<Self, ThemeError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ThemeError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The override for `var`, `""` when unset.
    pub fn color(&self, var: ColorVariable) -> &str {
        match var {
            ColorVariable::Bg => &self.custom_bg_color,
            ColorVariable::Fg => &self.custom_fg_color,
            ColorVariable::CardBg => &self.custom_card_bg_color,
            ColorVariable::SearchBg => &self.custom_search_bg_color,
        }
    }

    fn color_mut(&mut self, var: ColorVariable) -> &mut String {
        match var {
            ColorVariable::Bg => &mut self.custom_bg_color,
            ColorVariable::Fg => &mut self.custom_fg_color,
            ColorVariable::CardBg => &mut self.custom_card_bg_color,
            ColorVariable::SearchBg => &mut self.custom_search_bg_color,
        }
    }

    /// Writes every field into `settings`.
    pub fn apply_to(&self, settings: &dyn Settings) {
        settings.set_enum(THEME_KEY, self.theme.index());
        settings.set_enum(CUSTOM_COLOR_SCHEME_KEY, self.custom_color_scheme.index());
        for var in ColorVariable::ALL {
            settings.set_string(settings_key(var), self.color(var));
        }
    }

    pub fn read_from(settings: &dyn Settings) -> Self {
        let mut snapshot = Self {
            theme: ThemeMode::from_setting(settings.get_enum(THEME_KEY)),
            custom_color_scheme: ColorScheme::from_setting(settings.get_enum(CUSTOM_COLOR_SCHEME_KEY)),
            ..Self::default()
        };
        for var in ColorVariable::ALL {
            *snapshot.color_mut(var) = settings.get_string(settings_key(var));
        }
        snapshot
    }
}
