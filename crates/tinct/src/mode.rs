//! Theme modes, color schemes and their settings representations.
//!
//! Enum-valued settings store an integer; selection controls show a
//! position. Neither is assumed to match declaration order: both go through
//! the explicit tables [`THEME_MODES`] and [`COLOR_SCHEMES`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of a mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeEntry<T: 'static> {
    pub value: T,
    /// Integer stored in settings.
    pub index: i32,
    /// Stable textual name.
    pub nick: &'static str,
    /// Human-readable label for selectors.
    pub label: &'static str,
}

/// User-facing theme selection, stored under the `theme` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Follow the system preference.
    #[default]
    System,
    Dark,
    Light,
    /// Fill a template with the user's colors.
    Custom,
}

/// The binary scheme that actually selects a stylesheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Dark,
    Light,
}

/// What the system reports as its preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SystemColorScheme {
    /// No preference expressed.
    #[default]
    Default,
    PreferDark,
    PreferLight,
}

pub const THEME_MODES: [ModeEntry<ThemeMode>; 4] = [
    ModeEntry {
        value: ThemeMode::System,
        index: 0,
        nick: "system",
        label: "System",
    },
    ModeEntry {
        value: ThemeMode::Dark,
        index: 1,
        nick: "dark",
        label: "Dark",
    },
    ModeEntry {
        value: ThemeMode::Light,
        index: 2,
        nick: "light",
        label: "Light",
    },
    ModeEntry {
        value: ThemeMode::Custom,
        index: 3,
        nick: "custom",
        label: "Custom",
    },
];

pub const COLOR_SCHEMES: [ModeEntry<ColorScheme>; 2] = [
    ModeEntry {
        value: ColorScheme::Dark,
        index: 0,
        nick: "dark",
        label: "Dark",
    },
    ModeEntry {
        value: ColorScheme::Light,
        index: 1,
        nick: "light",
        label: "Light",
    },
];

/// An enum backed by a mapping table.
pub trait Choice: Copy + PartialEq + Sized + 'static {
    const TABLE: &'static [ModeEntry<Self>];

    /// Interprets a stored settings value, never failing.
    fn from_setting(value: i32) -> Self;

    fn entry(self) -> &'static ModeEntry<Self> {
        Self::TABLE
            .iter()
            .find(|e| e.value == self)
            .unwrap_or(&Self::TABLE[0])
    }

    fn index(self) -> i32 {
        self.entry().index
    }

    fn nick(self) -> &'static str {
        self.entry().nick
    }

    fn label(self) -> &'static str {
        self.entry().label
    }

    /// Position of this value in [`Choice::TABLE`], as shown by a selector.
    fn position(self) -> usize {
        Self::TABLE.iter().position(|e| e.value == self).unwrap_or(0)
    }

    fn from_position(position: usize) -> Option<Self> {
        Self::TABLE.get(position).map(|e| e.value)
    }

    fn from_nick(nick: &str) -> Option<Self> {
        Self::TABLE.iter().find(|e| e.nick == nick).map(|e| e.value)
    }
}

impl ThemeMode {
    pub fn from_index(index: i32) -> Option<Self> {
        THEME_MODES.iter().find(|e| e.index == index).map(|e| e.value)
    }
}

impl Choice for ThemeMode {
    const TABLE: &'static [ModeEntry<Self>] = &THEME_MODES;

    fn from_setting(value: i32) -> Self {
        ThemeMode::from_index(value).unwrap_or_else(|| {
            tracing::warn!(value, "unknown theme mode, following the system");
            ThemeMode::System
        })
    }
}

impl ColorScheme {
    /// Maps a stored index to a scheme, clamping to the table bounds.
    pub fn from_index(index: i32) -> Self {
        let last = COLOR_SCHEMES.len() - 1;
        let position = usize::try_from(index).unwrap_or(0).min(last);
        COLOR_SCHEMES[position].value
    }

    /// Light only when the system explicitly prefers light.
    pub fn from_system(system: SystemColorScheme) -> Self {
        match system {
            SystemColorScheme::PreferLight => ColorScheme::Light,
            SystemColorScheme::PreferDark | SystemColorScheme::Default => ColorScheme::Dark,
        }
    }
}

impl Choice for ColorScheme {
    const TABLE: &'static [ModeEntry<Self>] = &COLOR_SCHEMES;

    fn from_setting(value: i32) -> Self {
        ColorScheme::from_index(value)
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick())
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_mode_table_round_trip() {
        for entry in THEME_MODES {
            assert_eq!(ThemeMode::from_index(entry.index), Some(entry.value));
            assert_eq!(ThemeMode::from_nick(entry.nick), Some(entry.value));
            assert_eq!(entry.value.index(), entry.index);
        }
        assert_eq!(ThemeMode::from_index(4), None);
    }

    #[test]
    fn test_unknown_theme_mode_follows_system() {
        assert_eq!(ThemeMode::from_setting(-1), ThemeMode::System);
        assert_eq!(ThemeMode::from_setting(3), ThemeMode::Custom);
    }

    #[test]
    fn test_color_scheme_index_clamps() {
        assert_eq!(ColorScheme::from_index(0), ColorScheme::Dark);
        assert_eq!(ColorScheme::from_index(1), ColorScheme::Light);
        assert_eq!(ColorScheme::from_index(5), ColorScheme::Light);
        assert_eq!(ColorScheme::from_index(-3), ColorScheme::Dark);
    }

    #[test]
    fn test_from_system_prefers_dark_unless_light_requested() {
        assert_eq!(ColorScheme::from_system(SystemColorScheme::Default), ColorScheme::Dark);
        assert_eq!(ColorScheme::from_system(SystemColorScheme::PreferDark), ColorScheme::Dark);
        assert_eq!(ColorScheme::from_system(SystemColorScheme::PreferLight), ColorScheme::Light);
    }

    #[test]
    fn test_positions_follow_table() {
        assert_eq!(ThemeMode::Custom.position(), 3);
        assert_eq!(ThemeMode::from_position(2), Some(ThemeMode::Light));
        assert_eq!(ColorScheme::from_position(2), None);
        assert_eq!(ColorScheme::Light.label(), "Light");
    }
}
