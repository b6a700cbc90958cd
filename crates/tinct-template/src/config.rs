//! Build configuration: which variant to emit and which contrast tree to read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output variant of a template.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Dark,
    Light,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Dark => "dark",
            Variant::Light => "light",
        }
    }
}

/// Contrast level. Selects the color source tree, nothing else.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Contrast {
    #[default]
    Normal,
    High,
}

impl Contrast {
    pub fn as_str(self) -> &'static str {
        match self {
            Contrast::Normal => "normal",
            Contrast::High => "high",
        }
    }

    pub fn is_high(self) -> bool {
        self == Contrast::High
    }
}

macro_rules! impl_text {
    ($ty:ident, $what:literal, $($text:literal => $variant:ident),+) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(format!(concat!("unknown ", $what, " '{}'"), other)),
                }
            }
        }
    };
}

impl_text!(Variant, "variant", "dark" => Dark, "light" => Light);
impl_text!(Contrast, "contrast", "normal" => Normal, "high" => High);

/// The pair of build axes a template is generated for.
///
/// Defaults to `dark` / `normal`, matching an unset `VARIANT` and `CONTRAST`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub variant: Variant,
    pub contrast: Contrast,
}

impl BuildConfig {
    pub fn new(variant: Variant, contrast: Contrast) -> Self {
        Self { variant, contrast }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dark_normal() {
        let config = BuildConfig::default();
        assert_eq!(config.variant, Variant::Dark);
        assert_eq!(config.contrast, Contrast::Normal);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Light".parse::<Variant>().unwrap(), Variant::Light);
        assert_eq!(" HIGH ".parse::<Contrast>().unwrap(), Contrast::High);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "sepia".parse::<Variant>().unwrap_err();
        assert!(err.contains("sepia"));
    }

    #[test]
    fn test_display_round_trips() {
        assert_eq!(Variant::Light.to_string(), "light");
        assert_eq!(Contrast::Normal.to_string(), "normal");
    }
}
