//! Color defaults, override resolution and color literal validation.

use std::fmt;
use std::str::FromStr;

use tinct_template::ColorVariable;

use crate::error::ColorParseError;
use crate::mode::ColorScheme;

/// Built-in defaults, one per scheme index (dark, light).
const DEFAULTS: [(ColorVariable, [&str; 2]); 4] = [
    (ColorVariable::Bg, ["rgb(54,54,58)", "rgb(250,250,251)"]),
    (ColorVariable::Fg, ["rgb(255,255,255)", "rgb(34,34,38)"]),
    (ColorVariable::CardBg, ["rgb(71,71,76)", "rgb(255,255,255)"]),
    (ColorVariable::SearchBg, ["rgb(71,71,76)", "rgb(255,255,255)"]),
];

/// The settings key holding the user override for `var`.
pub fn settings_key(var: ColorVariable) -> &'static str {
    match var {
        ColorVariable::Bg => "custom-bg-color",
        ColorVariable::Fg => "custom-fg-color",
        ColorVariable::CardBg => "custom-card-bg-color",
        ColorVariable::SearchBg => "custom-search-bg-color",
    }
}

/// The default for `var` at a raw scheme index.
///
/// Out-of-range indices clamp to the nearest defined default, so a stored
/// scheme of 5 reads the light default.
pub fn default_color(var: ColorVariable, scheme_index: i32) -> &'static str {
    let defaults = DEFAULTS
        .iter()
        .find(|(v, _)| *v == var)
        .map(|(_, d)| d)
        .unwrap_or(&DEFAULTS[0].1);
    let position = usize::try_from(scheme_index)
        .unwrap_or(0)
        .min(defaults.len() - 1);
    defaults[position]
}

/// The override when set, otherwise the default for `scheme`.
pub fn resolve_color<'a>(var: ColorVariable, override_value: &'a str, scheme: ColorScheme) -> &'a str {
    if override_value.is_empty() {
        default_color(var, scheme_index(scheme))
    } else {
        override_value
    }
}

fn scheme_index(scheme: ColorScheme) -> i32 {
    match scheme {
        ColorScheme::Dark => 0,
        ColorScheme::Light => 1,
    }
}

/// A parsed color.
///
/// Formats as `rgb(r,g,b)` when opaque and `rgba(r,g,b,a)` otherwise, the
/// same spelling as the defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// In `0.0..=1.0`.
    pub alpha: f64,
}

const NAMED: [(&str, Rgba); 8] = [
    ("black", Rgba::rgb(0, 0, 0)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("grey", Rgba::rgb(128, 128, 128)),
    (
        "transparent",
        Rgba {
            red: 0,
            green: 0,
            blue: 0,
            alpha: 0.0,
        },
    ),
];

impl Rgba {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(...)`,
    /// `rgba(...)` or a basic color name.
    pub fn parse(text: &str) -> Result<Self, ColorParseError> {
        let trimmed = text.trim();
        let invalid = || ColorParseError(text.to_string());
        let lower = trimmed.to_ascii_lowercase();

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(args) = function_args(&lower, "rgba") {
            return parse_components(args, true).ok_or_else(invalid);
        }
        if let Some(args) = function_args(&lower, "rgb") {
            return parse_components(args, false).ok_or_else(invalid);
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, color)| *color)
            .ok_or_else(invalid)
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }
}

fn function_args<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    text.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (red, green, blue, alpha) = match hex.len() {
        3 => (digit(0)?, digit(1)?, digit(2)?, 255),
        4 => (digit(0)?, digit(1)?, digit(2)?, digit(3)?),
        6 => (pair(0)?, pair(2)?, pair(4)?, 255),
        8 => (pair(0)?, pair(2)?, pair(4)?, pair(6)?),
        _ => return None,
    };
    Some(Rgba {
        red,
        green,
        blue,
        alpha: round_alpha(f64::from(alpha) / 255.0),
    })
}

fn parse_components(args: &str, with_alpha: bool) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |s: &str| s.parse::<u8>().ok();
    let alpha = if with_alpha {
        let a = parts[3].parse::<f64>().ok()?;
        if !(0.0..=1.0).contains(&a) {
            return None;
        }
        round_alpha(a)
    } else {
        1.0
    };

    Some(Rgba {
        red: channel(parts[0])?,
        green: channel(parts[1])?,
        blue: channel(parts[2])?,
        alpha,
    })
}

fn round_alpha(alpha: f64) -> f64 {
    (alpha * 1000.0).round() / 1000.0
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::parse(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({},{},{})", self.red, self.green, self.blue)
        } else {
            write!(
                f,
                "rgba({},{},{},{})",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_override_uses_scheme_default() {
        for var in ColorVariable::ALL {
            assert_eq!(resolve_color(var, "", ColorScheme::Dark), default_color(var, 0));
            assert_eq!(resolve_color(var, "", ColorScheme::Light), default_color(var, 1));
        }
        assert_eq!(resolve_color(ColorVariable::Bg, "", ColorScheme::Light), "rgb(250,250,251)");
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(resolve_color(ColorVariable::Fg, "#abcdef", ColorScheme::Dark), "#abcdef");
    }

    #[test]
    fn test_default_index_clamps() {
        assert_eq!(default_color(ColorVariable::Fg, 5), "rgb(34,34,38)");
        assert_eq!(default_color(ColorVariable::Fg, -1), "rgb(255,255,255)");
    }

    #[test]
    fn test_settings_keys() {
        assert_eq!(settings_key(ColorVariable::SearchBg), "custom-search-bg-color");
        assert_eq!(settings_key(ColorVariable::CardBg), "custom-card-bg-color");
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Rgba::parse("#fff").unwrap(), Rgba::rgb(255, 255, 255));
        assert_eq!(Rgba::parse("#36363A").unwrap(), Rgba::rgb(54, 54, 58));
        assert_eq!(Rgba::parse("#00000080").unwrap().to_string(), "rgba(0,0,0,0.502)");
        assert_eq!(Rgba::parse("#0008").unwrap().to_string(), "rgba(0,0,0,0.533)");
    }

    #[test]
    fn test_parse_functional_forms() {
        assert_eq!(Rgba::parse("rgb(54, 54, 58)").unwrap().to_string(), "rgb(54,54,58)");
        assert_eq!(
            Rgba::parse("rgba(10,20,30,0.5)").unwrap().to_string(),
            "rgba(10,20,30,0.5)"
        );
        assert_eq!(Rgba::parse("rgba(10,20,30,1)").unwrap().to_string(), "rgb(10,20,30)");
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Rgba::parse("White").unwrap().to_string(), "rgb(255,255,255)");
        assert_eq!(Rgba::parse("transparent").unwrap().to_string(), "rgba(0,0,0,0)");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "#12", "#ggg", "rgb(1,2)", "rgb(256,0,0)", "rgba(1,2,3,2)", "teal-ish"] {
            assert!(Rgba::parse(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn test_defaults_are_normalized() {
        for (_, defaults) in DEFAULTS {
            for literal in defaults {
                assert_eq!(Rgba::parse(literal).unwrap().to_string(), literal);
            }
        }
    }
}
