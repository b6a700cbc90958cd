//! The closed set of color roles a template can leave open.

use std::fmt;

/// A customizable color role substituted into custom templates at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorVariable {
    /// Dialog background.
    Bg,
    /// Text color.
    Fg,
    /// Item background.
    CardBg,
    /// Search bar background.
    SearchBg,
}

impl ColorVariable {
    /// Every variable, in declaration order.
    pub const ALL: [ColorVariable; 4] = [
        ColorVariable::Bg,
        ColorVariable::Fg,
        ColorVariable::CardBg,
        ColorVariable::SearchBg,
    ];

    /// The stylesheet variable name, without the `$` sigil.
    pub const fn name(self) -> &'static str {
        match self {
            ColorVariable::Bg => "bg_color",
            ColorVariable::Fg => "fg_color",
            ColorVariable::CardBg => "card_bg_color",
            ColorVariable::SearchBg => "search_bg_color",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

impl fmt::Display for ColorVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_matches_every_variable() {
        for var in ColorVariable::ALL {
            assert_eq!(ColorVariable::from_name(var.name()), Some(var));
        }
        assert_eq!(ColorVariable::from_name("accent_color"), None);
    }
}
