//! Templates with runtime color placeholders.
//!
//! A [`Template`] is the seam between build time and runtime. The generator
//! writes placeholders into the stylesheet source in their
//! [`Interpolated`](PlaceholderSyntax::Interpolated) form, `#{"$"}bg_color`.
//! The stylesheet compiler evaluates that interpolation to the
//! [`Bare`](PlaceholderSyntax::Bare) form, `$bg_color`, which is what the
//! packaged CSS templates contain and what the runtime fills.
//!
//! Both stages use the same value type: the text is split once into literal
//! and placeholder segments, and every placeholder must name a
//! [`ColorVariable`].
//!
//! ```rust
//! use std::collections::HashMap;
//! use tinct_template::{ColorVariable, PlaceholderSyntax, Template};
//!
//! let template = Template::parse(".popup { color: $fg_color; }", PlaceholderSyntax::Bare).unwrap();
//! let values = HashMap::from([(ColorVariable::Fg, "rgb(255,255,255)")]);
//! assert_eq!(template.fill(&values).unwrap(), ".popup { color: rgb(255,255,255); }");
//! ```

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TemplateError;
use crate::variable::ColorVariable;

static INTERPOLATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#\{"\$"\}([A-Za-z_][A-Za-z0-9_]*)"#).expect("static pattern"));

static BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("static pattern"));

/// How placeholders are spelled in a template's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSyntax {
    /// `#{"$"}name`, as emitted by the generator into SCSS.
    Interpolated,
    /// `$name`, as found in compiled CSS.
    Bare,
}

impl PlaceholderSyntax {
    /// The placeholder token for `var` in this syntax.
    pub fn token(self, var: ColorVariable) -> String {
        match self {
            PlaceholderSyntax::Interpolated => format!("#{{\"$\"}}{}", var.name()),
            PlaceholderSyntax::Bare => format!("${}", var.name()),
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            PlaceholderSyntax::Interpolated => &INTERPOLATED,
            PlaceholderSyntax::Bare => &BARE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(ColorVariable),
}

/// Immutable template text with its placeholders located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    syntax: PlaceholderSyntax,
    segments: Vec<Segment>,
    placeholders: BTreeSet<ColorVariable>,
}

impl Template {
    /// Splits `text` into literal and placeholder segments.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownPlaceholder`] for the first placeholder
    /// whose name is not a [`ColorVariable`].
    pub fn parse(text: impl Into<String>, syntax: PlaceholderSyntax) -> Result<Self, TemplateError> {
        let source = text.into();
        let mut segments = Vec::new();
        let mut placeholders = BTreeSet::new();
        let mut last = 0;

        for caps in syntax.pattern().captures_iter(&source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let var = ColorVariable::from_name(name.as_str()).ok_or_else(|| {
                TemplateError::UnknownPlaceholder {
                    name: name.as_str().to_string(),
                    offset: whole.start(),
                }
            })?;
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(var));
            placeholders.insert(var);
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        Ok(Self {
            source,
            syntax,
            segments,
            placeholders,
        })
    }

    /// The original, unfilled text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn syntax(&self) -> PlaceholderSyntax {
        self.syntax
    }

    /// The variables this template references.
    pub fn placeholders(&self) -> &BTreeSet<ColorVariable> {
        &self.placeholders
    }

    /// Substitutes every placeholder with its value.
    ///
    /// Values for variables the template does not reference are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingValue`] for the first referenced
    /// variable without a value.
    pub fn fill<V: AsRef<str>>(&self, values: &HashMap<ColorVariable, V>) -> Result<String, TemplateError> {
        if let Some(missing) = self.placeholders.iter().find(|v| !values.contains_key(*v)) {
            return Err(TemplateError::MissingValue {
                name: missing.name(),
            });
        }

        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(var) => {
                    if let Some(value) = values.get(var) {
                        out.push_str(value.as_ref());
                    }
                }
            }
        }
        Ok(out)
    }
}
