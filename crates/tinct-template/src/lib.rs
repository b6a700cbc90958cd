//! # Tinct Template - Build-Time Theme Template Generation
//!
//! `tinct-template` turns an SCSS source tree into a *template*: a stylesheet
//! in which the customizable colors are placeholders rather than concrete
//! values. The runtime half of the system (the `tinct` crate) fills those
//! placeholders from user settings.
//!
//! ## Core Concepts
//!
//! - [`BuildConfig`]: the [`Variant`] (dark/light) being built and the
//!   [`Contrast`] tree being read
//! - [`ImportResolver`]: Sass-style partial lookup across search directories,
//!   with high-contrast palette redirection
//! - [`Generator`]: inlines imports, applies the transform, writes the file
//! - [`Template`]: placeholder-aware text with a checked [`fill`](Template::fill)
//! - [`ColorVariable`]: the closed set of placeholder names
//!
//! ## The Transform
//!
//! Applied once over the fully inlined tree:
//!
//! 1. `$contrast` and `$variant` are declared before anything else
//! 2. rules with the selector `stage` (preview-only blocks) are removed
//! 3. comments are removed
//! 4. `$bg_color`, `$fg_color`, `$card_bg_color` and `$search_bg_color`
//!    declarations get placeholder values
//! 5. `lighten`, `darken`, `transparentize` and `mix` become `st-lighten`
//!    and so on, unless preceded by `{`, `_` or `-`
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use tinct_template::{scss, transform, BuildConfig, ColorVariable, PlaceholderSyntax, Template};
//!
//! let mut sheet = scss::parse("$bg_color: #303030;\n.popup { background: lighten($bg_color, 5%); }").unwrap();
//! transform::apply(&mut sheet, &BuildConfig::default());
//! let text = sheet.to_string();
//! assert!(text.contains("st-lighten"));
//!
//! let template = Template::parse(text, PlaceholderSyntax::Interpolated).unwrap();
//! let filled = template.fill(&HashMap::from([(ColorVariable::Bg, "#111")])).unwrap();
//! assert!(filled.contains("$bg_color: #111;"));
//! ```

pub mod config;
mod error;
pub mod generator;
pub mod resolve;
pub mod scss;
pub mod template;
pub mod transform;
mod variable;

pub use config::{BuildConfig, Contrast, Variant};
pub use error::{GenerateError, TemplateError};
pub use generator::Generator;
pub use resolve::ImportResolver;
pub use template::{PlaceholderSyntax, Template};
pub use variable::ColorVariable;
