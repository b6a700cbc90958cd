//! The template transform applied to a fully inlined stylesheet.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::BuildConfig;
use crate::scss::{Declaration, Node, Stylesheet};
use crate::template::PlaceholderSyntax;
use crate::variable::ColorVariable;

/// Selector of preview-only blocks removed from templates.
pub const STAGE_SELECTOR: &str = "stage";

/// Color functions rewritten to their `st-` staged equivalents.
pub const STAGED_FUNCTIONS: [&str; 4] = ["lighten", "darken", "transparentize", "mix"];

static STAGED_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(&STAGED_FUNCTIONS.join("|")).expect("static pattern"));

/// Turns a stylesheet into a template for `config`.
///
/// - `$contrast` and `$variant` are declared first, in that order
/// - rules with selector `stage` are removed
/// - comments are removed
/// - the four color variables get placeholder values
/// - staged functions are renamed in every declaration value
pub fn apply(sheet: &mut Stylesheet, config: &BuildConfig) {
    sheet.prepend(Node::Declaration(Declaration::new(
        "$variant",
        quoted(config.variant.as_str()),
    )));
    sheet.prepend(Node::Declaration(Declaration::new(
        "$contrast",
        quoted(config.contrast.as_str()),
    )));

    sheet.retain(|node| match node {
        Node::Comment(_) => false,
        Node::Rule(rule) => rule.selector != STAGE_SELECTOR,
        _ => true,
    });

    sheet.for_each_declaration_mut(|decl| {
        if let Some(var) = color_variable(&decl.prop) {
            decl.value = PlaceholderSyntax::Interpolated.token(var);
        }
        decl.value = rename_functions(&decl.value);
    });
}

fn quoted(value: &str) -> String {
    format!("'{}'", value)
}

/// Maps `$bg_color` and friends to their variable.
fn color_variable(prop: &str) -> Option<ColorVariable> {
    prop.strip_prefix('$').and_then(ColorVariable::from_name)
}

/// Prefixes staged color functions with `st-`.
///
/// An occurrence directly after `{`, `_` or `-` is left alone, which also makes
/// the rename idempotent.
///
/// ```rust
/// use tinct_template::transform::rename_functions;
///
/// assert_eq!(rename_functions("lighten($c, 10%)"), "st-lighten($c, 10%)");
/// assert_eq!(rename_functions("_lighten($c,10%)"), "_lighten($c,10%)");
/// ```
pub fn rename_functions(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last = 0;

    for m in STAGED_FUNCTION.find_iter(value) {
        let guarded = value[..m.start()]
            .chars()
            .next_back()
            .map(|c| matches!(c, '{' | '_' | '-'))
            .unwrap_or(false);
        out.push_str(&value[last..m.start()]);
        if !guarded {
            out.push_str("st-");
        }
        out.push_str(m.as_str());
        last = m.end();
    }

    out.push_str(&value[last..]);
    out
}
