//! Loading a source tree and turning it into a template file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::error::GenerateError;
use crate::resolve::{absolutize, ImportResolver};
use crate::scss::{self, AtRule, Node, Stylesheet};
use crate::transform;

/// Generates templates for one [`BuildConfig`].
///
/// # Example
///
/// ```rust,ignore
/// use tinct_template::{BuildConfig, Generator, ImportResolver};
///
/// let config = BuildConfig::default();
/// let resolver = ImportResolver::new(config.contrast)
///     .with_dir("resources/css")
///     .with_dir("resources/css/gnome-shell-sass");
///
/// let generator = Generator::new(config, resolver);
/// let path = generator.write_template("resources/css/stylesheet.scss", "build")?;
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    config: BuildConfig,
    resolver: ImportResolver,
}

impl Generator {
    pub fn new(config: BuildConfig, resolver: ImportResolver) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ImportResolver {
        &self.resolver
    }

    /// File name of the template this generator writes.
    pub fn output_name(&self) -> String {
        format!("template-{}.scss", self.config.variant)
    }

    /// Reads `entry` and inlines its imports, without transforming.
    ///
    /// Each file is inlined at most once; later imports of the same file are
    /// dropped, which also terminates import cycles.
    pub fn load(&self, entry: impl AsRef<Path>) -> Result<Stylesheet, GenerateError> {
        let mut seen = HashSet::new();
        let nodes = self.load_file(entry.as_ref(), &mut seen)?;
        Ok(Stylesheet::new(nodes))
    }

    /// Loads, transforms and serializes `entry`.
    pub fn generate(&self, entry: impl AsRef<Path>) -> Result<String, GenerateError> {
        let mut sheet = self.load(entry)?;
        transform::apply(&mut sheet, &self.config);
        Ok(sheet.to_string())
    }

    /// Generates the template and writes it into `out_dir`.
    ///
    /// Returns the path of the written file.
    pub fn write_template(
        &self,
        entry: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<PathBuf, GenerateError> {
        let text = self.generate(entry)?;
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir).map_err(|e| GenerateError::io(out_dir, e))?;

        let path = out_dir.join(self.output_name());
        fs::write(&path, text).map_err(|e| GenerateError::io(&path, e))?;
        tracing::info!(
            variant = %self.config.variant,
            contrast = %self.config.contrast,
            path = %path.display(),
            "wrote template"
        );
        Ok(path)
    }

    fn load_file(&self, path: &Path, seen: &mut HashSet<PathBuf>) -> Result<Vec<Node>, GenerateError> {
        seen.insert(canonical(path));
        let source = fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        let sheet = scss::parse(&source).map_err(|e| e.with_path(path))?;
        self.inline_imports(sheet.nodes, seen)
    }

    fn inline_imports(
        &self,
        nodes: Vec<Node>,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<Vec<Node>, GenerateError> {
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            let names = match &node {
                Node::AtRule(at) => import_names(at),
                _ => None,
            };
            let Some(names) = names else {
                out.push(node);
                continue;
            };

            for name in names {
                let path = self.resolver.resolve(&name)?;
                if seen.contains(&canonical(&path)) {
                    tracing::debug!(import = %name, "skipping already inlined import");
                    continue;
                }
                out.extend(self.load_file(&path, seen)?);
            }
        }

        Ok(out)
    }
}

/// Quoted names of an inlinable `@import`, or `None` to keep the rule as-is.
///
/// Plain CSS imports (`url(...)`, remote URLs, `.css` files, media-qualified
/// imports) are left for the stylesheet compiler.
fn import_names(at: &AtRule) -> Option<Vec<String>> {
    if at.name != "import" || at.children.is_some() {
        return None;
    }

    let mut names = Vec::new();
    for part in at.params.split(',') {
        let part = part.trim();
        let name = part
            .strip_prefix('\'')
            .and_then(|p| p.strip_suffix('\''))
            .or_else(|| part.strip_prefix('"').and_then(|p| p.strip_suffix('"')))?;
        let remote = name.starts_with("http://") || name.starts_with("https://") || name.starts_with("//");
        if remote || name.ends_with(".css") {
            return None;
        }
        names.push(name.to_string());
    }
    Some(names)
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| {
        let cwd = std::env::current_dir().unwrap_or_default();
        absolutize(&cwd, path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Contrast;

    fn at_import(params: &str) -> AtRule {
        AtRule {
            name: "import".to_string(),
            params: params.to_string(),
            children: None,
        }
    }

    #[test]
    fn test_import_names_quoted_list() {
        assert_eq!(
            import_names(&at_import("'colors', \"drawing\"")),
            Some(vec!["colors".to_string(), "drawing".to_string()])
        );
    }

    #[test]
    fn test_import_names_keeps_css_imports() {
        assert_eq!(import_names(&at_import("url(base.css)")), None);
        assert_eq!(import_names(&at_import("'base.css'")), None);
        assert_eq!(import_names(&at_import("'https://example.org/x'")), None);
        assert_eq!(import_names(&at_import("'print' screen")), None);
    }

    #[test]
    fn test_import_names_ignores_other_at_rules() {
        let at = AtRule {
            name: "use".to_string(),
            params: "'colors'".to_string(),
            children: None,
        };
        assert_eq!(import_names(&at), None);
    }

    #[test]
    fn test_output_name_follows_variant() {
        let generator = Generator::new(
            BuildConfig::new(crate::config::Variant::Light, Contrast::High),
            ImportResolver::new(Contrast::High),
        );
        assert_eq!(generator.output_name(), "template-light.scss");
    }
}
