//! Import resolution across an ordered list of search directories.
//!
//! Names are resolved the way Sass partials are:
//!
//! | Requested | Candidates (per directory) |
//! |-----------|----------------------------|
//! | `drawing` | `drawing.scss`, `_drawing.scss` |
//! | `_drawing` | `_drawing.scss` |
//! | `widgets/entry` | `widgets/entry.scss`, `widgets/_entry.scss` |
//! | `base.css` | `base.css` |
//!
//! Directories are searched in registration order and candidates in the order
//! above; the first existing file wins.
//!
//! # High Contrast
//!
//! When the resolver is built for [`Contrast::High`], the logical name
//! `colors` is redirected to `high-contrast-colors` before any candidate is
//! formed. There is no fallback to the normal palette: a missing high-contrast
//! file is an error.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::config::Contrast;
use crate::error::GenerateError;

/// Extension appended to extensionless import names.
pub const SOURCE_EXTENSION: &str = ".scss";

/// Logical name of the color palette source.
pub const COLORS: &str = "colors";

/// Name the palette is redirected to for high-contrast builds.
pub const HIGH_CONTRAST_COLORS: &str = "high-contrast-colors";

/// Resolves `@import` names to files.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    search_dirs: Vec<PathBuf>,
    contrast: Contrast,
}

impl ImportResolver {
    /// Creates a resolver with no search directories.
    pub fn new(contrast: Contrast) -> Self {
        Self {
            search_dirs: Vec::new(),
            contrast,
        }
    }

    /// Adds a search directory, returning `self` for chaining.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.add_dir(dir);
        self
    }

    /// Adds a search directory. Earlier directories take precedence.
    pub fn add_dir(&mut self, dir: impl Into<PathBuf>) {
        self.search_dirs.push(dir.into());
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    pub fn contrast(&self) -> Contrast {
        self.contrast
    }

    /// Applies the high-contrast palette redirection.
    pub fn logical_name<'a>(&self, id: &'a str) -> Cow<'a, str> {
        if !self.contrast.is_high() {
            return Cow::Borrowed(id);
        }
        match id.strip_prefix('_') {
            Some(COLORS) => Cow::Owned(format!("_{}", HIGH_CONTRAST_COLORS)),
            None if id == COLORS => Cow::Borrowed(HIGH_CONTRAST_COLORS),
            _ => Cow::Borrowed(id),
        }
    }

    /// Returns the relative file names tried for `id`, in order.
    pub fn candidates(&self, id: &str) -> Vec<String> {
        let name = self.logical_name(id);
        if has_extension(&name) {
            return vec![name.into_owned()];
        }

        let (dir, file) = match name.rfind('/') {
            Some(at) => (&name[..=at], &name[at + 1..]),
            None => ("", name.as_ref()),
        };

        let mut candidates = vec![format!("{}{}{}", dir, file, SOURCE_EXTENSION)];
        if !file.starts_with('_') {
            candidates.push(format!("{}_{}{}", dir, file, SOURCE_EXTENSION));
        }
        candidates
    }

    /// Resolves `id` to the first existing candidate file.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::ImportNotFound`] with every path tried.
    pub fn resolve(&self, id: &str) -> Result<PathBuf, GenerateError> {
        let candidates = self.candidates(id);
        let mut tried = Vec::new();

        for dir in &self.search_dirs {
            for candidate in &candidates {
                let path = dir.join(candidate);
                if path.is_file() {
                    tracing::debug!(import = id, path = %path.display(), "resolved import");
                    return Ok(path);
                }
                tried.push(path);
            }
        }

        Err(GenerateError::ImportNotFound {
            name: self.logical_name(id).into_owned(),
            tried,
        })
    }
}

/// True when the name already carries an extension, e.g. `base.css`.
///
/// A dot counts only when it sits between two characters.
fn has_extension(name: &str) -> bool {
    let bytes = name.as_bytes();
    (1..bytes.len().saturating_sub(1)).any(|i| bytes[i] == b'.')
}

/// Resolves paths relative to a directory when they are not absolute.
pub(crate) fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
