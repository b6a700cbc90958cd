//! Error types for template generation and filling.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while generating a template from stylesheet sources.
///
/// All of these are fatal to a build: the generator never emits a partial
/// template.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// An `@import` did not match any file in the search directories.
    #[error("import '{name}' not found (tried: {})", join_paths(.tried))]
    ImportNotFound {
        /// The logical name after contrast redirection.
        name: String,
        /// Every candidate path that was checked, in search order.
        tried: Vec<PathBuf>,
    },

    /// Reading a source file or writing the template failed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// Path that could not be read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The source could not be split into rules and declarations.
    #[error("failed to parse stylesheet{}: {message}", origin(.path))]
    Parse {
        /// Optional source file path.
        path: Option<PathBuf>,
        /// What went wrong.
        message: String,
    },
}

impl GenerateError {
    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a file path to a parse error that was raised without one.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            GenerateError::Parse {
                path: None,
                message,
            } => GenerateError::Parse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

/// Errors raised by [`Template`](crate::Template) parsing and filling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template references a placeholder outside the known set.
    #[error("unknown placeholder '{name}' at byte {offset}")]
    UnknownPlaceholder { name: String, offset: usize },

    /// A placeholder used by the template was given no value.
    #[error("no value provided for placeholder '{name}'")]
    MissingValue { name: &'static str },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}
