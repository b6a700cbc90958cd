//! Error types for theme resolution.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;
use tinct_template::TemplateError;

use crate::presentation::StylesheetId;

/// Why a custom theme could not be produced.
///
/// The manager never surfaces these to callers: each one is logged and the
/// pass falls back to the dark built-in stylesheet.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The template resource could not be read.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The template bytes were not UTF-8.
    #[error("template is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),

    /// The template text was rejected or could not be filled.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Writing the filled stylesheet to storage failed.
    #[error("failed to write '{name}': {source}")]
    Write {
        /// File name within the storage location.
        name: String,
        #[source]
        source: io::Error,
    },

    /// The written stylesheet could not be swapped in.
    #[error(transparent)]
    Presentation(#[from] PresentationError),

    /// A settings snapshot or manager configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Errors raised by resource bundles.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No registered bundle contains the URI.
    #[error("resource not found: {uri}")]
    NotFound { uri: String },

    /// The resource is backed by a file that could not be read.
    #[error("failed to read resource {uri} from {}: {source}", .path.display())]
    Io {
        uri: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors reported by a [`PresentationContext`](crate::PresentationContext).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresentationError {
    #[error("failed to load stylesheet {id}: {reason}")]
    Load { id: StylesheetId, reason: String },

    #[error("failed to unload stylesheet {id}: {reason}")]
    Unload { id: StylesheetId, reason: String },
}

/// A color literal that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color literal '{0}'")]
pub struct ColorParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_names_file() {
        let err = ThemeError::Write {
            name: "custom-theme.css".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert_eq!(err.to_string(), "failed to write 'custom-theme.css': read-only");
    }

    #[test]
    fn test_resource_error_is_transparent() {
        let err: ThemeError = ResourceError::NotFound {
            uri: "resource:///x/template-dark.css".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "resource not found: resource:///x/template-dark.css");
    }

    #[test]
    fn test_presentation_error_is_transparent() {
        let err: ThemeError = PresentationError::Load {
            id: StylesheetId::File(PathBuf::from("/data/custom-theme.css")),
            reason: "rejected".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "failed to load stylesheet /data/custom-theme.css: rejected"
        );
    }
}
