//! Read-only resource bundles addressed by URI.
//!
//! A bundle maps names under a URI prefix to content. Entries come either
//! from a directory on disk, read on every access, or from bytes embedded at
//! construction:
//!
//! ```rust
//! use tinct::{ResourceBundle, ResourceRegistry, RESOURCE_PREFIX};
//!
//! let bundle = ResourceBundle::from_entries(
//!     RESOURCE_PREFIX,
//!     [("stylesheet-dark.css", b".popup { color: white; }".to_vec())],
//! );
//! let registry = ResourceRegistry::new();
//! let registration = registry.register(bundle);
//!
//! let uri = format!("{RESOURCE_PREFIX}/stylesheet-dark.css");
//! assert!(registry.contains(&uri));
//! drop(registration);
//! assert!(!registry.contains(&uri));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use crate::error::ResourceError;
use crate::mode::ColorScheme;

/// Prefix of the bundled stylesheets and templates.
pub const RESOURCE_PREFIX: &str = "resource:///org/gnome/shell/extensions/tinct";

/// Name of the custom-color template for `scheme`.
pub fn template_name(scheme: ColorScheme) -> String {
    format!("template-{scheme}.css")
}

/// Name of the pre-built stylesheet for `scheme`.
pub fn stylesheet_name(scheme: ColorScheme) -> String {
    format!("stylesheet-{scheme}.css")
}

#[derive(Debug, Clone)]
enum ResourceEntry {
    File(PathBuf),
    Embedded(Rc<[u8]>),
}

/// Named resources under one URI prefix.
#[derive(Debug, Clone)]
pub struct ResourceBundle {
    prefix: String,
    entries: BTreeMap<String, ResourceEntry>,
}

impl ResourceBundle {
    /// A bundle over every file below `dir`, named by relative path.
    ///
    /// Only the listing happens here; contents are read on access.
    pub fn from_dir(prefix: impl Into<String>, dir: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let prefix = prefix.into();
        let root = dir.as_ref();
        let mut entries = BTreeMap::new();
        collect_files(&prefix, root, root, &mut entries)?;
        tracing::debug!(prefix = %prefix, count = entries.len(), "loaded resource bundle");
        Ok(Self { prefix, entries })
    }

    /// A bundle holding the given bytes.
    pub fn from_entries<N, B>(prefix: impl Into<String>, entries: impl IntoIterator<Item = (N, B)>) -> Self
    where
        N: Into<String>,
        B: Into<Vec<u8>>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, bytes)| {
                let bytes: Vec<u8> = bytes.into();
                (name.into(), ResourceEntry::Embedded(Rc::from(bytes)))
            })
            .collect();
        Self {
            prefix: prefix.into(),
            entries,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The URI of `name` in this bundle.
    pub fn uri(&self, name: &str) -> String {
        format!("{}/{}", self.prefix, name)
    }

    /// Entry names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.entry(uri).is_some()
    }

    /// Reads the entry at `uri`.
    pub async fn load_contents(&self, uri: &str) -> Result<Vec<u8>, ResourceError> {
        match self.entry(uri) {
            Some(ResourceEntry::Embedded(bytes)) => Ok(bytes.to_vec()),
            Some(ResourceEntry::File(path)) => {
                tokio::fs::read(path).await.map_err(|source| ResourceError::Io {
                    uri: uri.to_string(),
                    path: path.clone(),
                    source,
                })
            }
            None => Err(ResourceError::NotFound {
                uri: uri.to_string(),
            }),
        }
    }

    fn entry(&self, uri: &str) -> Option<&ResourceEntry> {
        let name = uri.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?;
        self.entries.get(name)
    }
}

fn collect_files(
    prefix: &str,
    current: &Path,
    root: &Path,
    entries: &mut BTreeMap<String, ResourceEntry>,
) -> Result<(), ResourceError> {
    let io_error = |path: &Path, source| ResourceError::Io {
        uri: prefix.to_string(),
        path: path.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(current).map_err(|e| io_error(current, e))? {
        let path = entry.map_err(|e| io_error(current, e))?.path();
        if path.is_dir() {
            collect_files(prefix, &path, root, entries)?;
        } else if path.is_file() {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.insert(name, ResourceEntry::File(path));
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Registered {
    next_id: Cell<u64>,
    bundles: RefCell<Vec<(u64, Rc<ResourceBundle>)>>,
}

/// The set of bundles currently available to lookups.
///
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    registered: Rc<Registered>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `bundle` available until the returned handle is dropped.
    #[must_use = "dropping the Registration unregisters the bundle"]
    pub fn register(&self, bundle: ResourceBundle) -> Registration {
        let id = self.registered.next_id.get();
        self.registered.next_id.set(id + 1);
        tracing::debug!(prefix = %bundle.prefix(), "registering resource bundle");
        self.registered.bundles.borrow_mut().push((id, Rc::new(bundle)));
        Registration {
            id,
            registered: Rc::downgrade(&self.registered),
        }
    }

    pub fn len(&self) -> usize {
        self.registered.bundles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.find(uri).is_some()
    }

    /// Reads `uri` from the most recently registered bundle holding it.
    pub async fn load_contents(&self, uri: &str) -> Result<Vec<u8>, ResourceError> {
        match self.find(uri) {
            Some(bundle) => bundle.load_contents(uri).await,
            None => Err(ResourceError::NotFound {
                uri: uri.to_string(),
            }),
        }
    }

    fn find(&self, uri: &str) -> Option<Rc<ResourceBundle>> {
        self.registered
            .bundles
            .borrow()
            .iter()
            .rev()
            .find(|(_, bundle)| bundle.contains(uri))
            .map(|(_, bundle)| Rc::clone(bundle))
    }
}

/// A registered bundle. Unregisters on drop.
#[derive(Debug)]
pub struct Registration {
    id: u64,
    registered: Weak<Registered>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(registered) = self.registered.upgrade() {
            registered.bundles.borrow_mut().retain(|(id, _)| *id != self.id);
            tracing::debug!("unregistered resource bundle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_names_for_schemes() {
        assert_eq!(template_name(ColorScheme::Light), "template-light.css");
        assert_eq!(stylesheet_name(ColorScheme::Dark), "stylesheet-dark.css");
    }

    #[tokio::test]
    async fn test_embedded_entries() {
        let bundle = ResourceBundle::from_entries("resource:///t", [("a.css", "a {}")]);
        assert!(bundle.contains("resource:///t/a.css"));
        assert!(!bundle.contains("resource:///t/b.css"));
        assert!(!bundle.contains("resource:///ta.css"));
        assert_eq!(bundle.load_contents("resource:///t/a.css").await.unwrap(), b"a {}");
    }

    #[tokio::test]
    async fn test_dir_bundle_reads_on_access() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("stylesheet-dark.css"), "old").unwrap();
        fs::write(tmp.path().join("nested").join("x.css"), "x").unwrap();

        let bundle = ResourceBundle::from_dir("resource:///t", tmp.path()).unwrap();
        assert_eq!(
            bundle.names().collect::<Vec<_>>(),
            vec!["nested/x.css", "stylesheet-dark.css"]
        );

        fs::write(tmp.path().join("stylesheet-dark.css"), "new").unwrap();
        let bytes = bundle.load_contents("resource:///t/stylesheet-dark.css").await.unwrap();
        assert_eq!(bytes, b"new");
    }

    #[tokio::test]
    async fn test_registry_misses_after_unregister() {
        let registry = ResourceRegistry::new();
        let registration =
            registry.register(ResourceBundle::from_entries("resource:///t", [("a.css", "a")]));
        assert_eq!(registry.len(), 1);
        assert!(registry.load_contents("resource:///t/a.css").await.is_ok());

        drop(registration);
        assert!(registry.is_empty());
        assert!(matches!(
            registry.load_contents("resource:///t/a.css").await,
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_removed_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.css"), "a").unwrap();
        let bundle = ResourceBundle::from_dir("resource:///t", tmp.path()).unwrap();
        fs::remove_file(tmp.path().join("a.css")).unwrap();

        assert!(matches!(
            bundle.load_contents("resource:///t/a.css").await,
            Err(ResourceError::Io { .. })
        ));
    }
}
