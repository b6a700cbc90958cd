//! Persistent storage for generated stylesheets.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

/// A writable location owned by the component.
#[async_trait(?Send)]
pub trait Storage {
    /// Replaces the file `name` with `contents` atomically.
    ///
    /// Readers see either the old or the new contents, never a partial
    /// write. Returns the path of the file.
    async fn replace_contents(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf>;
}

/// Storage in a directory on disk, created on first write.
#[derive(Debug, Clone)]
pub struct DataDir {
    dir: PathBuf,
}

impl DataDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

#[async_trait(?Send)]
impl Storage for DataDir {
    async fn replace_contents(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let target = self.dir.join(name);
        let contents = contents.to_vec();
        let written = target.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &written, &contents))
            .await
            .map_err(io::Error::other)??;

        tracing::debug!(path = %target.display(), "replaced stored file");
        Ok(target)
    }
}

/// Writes through a temporary file in `dir` renamed over `target`.
fn write_atomic(dir: &Path, target: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_creates_dir_and_writes() {
        let tmp = TempDir::new().unwrap();
        let storage = DataDir::new(tmp.path().join("data").join("tinct"));

        let path = storage.replace_contents("custom-theme.css", b"a {}").await.unwrap();
        assert_eq!(path, tmp.path().join("data").join("tinct").join("custom-theme.css"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a {}");
    }

    #[tokio::test]
    async fn test_replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let storage = DataDir::new(tmp.path());

        storage.replace_contents("custom-theme.css", b"first, longer").await.unwrap();
        let path = storage.replace_contents("custom-theme.css", b"second").await.unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "second");
        let leftovers = fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_unwritable_location_fails() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let storage = DataDir::new(blocker.join("inner"));
        assert!(storage.replace_contents("custom-theme.css", b"x").await.is_err());
    }
}
