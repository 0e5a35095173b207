use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Abstraction over the file operations used for list inputs and module outputs
pub trait FileSystem {
    /// Read file contents as a string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace `path` with `contents` so readers never observe a partial file
    fn atomic_write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read directory entries, sorted by path
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Real file system implementation using std::fs
#[derive(Debug, Default, Clone)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn atomic_write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Temp file in the destination directory so the rename never crosses mounts.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(std::fs::create_dir_all(path)?)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }
}

/// In-memory file system for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};

    #[derive(Debug, Default)]
    pub struct InMemoryFileSystem {
        files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
        directories: RefCell<BTreeSet<PathBuf>>,
    }

    impl InMemoryFileSystem {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a file to the mock file system
        pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<String>) {
            let path = path.as_ref().to_path_buf();
            if let Some(parent) = path.parent() {
                self.register_dirs(parent);
            }
            self.files
                .borrow_mut()
                .insert(path, contents.into().into_bytes());
        }

        pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
            self.files
                .borrow()
                .get(path.as_ref())
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }

        fn register_dirs(&self, path: &Path) {
            let mut current = PathBuf::new();
            for component in path.components() {
                current.push(component);
                self.directories.borrow_mut().insert(current.clone());
            }
        }
    }

    impl FileSystem for InMemoryFileSystem {
        fn read_to_string(&self, path: &Path) -> Result<String> {
            self.contents(path).ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                ))
            })
        }

        fn atomic_write(&self, path: &Path, contents: &[u8]) -> Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), contents.to_vec());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.borrow().contains_key(path) || self.directories.borrow().contains(path)
        }

        fn create_dir_all(&self, path: &Path) -> Result<()> {
            self.register_dirs(path);
            Ok(())
        }

        fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
            Ok(self
                .files
                .borrow()
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect())
        }
    }
}
