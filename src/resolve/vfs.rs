//! Filesystem capability for the resolver.
//!
//! The resolver only ever needs two questions answered: "is this a regular
//! file" and "is this a directory". Putting them behind a trait keeps the
//! resolution algorithm pure and lets tests run against a synthetic tree
//! without touching disk.

use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Minimal filesystem lookup capability
pub trait Vfs: Sync {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskVfs;

impl Vfs for DiskVfs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Synthetic in-memory tree for tests.
///
/// Directories are implied by the ancestors of the registered files.
#[derive(Debug, Default)]
pub struct MemoryVfs {
    files: FxHashSet<PathBuf>,
    dirs: FxHashSet<PathBuf>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file; all ancestor directories become directories.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        let path: PathBuf = path.into();
        let mut parent = path.parent();
        while let Some(dir) = parent {
            self.dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
        self.files.insert(path);
    }
}

impl Vfs for MemoryVfs {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}
