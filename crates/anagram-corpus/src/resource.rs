use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Makes a named auxiliary resource available as bytes.
///
/// Implemented for any `Fn(&str) -> io::Result<Vec<u8>>`, so tests and callers
/// can pass a closure instead of a concrete loader.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, locator: &str) -> io::Result<Vec<u8>>;
}

impl<F> ResourceLoader for F
where
    F: Fn(&str) -> io::Result<Vec<u8>> + Send + Sync,
{
    fn load(&self, locator: &str) -> io::Result<Vec<u8>> {
        self(locator)
    }
}

/// Resolves locators as filesystem paths.
#[derive(Clone, Debug, Default)]
pub struct FsResources {
    root: Option<PathBuf>,
}

impl FsResources {
    /// Open locators exactly as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative locators against `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(locator),
            None => PathBuf::from(locator),
        }
    }
}

impl ResourceLoader for FsResources {
    fn load(&self, locator: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(locator))
    }
}

/// A local directory that resources are copied into before processing starts.
///
/// Staged resources are addressed by file name only; any directory part of a
/// locator is discarded on lookup, so `/remote/lists/skip.txt` and `skip.txt`
/// name the same cached copy.
#[derive(Clone, Debug)]
pub struct ResourceCache {
    dir: PathBuf,
}

impl ResourceCache {
    /// Create (if needed) and use `dir` as the cache directory.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("create resource cache {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the cache and return the locator to load it by.
    pub fn stage(&self, source: impl AsRef<Path>) -> Result<String> {
        let source = source.as_ref();
        let name = file_name(source)
            .with_context(|| format!("resource {} has no file name", source.display()))?;
        let target = self.dir.join(&name);
        fs::copy(source, &target).with_context(|| {
            format!("stage {} into {}", source.display(), target.display())
        })?;
        Ok(name)
    }
}

impl ResourceLoader for ResourceCache {
    fn load(&self, locator: &str) -> io::Result<Vec<u8>> {
        let name = file_name(Path::new(locator)).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("resource locator `{locator}` has no file name"),
            )
        })?;
        fs::read(self.dir.join(name))
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Resources held in memory, keyed by locator.
#[derive(Clone, Debug, Default)]
pub struct MemoryResources {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locator: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(locator.into(), bytes.into());
    }

    pub fn with(mut self, locator: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(locator, bytes);
        self
    }
}

impl ResourceLoader for MemoryResources {
    fn load(&self, locator: &str) -> io::Result<Vec<u8>> {
        self.entries.get(locator).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no resource named `{locator}`"),
            )
        })
    }
}
