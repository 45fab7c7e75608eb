//! Locate and load the partitions of a text corpus.
//!
//! A corpus is either a single file or a directory whose visible regular files
//! are the partitions. Each partition is loaded whole, either memory-mapped or
//! read into an owned buffer ([`LoadMode`]), and exposes its content as a lazy
//! iterator of lines. Lines end at `\n`, a trailing `\r` is dropped and
//! invalid UTF-8 is replaced rather than rejected, so only I/O failures are
//! errors.
//!
//! Auxiliary inputs such as skip-word lists are not read from paths directly;
//! they go through a [`ResourceLoader`] so callers can swap in a staged cache,
//! an in-memory map, or a closure.
//!
//! # Example
//! ```no_run
//! use anagram_corpus::{LoadMode, Partition, discover_partitions};
//!
//! # fn main() -> anyhow::Result<()> {
//! for path in discover_partitions("/path/to/corpus")? {
//!     let partition = Partition::load(&path, LoadMode::Mmap)?;
//!     println!("{}: {} lines", path.display(), partition.lines().count());
//! }
//! # Ok(()) }
//! ```

mod resource;

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use memmap2::Mmap;

pub use resource::{FsResources, MemoryResources, ResourceCache, ResourceLoader};

/// Strategy for loading partition files.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each partition (fast, zero-copy).
    #[default]
    Mmap,
    /// Read each partition into an owned buffer (portable fallback).
    Owned,
}

impl FromStr for LoadMode {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Ok(LoadMode::Mmap),
            "owned" => Ok(LoadMode::Owned),
            other => Err(format!("unknown load mode `{other}` (expected mmap or owned)")),
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// One independently processable slice of the corpus.
pub struct Partition {
    path: PathBuf,
    buffer: Buffer,
}

impl Partition {
    /// Load a partition file with the given backing strategy.
    pub fn load(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let buffer = load_file(&path, mode)?;
        Ok(Self { path, buffer })
    }

    /// Wrap bytes that are already in memory, e.g. a request body.
    pub fn from_bytes(name: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: name.into(),
            buffer: Buffer::Owned(bytes.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the partition in bytes.
    pub fn len(&self) -> usize {
        self.buffer.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lines(&self) -> Lines<'_> {
        Lines {
            rest: self.buffer.as_slice(),
        }
    }
}

/// Iterator over the lines of a [`Partition`].
pub struct Lines<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Lines<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let (line, rest) = match self.rest.iter().position(|b| *b == b'\n') {
            Some(idx) => (&self.rest[..idx], &self.rest[idx + 1..]),
            None => (self.rest, &self.rest[self.rest.len()..]),
        };
        self.rest = rest;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Some(String::from_utf8_lossy(line))
    }
}

/// List the partitions of a corpus, ordered by path.
///
/// A file input is its own single partition. For a directory, every visible
/// regular file directly inside it is a partition; names starting with `_` or
/// `.` are treated as hidden (job markers, editor files) and skipped.
pub fn discover_partitions(input: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    let meta =
        fs::metadata(input).with_context(|| format!("input path {}", input.display()))?;
    if meta.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut partitions = Vec::new();
    let entries =
        fs::read_dir(input).with_context(|| format!("list directory {}", input.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list directory {}", input.display()))?;
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", path.display()))?;
        if file_type.is_file() {
            partitions.push(path);
        }
    }
    partitions.sort();
    Ok(partitions)
}

/// Whether a path names a hidden file (`_name` or `.name`).
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('_') || name.starts_with('.'))
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let len = file
                .metadata()
                .with_context(|| format!("stat {}", path.display()))?
                .len();
            if len == 0 {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(partition: &Partition) -> Vec<String> {
        partition.lines().map(|l| l.into_owned()).collect()
    }

    #[test]
    fn splits_lines_and_strips_carriage_returns() {
        let partition = Partition::from_bytes("mem", "one two\r\nthree\n\nfour");
        assert_eq!(collect(&partition), vec!["one two", "three", "", "four"]);
    }

    #[test]
    fn trailing_newline_does_not_add_a_line() {
        let partition = Partition::from_bytes("mem", "alpha\nbeta\n");
        assert_eq!(collect(&partition), vec!["alpha", "beta"]);
        assert_eq!(Partition::from_bytes("mem", "").lines().count(), 0);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let partition = Partition::from_bytes("mem", b"ok\xffok\n".to_vec());
        assert_eq!(collect(&partition), vec!["ok\u{fffd}ok"]);
    }

    #[test]
    fn parses_load_modes() {
        assert_eq!("MMAP".parse::<LoadMode>(), Ok(LoadMode::Mmap));
        assert_eq!("owned".parse::<LoadMode>(), Ok(LoadMode::Owned));
        assert!("heap".parse::<LoadMode>().is_err());
    }

    #[test]
    fn hidden_names() {
        assert!(is_hidden(Path::new("/data/_SUCCESS")));
        assert!(is_hidden(Path::new(".swp")));
        assert!(!is_hidden(Path::new("/data/part-00000")));
    }
}
