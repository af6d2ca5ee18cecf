//! Content-id to resource-path dictionary.
//!
//! Archives address resources by hash only; human-readable names come
//! from externally maintained path listings. The dictionary is an
//! explicitly constructed context object so extraction sessions stay
//! independently testable - there is no process-wide name table.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use nightwave_common::fnv;
use rustc_hash::FxHashMap;

/// A lookup table from content id to resource path.
#[derive(Debug, Clone, Default)]
pub struct PathDictionary {
    by_id: FxHashMap<u64, String>,
}

impl PathDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dictionary from a path listing file.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Parse a path listing: one resource path per line, `#` comments
    /// and blank lines ignored.
    pub fn from_reader<R: Read>(reader: R) -> io::Result<Self> {
        let mut dict = Self::new();

        for line in BufReader::new(reader).lines() {
            let line = line?;
            let path = line.trim();
            if path.is_empty() || path.starts_with('#') {
                continue;
            }
            dict.add(path);
        }

        Ok(dict)
    }

    /// Hash a resource path the way the engine addresses it: separators
    /// normalized to `\`, lowercased, then FNV-1a 64.
    pub fn hash_path(path: &str) -> u64 {
        fnv::hash_str(&path.trim().replace('/', "\\").to_ascii_lowercase())
    }

    /// Register a path, returning its content id.
    pub fn add(&mut self, path: &str) -> u64 {
        let id = Self::hash_path(path);
        self.by_id.insert(id, path.trim().to_string());
        id
    }

    /// Look up the path for a content id.
    pub fn lookup(&self, id: u64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Number of known paths.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
