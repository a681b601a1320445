//! Caller-owned cache of parsed exports.
//!
//! Parsing a large workbook is the slowest step of a report, and analysts
//! usually run several date ranges against the same file. Entries are keyed by
//! the SHA-256 of the file contents, so an edited file is a miss even when its
//! path is unchanged.

use crate::error::ReportResult;
use crate::loader::{self, LoadedDataset, SourceFormat};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    content_hash: String,
    format: SourceFormat,
    sheet: Option<String>,
}

impl CacheKey {
    pub fn new(bytes: &[u8], format: SourceFormat, sheet: Option<&str>) -> Self {
        Self {
            content_hash: content_hash(bytes),
            format,
            sheet: sheet.map(str::to_string),
        }
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    dataset: Arc<LoadedDataset>,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, reusing the parsed dataset when the file contents and
    /// sheet selector match an earlier load.
    pub fn load(&mut self, path: &Path, sheet: Option<&str>) -> ReportResult<Arc<LoadedDataset>> {
        let format = SourceFormat::from_path(path)?;
        let bytes = std::fs::read(path)?;
        let key = CacheKey::new(&bytes, format, sheet);

        if let Some(entry) = self.entries.get(&key) {
            debug!(path = %path.display(), hash = key.content_hash(), "dataset cache hit");
            return Ok(Arc::clone(&entry.dataset));
        }

        let dataset = Arc::new(loader::load_bytes(&bytes, format, sheet)?);
        debug!(path = %path.display(), hash = key.content_hash(), "dataset cache miss");
        self.entries.insert(
            key,
            CacheEntry {
                path: path.to_path_buf(),
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Drop every entry loaded from `path`. Returns how many were removed.
    pub fn invalidate(&mut self, path: &Path) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.path != path);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
