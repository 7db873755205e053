// CLASSIFICATION: COMMUNITY
// Filename: cache.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::result::CompilationResult;

/// Compilation results stored as one JSON file per cache key.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Cached result for `key`; unreadable entries count as misses.
    pub fn get(&self, key: &str) -> Option<CompilationResult> {
        let path = self.entry(key);
        let bytes = fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(result) => {
                debug!("cache hit {key}");
                Some(result)
            }
            Err(err) => {
                warn!("ignoring corrupt cache entry {}: {err}", path.display());
                None
            }
        }
    }

    /// Store `result` under `key`, replacing any previous entry atomically.
    pub fn put(&self, key: &str, result: &CompilationResult) -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, result)?;
        tmp.flush()?;
        tmp.persist(self.entry(key))
            .with_context(|| format!("store cache entry {key}"))?;
        Ok(())
    }
}
