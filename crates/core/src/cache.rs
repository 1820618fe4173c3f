//! Per-unit change detection for incremental passes.
//!
//! Tracks modification timestamps and content digests per source unit and
//! remembers which symbols each unit owns, so an incremental pass can skip
//! re-extracting declarations from unchanged files. Safe only under the
//! pipeline's single-writer, no-overlap assumption.

use crate::diag::Diagnostics;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use wireup_api::models::SourceUnit;

/// Content digest of one source unit.
///
/// `Surrogate` is the fail-safe fallback when the unit's bytes cannot be
/// read: it never compares equal, so the unit is always reprocessed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UnitDigest {
    Content([u8; 32]),
    Surrogate(u128),
}

impl UnitDigest {
    fn matches(&self, other: &UnitDigest) -> bool {
        match (self, other) {
            (UnitDigest::Content(a), UnitDigest::Content(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChangeTracker {
    timestamps: HashMap<PathBuf, u64>,
    digests: HashMap<PathBuf, UnitDigest>,
    unit_symbols: HashMap<PathBuf, HashSet<String>>,
    processed_symbols: HashSet<String>,
    dependency_cache: HashMap<String, Vec<String>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the unit must be re-extracted this pass.
    ///
    /// A never-seen unit is always reprocessed. A changed timestamp alone is
    /// not enough: the content digest decides. A timestamp-only change
    /// updates the stored timestamp and keeps the unit's cached symbols
    /// valid; a digest change evicts every symbol the unit owns before
    /// reporting "reprocess".
    pub fn should_reprocess(&mut self, unit: &SourceUnit, diag: &Diagnostics) -> bool {
        let path = unit.path.as_path();

        let Some(&cached_ts) = self.timestamps.get(path) else {
            self.timestamps.insert(path.to_path_buf(), unit.last_modified);
            let digest = self.digest_unit(path, diag);
            self.digests.insert(path.to_path_buf(), digest);
            return true;
        };

        if unit.last_modified == cached_ts {
            return false;
        }

        let current = self.digest_unit(path, diag);
        let unchanged = self
            .digests
            .get(path)
            .map(|cached| cached.matches(&current))
            .unwrap_or(false);

        self.timestamps.insert(path.to_path_buf(), unit.last_modified);
        if unchanged {
            diag.debug(&format!(
                "timestamp changed but content identical: {}",
                path.display()
            ));
            return false;
        }

        self.digests.insert(path.to_path_buf(), current);
        self.evict_unit(path, diag);
        true
    }

    /// Attribute a processed symbol to its owning unit.
    pub fn record_symbol(&mut self, unit: &SourceUnit, symbol: &str) {
        self.unit_symbols
            .entry(unit.path.clone())
            .or_default()
            .insert(symbol.to_string());
        self.processed_symbols.insert(symbol.to_string());
    }

    pub fn is_symbol_processed(&self, symbol: &str) -> bool {
        self.processed_symbols.contains(symbol)
    }

    pub fn cached_dependencies(&self, symbol: &str) -> Option<&[String]> {
        self.dependency_cache.get(symbol).map(Vec::as_slice)
    }

    pub fn cache_dependencies(&mut self, symbol: &str, dependencies: &[String]) {
        self.dependency_cache
            .insert(symbol.to_string(), dependencies.to_vec());
    }

    /// Drop everything attributed to a unit whose content changed.
    fn evict_unit(&mut self, path: &Path, diag: &Diagnostics) {
        let symbols = self.unit_symbols.remove(path).unwrap_or_default();
        for symbol in &symbols {
            self.processed_symbols.remove(symbol);
            self.dependency_cache.remove(symbol);
        }
        diag.debug(&format!(
            "evicted cache for {}: {} symbol(s)",
            path.display(),
            symbols.len()
        ));
    }

    fn digest_unit(&self, path: &Path, diag: &Diagnostics) -> UnitDigest {
        match fs::read(path) {
            Ok(bytes) => {
                let mut hasher = Sha256::new();
                hasher.update(&bytes);
                UnitDigest::Content(hasher.finalize().into())
            }
            Err(err) => {
                diag.warn(&format!(
                    "failed to hash {}: {err}; forcing reprocess",
                    path.display()
                ));
                let tick = SystemTime::now()
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or(0);
                UnitDigest::Surrogate(tick)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn unit(path: &Path, last_modified: u64) -> SourceUnit {
        SourceUnit {
            path: path.to_path_buf(),
            last_modified,
        }
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn unseen_unit_is_reprocessed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "A.kt", "class A");
        let diag = Diagnostics::default();
        let mut tracker = ChangeTracker::new();

        assert!(tracker.should_reprocess(&unit(&path, 100), &diag));
        assert!(!tracker.should_reprocess(&unit(&path, 100), &diag));
    }

    #[test]
    fn timestamp_only_change_keeps_cached_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "A.kt", "class A");
        let diag = Diagnostics::default();
        let mut tracker = ChangeTracker::new();

        let first = unit(&path, 100);
        assert!(tracker.should_reprocess(&first, &diag));
        tracker.record_symbol(&first, "com.test.A");

        // Touch-only rebuild: new mtime, identical bytes.
        assert!(!tracker.should_reprocess(&unit(&path, 200), &diag));
        assert!(tracker.is_symbol_processed("com.test.A"));
    }

    #[test]
    fn content_change_evicts_owned_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "A.kt", "class A");
        let diag = Diagnostics::default();
        let mut tracker = ChangeTracker::new();

        let first = unit(&path, 100);
        assert!(tracker.should_reprocess(&first, &diag));
        tracker.record_symbol(&first, "com.test.A");
        tracker.cache_dependencies("com.test.A", &["com.test.IDep".to_string()]);

        write_file(&dir, "A.kt", "class A { /* changed */ }");
        assert!(tracker.should_reprocess(&unit(&path, 200), &diag));
        assert!(!tracker.is_symbol_processed("com.test.A"));
        assert!(tracker.cached_dependencies("com.test.A").is_none());
    }

    #[test]
    fn unreadable_unit_always_reprocesses() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "A.kt", "class A");
        let diag = Diagnostics::default();
        let mut tracker = ChangeTracker::new();

        assert!(tracker.should_reprocess(&unit(&path, 100), &diag));
        fs::remove_file(&path).unwrap();

        // Digest falls back to a surrogate that never matches.
        assert!(tracker.should_reprocess(&unit(&path, 200), &diag));
        assert!(tracker.should_reprocess(&unit(&path, 300), &diag));
    }

    #[test]
    fn dependency_cache_roundtrip() {
        let mut tracker = ChangeTracker::new();
        let deps = vec!["com.test.IFoo".to_string(), "com.test.IBar".to_string()];
        tracker.cache_dependencies("com.test.Impl", &deps);
        assert_eq!(tracker.cached_dependencies("com.test.Impl"), Some(&deps[..]));
        assert!(tracker.cached_dependencies("com.test.Other").is_none());
    }
}
