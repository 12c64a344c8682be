use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::GenerateError;

/// Errors while loading or persisting an ID cache file.
///
/// A missing cache file is not represented here: absence is the normal
/// "first generation" case and [`IdAllocator::load`] treats it as success.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("unreadable id cache '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("corrupt id cache '{path}': {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Assigns stable integer identifiers to named form fields.
///
/// Identifiers are backed by a persisted name-to-id cache so regenerating a
/// form keeps every previously assigned id, even when the field order in the
/// definition changes. One allocator serves exactly one generation run;
/// [`reset`](Self::reset) prepares it for the next.
#[derive(Debug)]
pub struct IdAllocator {
    /// Next id to hand out. Starts at 1; after a non-empty cache load,
    /// max(cached) + 1 so fresh ids never collide with cached ones.
    next_id: u32,
    /// Persisted field-name to id mapping. BTreeMap keeps serialization
    /// order stable so an unchanged run re-saves byte-identical content.
    cache: BTreeMap<String, u32>,
    /// Field names consumed during the current run; duplicate detection
    /// only, never persisted.
    used: HashSet<String>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            cache: BTreeMap::new(),
            used: HashSet::new(),
        }
    }

    /// Reinitialize for a fresh generation run, before any cache load.
    pub fn reset(&mut self) {
        self.next_id = 1;
        self.cache.clear();
        self.used.clear();
    }

    /// Resolve the id for a field reference.
    ///
    /// With no name: returns the current counter value without mutating
    /// anything. Anonymous blocks need a sequential id for layout but carry
    /// no durability requirement.
    ///
    /// With a name: returns the cached id if present, otherwise mints the
    /// next one and records it in the cache. The duplicate check runs after
    /// resolution so the first occurrence registers atomically with
    /// receiving its id.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::DuplicateFieldName`] if the same name was
    /// already requested during this run.
    pub fn get_id(&mut self, field: Option<&str>) -> Result<u32, GenerateError> {
        let Some(name) = field else {
            return Ok(self.next_id);
        };

        let id = match self.cache.get(name) {
            Some(&cached) => cached,
            None => {
                let minted = self.next_id;
                self.next_id += 1;
                self.cache.insert(name.to_owned(), minted);
                minted
            }
        };

        if !self.used.insert(name.to_owned()) {
            return Err(GenerateError::DuplicateFieldName {
                name: name.to_owned(),
            });
        }

        Ok(id)
    }

    /// Load a persisted cache. An absent file leaves the cache empty and
    /// logs an informational note; unreadable or corrupt content is an
    /// error. A non-empty load bumps the counter past every cached id.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] on I/O failure other than absence, or on
    /// unparseable content.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), CacheError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(cache = %path.display(), "no id cache yet, assigning fresh ids");
                return Ok(());
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        self.cache = serde_json::from_str(&raw).map_err(|source| CacheError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;

        if let Some(max) = self.cache.values().max() {
            self.next_id = max + 1;
        }
        Ok(())
    }

    /// Persist the cache, atomically overwriting any prior content. Runs on
    /// every successful generation, including ones that minted nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] on write or rename failure.
    pub fn flush(&self, path: impl AsRef<Path>) -> Result<(), CacheError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.cache).map_err(|source| {
            CacheError::Corrupt {
                path: path.display().to_string(),
                source,
            }
        })?;

        let tmp = path.with_extension("cache.tmp");
        let io_err = |source| CacheError::Io {
            path: path.display().to_string(),
            source,
        };
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Number of distinct field names consumed during this run.
    #[must_use]
    pub fn fields_used(&self) -> usize {
        self.used.len()
    }

    /// Current counter value, i.e. the id the next mint would receive.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// The full name-to-id mapping, cached and minted entries alike.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, u32> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mints_sequential_ids_from_one() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.get_id(Some("a")).unwrap(), 1);
        assert_eq!(alloc.get_id(Some("b")).unwrap(), 2);
        assert_eq!(alloc.get_id(Some("c")).unwrap(), 3);
    }

    #[test]
    fn anonymous_id_never_mutates() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.get_id(None).unwrap(), 1);
        assert_eq!(alloc.get_id(None).unwrap(), 1);
        assert!(alloc.entries().is_empty());
        assert_eq!(alloc.fields_used(), 0);

        alloc.get_id(Some("a")).unwrap();
        assert_eq!(alloc.get_id(None).unwrap(), 2);
        assert_eq!(alloc.fields_used(), 1);
    }

    #[test]
    fn duplicate_name_fails_on_second_request() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.get_id(Some("a")).unwrap(), 1);
        assert!(matches!(
            alloc.get_id(Some("a")),
            Err(GenerateError::DuplicateFieldName { name }) if name == "a"
        ));
    }

    #[test]
    fn cached_name_reuses_id_without_minting() {
        let mut alloc = IdAllocator::new();
        alloc.cache.insert("kept".to_owned(), 7);
        alloc.next_id = 8;
        assert_eq!(alloc.get_id(Some("kept")).unwrap(), 7);
        assert_eq!(alloc.next_id(), 8);
    }

    #[test]
    fn load_bumps_counter_past_cached_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.cache");
        fs::write(&path, r#"{"a": 1, "b": 5}"#).unwrap();

        let mut alloc = IdAllocator::new();
        alloc.load(&path).unwrap();
        assert_eq!(alloc.get_id(Some("c")).unwrap(), 6);
    }

    #[test]
    fn load_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut alloc = IdAllocator::new();
        alloc.load(dir.path().join("absent.cache")).unwrap();
        assert!(alloc.entries().is_empty());
        assert_eq!(alloc.next_id(), 1);
    }

    #[test]
    fn load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.cache");
        fs::write(&path, "not json at all {").unwrap();

        let mut alloc = IdAllocator::new();
        assert!(matches!(
            alloc.load(&path),
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[test]
    fn flush_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.cache");

        let mut alloc = IdAllocator::new();
        alloc.get_id(Some("first")).unwrap();
        alloc.get_id(Some("second")).unwrap();
        alloc.flush(&path).unwrap();

        let mut reloaded = IdAllocator::new();
        reloaded.load(&path).unwrap();
        assert_eq!(reloaded.entries(), alloc.entries());
        assert_eq!(reloaded.next_id(), 3);
    }

    #[test]
    fn flush_with_no_new_ids_rewrites_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.cache");

        let mut alloc = IdAllocator::new();
        alloc.get_id(Some("a")).unwrap();
        alloc.flush(&path).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        let mut again = IdAllocator::new();
        again.load(&path).unwrap();
        again.get_id(Some("a")).unwrap();
        again.flush(&path).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn reset_clears_everything() {
        let mut alloc = IdAllocator::new();
        alloc.get_id(Some("a")).unwrap();
        alloc.get_id(Some("b")).unwrap();
        alloc.reset();
        assert_eq!(alloc.next_id(), 1);
        assert!(alloc.entries().is_empty());
        assert_eq!(alloc.fields_used(), 0);
        assert_eq!(alloc.get_id(Some("a")).unwrap(), 1);
    }

    #[test]
    fn stable_across_runs_when_field_order_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.cache");

        let mut alloc = IdAllocator::new();
        let a1 = alloc.get_id(Some("a")).unwrap();
        let b1 = alloc.get_id(Some("b")).unwrap();
        alloc.flush(&path).unwrap();

        alloc.reset();
        alloc.load(&path).unwrap();
        let b2 = alloc.get_id(Some("b")).unwrap();
        let a2 = alloc.get_id(Some("a")).unwrap();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }
}
