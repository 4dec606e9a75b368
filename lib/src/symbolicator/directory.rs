//! The per-report directory of symbol caches, keyed by debug id.

use crate::error::DirectoryBuildError;
use crate::providers::{DebugArchive, SymbolCache};
use debugid::DebugId;
use std::collections::HashMap;

/// Maps each resolvable image's debug id to its symbol cache.
///
/// Built once from the debug archives available for a report, read-only
/// afterwards. Construction is all-or-nothing: if any object fails to
/// produce a cache, the whole build fails rather than exposing partial
/// coverage, which is much harder to diagnose downstream.
pub struct CacheDirectory {
    caches: HashMap<DebugId, Box<dyn SymbolCache>>,
}

impl CacheDirectory {
    pub fn from_archives<'a, I>(archives: I) -> Result<Self, DirectoryBuildError>
    where
        I: IntoIterator<Item = &'a dyn DebugArchive>,
    {
        let mut caches: HashMap<DebugId, Box<dyn SymbolCache>> = HashMap::new();
        for archive in archives {
            for cache in archive.symbol_caches().map_err(DirectoryBuildError)? {
                let debug_id = cache.debug_id();
                if caches.insert(debug_id, cache).is_some() {
                    log::warn!("duplicate symbol cache for {debug_id}, keeping the later archive");
                }
            }
        }
        Ok(CacheDirectory { caches })
    }

    /// Looks up the cache for an image. Absence is the valid "no debug info
    /// for this image" state, not an error.
    pub fn get(&self, debug_id: &DebugId) -> Option<&dyn SymbolCache> {
        self.caches.get(debug_id).map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SourceLocation;

    struct FakeCache(DebugId);

    impl SymbolCache for FakeCache {
        fn architecture(&self) -> &str {
            "arm64"
        }

        fn debug_id(&self) -> DebugId {
            self.0
        }

        fn lookup(&self, _addr: u64) -> anyhow::Result<Vec<SourceLocation>> {
            Ok(Vec::new())
        }
    }

    struct FakeArchive(Vec<DebugId>);

    impl DebugArchive for FakeArchive {
        fn symbol_caches(&self) -> anyhow::Result<Vec<Box<dyn SymbolCache>>> {
            Ok(self
                .0
                .iter()
                .map(|id| Box::new(FakeCache(*id)) as Box<dyn SymbolCache>)
                .collect())
        }
    }

    struct BrokenArchive;

    impl DebugArchive for BrokenArchive {
        fn symbol_caches(&self) -> anyhow::Result<Vec<Box<dyn SymbolCache>>> {
            anyhow::bail!("malformed object")
        }
    }

    fn id(byte: u8) -> DebugId {
        format!("00000000-0000-0000-0000-0000000000{byte:02x}")
            .parse()
            .unwrap()
    }

    #[test]
    fn collects_caches_across_archives() {
        let a = FakeArchive(vec![id(1), id(2)]);
        let b = FakeArchive(vec![id(3)]);
        let directory =
            CacheDirectory::from_archives([&a as &dyn DebugArchive, &b as &dyn DebugArchive])
                .unwrap();
        assert_eq!(directory.len(), 3);
        assert!(directory.get(&id(2)).is_some());
    }

    #[test]
    fn absent_entry_is_not_an_error() {
        let directory =
            CacheDirectory::from_archives([&FakeArchive(vec![id(1)]) as &dyn DebugArchive])
                .unwrap();
        assert!(directory.get(&id(9)).is_none());
    }

    #[test]
    fn any_failing_archive_fails_the_build() {
        let good = FakeArchive(vec![id(1)]);
        let result = CacheDirectory::from_archives([
            &good as &dyn DebugArchive,
            &BrokenArchive as &dyn DebugArchive,
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_debug_id_keeps_later_archive() {
        let a = FakeArchive(vec![id(1)]);
        let b = FakeArchive(vec![id(1)]);
        let directory =
            CacheDirectory::from_archives([&a as &dyn DebugArchive, &b as &dyn DebugArchive])
                .unwrap();
        assert_eq!(directory.len(), 1);
    }
}
