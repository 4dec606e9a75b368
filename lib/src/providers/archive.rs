//! File-backed debug archives holding prebuilt symbol tables.
//!
//! The format is a JSON document with one entry per object. Each object
//! carries sorted, non-overlapping address ranges, and each range stores the
//! full inline chain to report for addresses falling inside it. This keeps
//! real debug-info parsing out of the engine while giving the CLI something
//! it can actually run against.

use super::{DebugArchive, SourceLocation, SymbolCache};
use anyhow::Context;
use debugid::DebugId;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ArchiveFile {
    #[serde(default)]
    objects: Vec<ObjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    debug_id: DebugId,
    arch: String,
    #[serde(default)]
    ranges: Vec<RangeEntry>,
}

#[derive(Debug, Deserialize)]
struct RangeEntry {
    /// Inclusive start of the instruction range, relative to the image base.
    start: u64,
    /// Exclusive end of the range.
    end: u64,
    /// Inline chain reported for the range, innermost first.
    locations: Vec<SourceLocation>,
}

/// A debug archive loaded from a JSON symbol table.
#[derive(Debug)]
pub struct JsonArchive {
    objects: Vec<ObjectEntry>,
}

impl JsonArchive {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read symbol archive {}", path.display()))?;
        Self::from_slice(&data)
            .with_context(|| format!("failed to parse symbol archive {}", path.display()))
    }

    pub fn from_slice(data: &[u8]) -> anyhow::Result<Self> {
        let file: ArchiveFile = serde_json::from_slice(data)?;
        Ok(JsonArchive {
            objects: file.objects,
        })
    }
}

impl DebugArchive for JsonArchive {
    fn symbol_caches(&self) -> anyhow::Result<Vec<Box<dyn SymbolCache>>> {
        self.objects
            .iter()
            .map(|object| {
                let mut ranges: Vec<Range> = object
                    .ranges
                    .iter()
                    .map(|r| {
                        anyhow::ensure!(
                            r.start < r.end,
                            "empty address range {:#x}..{:#x} in object {}",
                            r.start,
                            r.end,
                            object.debug_id
                        );
                        Ok(Range {
                            start: r.start,
                            end: r.end,
                            locations: r.locations.clone(),
                        })
                    })
                    .collect::<anyhow::Result<_>>()?;
                ranges.sort_by_key(|r| r.start);
                for pair in ranges.windows(2) {
                    anyhow::ensure!(
                        pair[0].end <= pair[1].start,
                        "overlapping address ranges in object {}",
                        object.debug_id
                    );
                }
                Ok(Box::new(JsonSymbolCache {
                    debug_id: object.debug_id,
                    arch: object.arch.clone(),
                    ranges,
                }) as Box<dyn SymbolCache>)
            })
            .collect()
    }
}

#[derive(Debug)]
struct Range {
    start: u64,
    end: u64,
    locations: Vec<SourceLocation>,
}

struct JsonSymbolCache {
    debug_id: DebugId,
    arch: String,
    ranges: Vec<Range>,
}

impl SymbolCache for JsonSymbolCache {
    fn architecture(&self) -> &str {
        &self.arch
    }

    fn debug_id(&self) -> DebugId {
        self.debug_id
    }

    fn lookup(&self, addr: u64) -> anyhow::Result<Vec<SourceLocation>> {
        let index = match self.ranges.partition_point(|r| r.start <= addr) {
            0 => return Ok(Vec::new()),
            n => n - 1,
        };
        let range = &self.ranges[index];
        if addr >= range.end {
            return Ok(Vec::new());
        }
        Ok(range.locations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCHIVE: &str = r#"{
        "objects": [
            {
                "debug_id": "cb63147a-c9dc-308b-8ca1-ee92a5042e8e",
                "arch": "arm64",
                "ranges": [
                    {
                        "start": 4072,
                        "end": 4084,
                        "locations": [
                            {
                                "symbol_address": 4072,
                                "instruction_address": 4072,
                                "line": 9,
                                "language": "swift",
                                "symbol": "$s15crashcrashcrash11crashTheAppyyF",
                                "full_path": "/tmp/main.swift"
                            }
                        ]
                    },
                    {
                        "start": 4084,
                        "end": 4200,
                        "locations": [
                            {
                                "symbol_address": 4294967295,
                                "instruction_address": 4196,
                                "line": 0,
                                "language": "swift",
                                "symbol": "Swift runtime failure: Unexpectedly found nil while unwrapping an Optional value",
                                "full_path": ""
                            },
                            {
                                "symbol_address": 4084,
                                "instruction_address": 4196,
                                "line": 12,
                                "language": "swift",
                                "symbol": "$s15crashcrashcrash4loopyyF",
                                "full_path": "/tmp/main.swift"
                            }
                        ]
                    }
                ]
            }
        ]
    }"#;

    fn cache() -> Box<dyn SymbolCache> {
        JsonArchive::from_slice(ARCHIVE.as_bytes())
            .unwrap()
            .symbol_caches()
            .unwrap()
            .pop()
            .unwrap()
    }

    #[test]
    fn lookup_returns_inline_chain_in_order() {
        let locations = cache().lookup(4196).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(
            locations[0].symbol,
            "Swift runtime failure: Unexpectedly found nil while unwrapping an Optional value"
        );
        assert_eq!(locations[0].symbol_address, 4294967295);
        assert_eq!(locations[1].symbol, "$s15crashcrashcrash4loopyyF");
        assert_eq!(locations[1].symbol_address, 4084);
    }

    #[test]
    fn lookup_outside_all_ranges_is_empty() {
        let cache = cache();
        assert!(cache.lookup(0).unwrap().is_empty());
        assert!(cache.lookup(4200).unwrap().is_empty());
    }

    #[test]
    fn range_boundaries_are_start_inclusive_end_exclusive() {
        let cache = cache();
        assert_eq!(cache.lookup(4084).unwrap().len(), 2);
        assert_eq!(cache.lookup(4083).unwrap().len(), 1);
        assert_eq!(cache.lookup(4199).unwrap().len(), 2);
    }

    #[test]
    fn cache_reports_object_identity() {
        let cache = cache();
        assert_eq!(cache.architecture(), "arm64");
        assert_eq!(
            cache.debug_id(),
            "cb63147a-c9dc-308b-8ca1-ee92a5042e8e".parse().unwrap()
        );
    }

    #[test]
    fn overlapping_ranges_fail_the_whole_archive() {
        let archive = JsonArchive::from_slice(
            br#"{
                "objects": [
                    {
                        "debug_id": "cb63147a-c9dc-308b-8ca1-ee92a5042e8e",
                        "arch": "arm64",
                        "ranges": [
                            { "start": 0, "end": 16, "locations": [] },
                            { "start": 8, "end": 24, "locations": [] }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        assert!(archive.symbol_caches().is_err());
    }
}
