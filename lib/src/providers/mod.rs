//! Contracts for the external lookup providers the engine consumes.
//!
//! Building these lookup structures (object-file parsing, mapping-file
//! parsing, source map parsing) is out of scope; the engine only depends on
//! the capabilities declared here. [`archive::JsonArchive`] is the one
//! in-tree implementation, an adapter over prebuilt symbol tables.

use debugid::DebugId;
use serde::Deserialize;

pub mod archive;
pub mod proguard;
pub mod sourcemap;

/// One resolved source location.
///
/// A lookup that returns more than one location is reporting an inline call
/// chain: the first element is the direct hit at the address, followed by
/// each inlining caller in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceLocation {
    pub symbol_address: u64,
    pub instruction_address: u64,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub language: String,
    pub symbol: String,
    #[serde(default)]
    pub full_path: String,
}

/// A prebuilt address-to-source lookup structure for one binary image.
///
/// Handles are read-only once built; the engine shares them freely across
/// worker tasks and never mutates them during a pass.
pub trait SymbolCache: Send + Sync {
    /// The architecture of the image this cache was built from.
    fn architecture(&self) -> &str;

    /// The debug id tying this cache to a report's image.
    fn debug_id(&self) -> DebugId;

    /// Resolves an address (relative to the image base) to its inline chain,
    /// innermost first. An empty result means the address has no known
    /// symbol and is not an error.
    fn lookup(&self, addr: u64) -> anyhow::Result<Vec<SourceLocation>>;
}

/// A source of symbol caches, typically one debug-information archive
/// holding one object per architecture.
pub trait DebugArchive {
    /// Builds a cache for every object in the archive. Failing on any single
    /// object must fail the whole call; the directory refuses partial
    /// coverage.
    fn symbol_caches(&self) -> anyhow::Result<Vec<Box<dyn SymbolCache>>>;
}
