//! Contract for ProGuard/R8-style deobfuscation providers.
//!
//! Obfuscated Java/Kotlin frames resolve much like native ones: one
//! obfuscated frame can expand to several original frames when the compiler
//! inlined calls. The engine only needs the remapping capability; parsing
//! mapping files is the provider's problem.

/// A deobfuscated Java/Kotlin stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaFrame {
    pub class: String,
    pub method: String,
    pub line: u32,
    pub file: Option<String>,
}

/// Remaps obfuscated class and method names back to their originals.
pub trait JavaRemapper {
    /// Remaps an obfuscated class name. `None` when the class is not in the
    /// mapping, in which case the caller keeps the obfuscated name.
    fn remap_class(&self, class: &str) -> Option<String>;

    /// Remaps a method without line information. Ambiguous without a line;
    /// may return every candidate. Empty means unmapped.
    fn remap_method(&self, class: &str, method: &str) -> Vec<JavaFrame>;

    /// Remaps one frame to its original frames, outermost inlining caller
    /// last. Empty means unmapped; the caller keeps the obfuscated frame.
    fn remap_frame(&self, class: &str, method: &str, line: u32) -> Vec<JavaFrame>;
}
