//! Contract for minified-JavaScript position resolution via source maps.

/// The original-source token a minified position resolves to, with
/// surrounding source context for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub line: u32,
    pub col: u32,
    pub src: String,
    pub name: Option<String>,
    pub function_name: Option<String>,
    pub context_line: Option<String>,
    pub pre_context: Vec<String>,
    pub post_context: Vec<String>,
}

/// Resolves minified line/column positions against a prebuilt source map
/// cache.
pub trait SourceMapLookup {
    /// Looks up a zero-based minified position. `context_lines` bounds how
    /// many lines of surrounding source are returned on each side. `None`
    /// when no token covers the position.
    fn lookup(&self, line: u32, col: u32, context_lines: u32) -> Option<Token>;
}
