//! Per-language symbol name normalization.

/// Demangles a raw linker symbol into its display name, keyed by the source
/// language the symbol cache reported.
///
/// This is a safe no-op for every case it cannot handle: unknown languages,
/// already-plain names, and names the demanglers reject all come back
/// unchanged. It must never fail the pipeline.
pub fn demangle(raw: &str, language: &str) -> String {
    match language {
        "rust" => match rustc_demangle::try_demangle(raw) {
            // The alternate form drops the trailing hash.
            Ok(demangled) => format!("{demangled:#}"),
            Err(_) => raw.to_string(),
        },
        "cpp" | "c++" | "objcpp" => match cpp_demangle::Symbol::new(raw) {
            Ok(symbol) => symbol.to_string(),
            Err(_) => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demangles_rust() {
        assert_eq!(
            demangle(
                "_ZN11collections5slice29_$LT$impl$u20$$u5b$T$u5d$$GT$10as_mut_ptr17hf12a6d0409938c96E",
                "rust"
            ),
            "collections::slice::<impl [T]>::as_mut_ptr"
        );
    }

    #[test]
    fn demangles_cpp() {
        assert_eq!(
            demangle("_ZNSaIcEC1ERKS_", "cpp"),
            "std::allocator<char>::allocator(std::allocator<char> const&)"
        );
    }

    #[test]
    fn plain_name_passes_through() {
        assert_eq!(demangle("main", "cpp"), "main");
    }

    #[test]
    fn unknown_language_is_a_no_op() {
        let mangled = "$s15crashcrashcrash4loopyyF";
        assert_eq!(demangle(mangled, "swift"), mangled);
        assert_eq!(demangle(mangled, "unknown-language"), mangled);
        assert_eq!(demangle("", "unknown-language"), "");
    }

    #[test]
    fn wrong_scheme_for_language_passes_through() {
        // A Rust hash handed to the cpp path, and vice versa, never panics
        // or garbles.
        assert_eq!(demangle("not mangled at all", "rust"), "not mangled at all");
        assert_eq!(demangle("@@@", "cpp"), "@@@");
    }
}
