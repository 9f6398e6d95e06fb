//! Named flag bits for package, compression and export flag words.
//!
//! Used by the report renderers; the decoder itself only ever tests the
//! compression word against zero.

/// Package-flags word bits.
pub const PACKAGE_FLAGS: &[(&str, u32)] = &[
    ("AllowDownload", 0x00000001),
    ("ClientOptional", 0x00000002),
    ("ServerSideOnly", 0x00000004),
    ("Cooked", 0x00000008),
    ("Unsecure", 0x00000010),
    ("SavedWithNewerVersion", 0x00000020),
    ("Need", 0x00008000),
    ("Compiling", 0x00010000),
    ("ContainsMap", 0x00020000),
    ("Trash", 0x00040000),
    ("DisallowLazyLoading", 0x00080000),
    ("PlayInEditor", 0x00100000),
    ("ContainsScript", 0x00200000),
    ("ContainsDebugInfo", 0x00400000),
    ("RequireImportsAlreadyLoaded", 0x00800000),
    ("StoreCompressed", 0x02000000),
    ("StoreFullyCompressed", 0x04000000),
    ("ContainsFaceFXData", 0x10000000),
    ("NoExportAllowed", 0x20000000),
    ("StrippedSource", 0x40000000),
    ("FilterEditorOnly", 0x80000000),
];

/// Compression-flags word bits.
pub const COMPRESSION_FLAGS: &[(&str, u32)] = &[
    ("ZLIB", 0x01),
    ("LZO", 0x02),
    ("LZX", 0x04),
    ("BiasMemory", 0x10),
    ("BiasSpeed", 0x20),
    ("ForcePPUDecompressZLib", 0x80),
];

/// Export-flags word bits.
pub const EXPORT_FLAGS: &[(&str, u32)] = &[
    ("ForcedExport", 0x1),
    ("ScriptPatcherExport", 0x2),
    ("MemberFieldPatchPending", 0x4),
];

/// Names of the bits set in `value`.
#[must_use]
pub fn set_flag_names(value: u32, table: &[(&'static str, u32)]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(_, bit)| value & bit != 0)
        .map(|(name, _)| *name)
        .collect()
}

/// Render a flags word as a bracketed name list, e.g. `[Cooked,ContainsMap]`.
#[must_use]
pub fn format_flags(value: u32, table: &[(&'static str, u32)]) -> String {
    format!("[{}]", set_flag_names(value, table).join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_follow_bit_order() {
        let names = set_flag_names(0x0002_0008, PACKAGE_FLAGS);
        assert_eq!(names, vec!["Cooked", "ContainsMap"]);
    }

    #[test]
    fn empty_word_renders_empty_brackets() {
        assert_eq!(format_flags(0, COMPRESSION_FLAGS), "[]");
    }

    #[test]
    fn unknown_bits_are_ignored() {
        assert_eq!(format_flags(0x40, COMPRESSION_FLAGS), "[]");
    }
}
