//! Types for UPK package handling

use std::fmt;

use serde::{Serialize, Serializer};

use super::{
    VER_ADDITIONAL_COOK_PACKAGES, VER_IMPORT_EXPORT_GUIDS, VER_LEGACY_EXPORT_ARRAY_DROPPED,
    VER_TEXTURE_ALLOCATIONS, VER_THUMBNAIL_TABLE,
};

/// Four 32-bit words identifying a package or export.
///
/// Opaque: printed and compared, never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Guid {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.a,
            self.b & 0xffff,
            (self.b >> 16) & 0xffff,
            self.c & 0xff,
            (self.c >> 8) & 0xff,
            (self.c >> 16) & 0xff,
            (self.c >> 24) & 0xff,
            self.d & 0xff,
            (self.d >> 8) & 0xff,
            (self.d >> 16) & 0xff,
            (self.d >> 24) & 0xff,
        )
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Index into the name table plus the numeric suffix that distinguishes
/// `Thing` from `Thing_0`, `Thing_1`, ...
///
/// Only produced by table decoding, which validates the index against the
/// name table before constructing the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRef {
    /// Position in the name table.
    pub index: u32,
    /// Numeric suffix; zero means the bare name.
    pub number: i32,
}

/// Decoded form of the signed object index used throughout the import and
/// export tables: zero means no reference, a positive value points into the
/// export table and a negative one into the import table (both 1-based on
/// disk, 0-based here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef {
    None,
    Import(usize),
    Export(usize),
}

impl ObjectRef {
    /// Decode the on-disk signed representation.
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => ObjectRef::None,
            i if i > 0 => ObjectRef::Export(i as usize - 1),
            i => ObjectRef::Import((-(i64::from(i)) - 1) as usize),
        }
    }

    /// The on-disk signed representation.
    #[must_use]
    pub fn raw(self) -> i32 {
        match self {
            ObjectRef::None => 0,
            ObjectRef::Export(i) => i as i32 + 1,
            ObjectRef::Import(i) => -(i as i32) - 1,
        }
    }

    #[must_use]
    pub fn is_none(self) -> bool {
        matches!(self, ObjectRef::None)
    }
}

/// One decoded name-table entry: the string plus its context-flags word.
///
/// The flags are kept for reporting only; they play no structural role.
#[derive(Debug, Clone)]
pub struct NameTableEntry {
    pub name: String,
    pub context_flags: u64,
}

/// A reference to an object defined in another package.
#[derive(Debug, Clone)]
pub struct Import {
    pub class_package: NameRef,
    pub class_name: NameRef,
    /// Restricted to `None` or `Import`; a reference into exports is a
    /// format violation rejected at decode time.
    pub outer: ObjectRef,
    pub object_name: NameRef,
}

/// An object serialized inside this package, with its resolved display
/// fields and the anchor the repackage pass patches through.
#[derive(Debug, Clone)]
pub struct Export {
    pub class_index: ObjectRef,
    pub super_index: ObjectRef,
    pub outer_index: ObjectRef,
    pub object_name: NameRef,
    pub archetype_index: ObjectRef,
    pub object_flags: u64,
    /// Byte length of this export's payload.
    pub serialize_size: i32,
    /// Absolute file position of this export's payload.
    pub serial_offset: i32,
    pub export_flags: u32,
    pub generation_net_object_counts: Vec<i32>,
    pub guid: Guid,
    pub package_flags: u32,
    /// Absolute file offset of the serialize-size field. The repackage pass
    /// seeks back here and overwrites size and offset together, in that
    /// order.
    pub size_field_offset: u64,
    /// Display name resolved from `object_name`.
    pub name: String,
    /// Class display name resolved from `class_index`; empty when the class
    /// index is zero.
    pub class_name: String,
    /// Names of the containing exports along the outer chain, root first.
    pub package_path: Vec<String>,
}

/// Per-generation summary from the package header.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerationSummary {
    pub export_count: i32,
    pub name_count: i32,
    pub net_object_count: i32,
}

/// Descriptor of one compressed chunk. Descriptive only: a nonzero
/// compression-flags word aborts table decoding altogether.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompressedChunk {
    pub uncompressed_offset: u32,
    pub uncompressed_size: u32,
    pub compressed_offset: u32,
    pub compressed_size: u32,
}

/// Texture allocation summary (engine version 767 and later).
#[derive(Debug, Clone, Serialize)]
pub struct TextureAllocation {
    pub size_x: i32,
    pub size_y: i32,
    pub num_mips: i32,
    pub format: u32,
    pub tex_create_flags: u32,
    pub export_indices: Vec<i32>,
}

/// Import/export GUID table location (engine version 623 and later).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GuidTableInfo {
    pub import_export_guids_offset: i32,
    pub import_guids_count: i32,
    pub export_guids_count: i32,
}

/// Presence of the version-gated header and table fields, resolved once
/// from the 16-bit engine version instead of scattering comparisons through
/// the decode logic.
#[derive(Debug, Clone, Copy)]
pub struct VersionCaps {
    pub has_guid_offsets: bool,
    pub has_thumbnail_offset: bool,
    pub has_additional_packages: bool,
    pub has_texture_allocations: bool,
    pub has_legacy_export_array: bool,
}

impl VersionCaps {
    #[must_use]
    pub fn for_engine_version(version: u16) -> Self {
        Self {
            has_guid_offsets: version >= VER_IMPORT_EXPORT_GUIDS,
            has_thumbnail_offset: version >= VER_THUMBNAIL_TABLE,
            has_additional_packages: version >= VER_ADDITIONAL_COOK_PACKAGES,
            has_texture_allocations: version >= VER_TEXTURE_ALLOCATIONS,
            has_legacy_export_array: version < VER_LEGACY_EXPORT_ARRAY_DROPPED,
        }
    }
}

/// Decoded package header.
///
/// Read once at the start of processing and read-only afterward; the engine
/// version gates every conditional field for the rest of the decode.
#[derive(Debug, Clone)]
pub struct UpkHeader {
    pub tag: u32,
    /// Combined version word: engine version in the low 16 bits, licensee
    /// version in the high 16.
    pub file_version: u32,
    /// Number of bytes copied verbatim into a repackaged output.
    pub total_header_size: i32,
    pub folder_name: String,
    pub package_flags: u32,
    pub name_count: i32,
    pub name_offset: i32,
    pub export_count: i32,
    pub export_offset: i32,
    pub import_count: i32,
    pub import_offset: i32,
    pub depends_offset: i32,
    pub guid_table: Option<GuidTableInfo>,
    pub thumbnail_table_offset: Option<i32>,
    pub guid: Guid,
    pub generations: Vec<GenerationSummary>,
    pub engine_version: i32,
    pub cooked_content_version: i32,
    pub compression_flags: u32,
    pub compressed_chunks: Vec<CompressedChunk>,
    pub package_source: u32,
    /// Empty on engine versions before 516.
    pub additional_packages_to_cook: Vec<String>,
    /// Empty on engine versions before 767.
    pub texture_allocations: Vec<TextureAllocation>,
}

impl UpkHeader {
    /// The 16-bit engine version that gates the conditional fields.
    #[must_use]
    pub fn file_version_low(&self) -> u16 {
        (self.file_version & 0xffff) as u16
    }

    /// The licensee version from the high half of the version word.
    #[must_use]
    pub fn licensee_version(&self) -> u16 {
        (self.file_version >> 16) as u16
    }

    /// Whether any compression flag bit is set. A compressed package's
    /// tables cannot be decoded in place.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.compression_flags != 0
    }

    #[must_use]
    pub fn caps(&self) -> VersionCaps {
        VersionCaps::for_engine_version(self.file_version_low())
    }
}
