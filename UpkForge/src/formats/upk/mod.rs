//! UE3 package (UPK) format reader
//!
//! Decodes the package header and the three interlinked index tables
//! (names, imports, exports). Payload bytes are never touched here; the
//! repackage engine streams them separately.

mod exports;
pub mod flags;
mod header;
mod imports;
mod names;
mod read;
mod reader;
mod types;

pub use exports::ExportTable;
pub use imports::ImportTable;
pub use names::NameTable;
pub use reader::{UpkPackage, UpkReader};
pub use types::{
    CompressedChunk, Export, GenerationSummary, Guid, GuidTableInfo, Import, NameRef,
    NameTableEntry, ObjectRef, TextureAllocation, UpkHeader, VersionCaps,
};

/// UE3 package file tag, the first four bytes of every package.
pub const PACKAGE_FILE_TAG: u32 = 0x9E2A83C1;

/// Engine version that introduced the additional-packages-to-cook list.
pub const VER_ADDITIONAL_COOK_PACKAGES: u16 = 516;

/// Engine version that dropped the legacy per-export dependency array.
pub const VER_LEGACY_EXPORT_ARRAY_DROPPED: u16 = 543;

/// Engine version that introduced the thumbnail table offset.
pub const VER_THUMBNAIL_TABLE: u16 = 584;

/// Engine version that introduced the import/export GUID tables.
pub const VER_IMPORT_EXPORT_GUIDS: u16 = 623;

/// Engine version that introduced texture allocation summaries.
pub const VER_TEXTURE_ALLOCATIONS: u16 = 767;
