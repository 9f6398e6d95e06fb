//! Report rendering over the decoded package model.
//!
//! The decoder exposes read-only structures; everything here is a view.
//! Two renderings are provided: a human-readable text dump and a
//! serde-serializable model for JSON output.

use std::io::{self, Write};

use serde::Serialize;

use crate::formats::upk::flags::{
    format_flags, set_flag_names, COMPRESSION_FLAGS, EXPORT_FLAGS, PACKAGE_FLAGS,
};
use crate::formats::upk::{
    CompressedChunk, GenerationSummary, Guid, GuidTableInfo, TextureAllocation, UpkPackage,
};

/// Report renderer over a decoded package.
pub struct PackageReport<'a> {
    package: &'a UpkPackage,
}

impl<'a> PackageReport<'a> {
    #[must_use]
    pub fn new(package: &'a UpkPackage) -> Self {
        Self { package }
    }

    /// Write the human-readable report.
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let header = &self.package.header;

        writeln!(
            out,
            "File version: {} (licensee {})",
            header.file_version_low(),
            header.licensee_version()
        )?;
        writeln!(out, "Total header size: {:#x}", header.total_header_size)?;
        writeln!(out, "Folder name: {}", header.folder_name)?;
        writeln!(
            out,
            "Package flags: ({:#x}) {}",
            header.package_flags,
            format_flags(header.package_flags, PACKAGE_FLAGS)
        )?;
        writeln!(
            out,
            "Names: {} at {:#x}",
            header.name_count, header.name_offset
        )?;
        writeln!(
            out,
            "Exports: {} at {:#x}",
            header.export_count, header.export_offset
        )?;
        writeln!(
            out,
            "Imports: {} at {:#x}",
            header.import_count, header.import_offset
        )?;
        writeln!(out, "Depends offset: {:#x}", header.depends_offset)?;
        if let Some(guids) = &header.guid_table {
            writeln!(
                out,
                "Import/export guids: offset {:#x}, {} import, {} export",
                guids.import_export_guids_offset,
                guids.import_guids_count,
                guids.export_guids_count
            )?;
        }
        if let Some(offset) = header.thumbnail_table_offset {
            writeln!(out, "Thumbnail table offset: {offset:#x}")?;
        }
        writeln!(out, "Guid: {}", header.guid)?;
        if !header.generations.is_empty() {
            writeln!(out, "Generations:")?;
            for generation in &header.generations {
                writeln!(
                    out,
                    "  exports {}, names {}, net objects {}",
                    generation.export_count, generation.name_count, generation.net_object_count
                )?;
            }
        }
        writeln!(out, "Engine version: {}", header.engine_version)?;
        writeln!(
            out,
            "Cooked content version: {}",
            header.cooked_content_version
        )?;
        writeln!(
            out,
            "Compression flags: ({:#x}) {}",
            header.compression_flags,
            format_flags(header.compression_flags, COMPRESSION_FLAGS)
        )?;
        if !header.compressed_chunks.is_empty() {
            writeln!(out, "Compressed chunks:")?;
            for chunk in &header.compressed_chunks {
                writeln!(
                    out,
                    "  uncompressed {:#x}+{:#x}, compressed {:#x}+{:#x}",
                    chunk.uncompressed_offset,
                    chunk.uncompressed_size,
                    chunk.compressed_offset,
                    chunk.compressed_size
                )?;
            }
        }
        writeln!(out, "Package source: {:#x}", header.package_source)?;
        if !header.additional_packages_to_cook.is_empty() {
            writeln!(out, "Additional packages to cook:")?;
            for package in &header.additional_packages_to_cook {
                writeln!(out, "  {package}")?;
            }
        }
        if !header.texture_allocations.is_empty() {
            writeln!(out, "Texture allocations:")?;
            for allocation in &header.texture_allocations {
                writeln!(
                    out,
                    "  {}x{} mips {} format {} flags {:#x} exports {:?}",
                    allocation.size_x,
                    allocation.size_y,
                    allocation.num_mips,
                    allocation.format,
                    allocation.tex_create_flags,
                    allocation.export_indices
                )?;
            }
        }

        self.write_names(out)?;
        self.write_imports(out)?;
        self.write_exports(out)?;
        Ok(())
    }

    fn write_names<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Name table:")?;
        for (i, entry) in self.package.names.entries().iter().enumerate() {
            writeln!(
                out,
                "  [{i}] {} (context flags {:#x})",
                entry.name, entry.context_flags
            )?;
        }
        Ok(())
    }

    fn write_imports<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let names = &self.package.names;
        writeln!(out, "Import table:")?;
        for (i, import) in self.package.imports.entries().iter().enumerate() {
            write!(
                out,
                "  [{i}] {}.{} {}",
                names.display(import.class_package),
                names.display(import.class_name),
                names.display(import.object_name),
            )?;
            match self.package.resolve_ref_name(import.outer) {
                Some(outer) => writeln!(out, " (outer {} -> {outer})", import.outer.raw())?,
                None => writeln!(out)?,
            }
        }
        Ok(())
    }

    fn write_exports<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Export table:")?;
        for (i, export) in self.package.exports.entries().iter().enumerate() {
            writeln!(out, "  [{i}] {}", export.name)?;
            if !export.class_name.is_empty() {
                writeln!(
                    out,
                    "    class: {} ({})",
                    export.class_name,
                    export.class_index.raw()
                )?;
            }
            if let Some(name) = self.package.resolve_ref_name(export.super_index) {
                writeln!(out, "    super: {name} ({})", export.super_index.raw())?;
            }
            if let Some(name) = self.package.resolve_ref_name(export.outer_index) {
                writeln!(out, "    outer: {name} ({})", export.outer_index.raw())?;
            }
            if let Some(name) = self.package.resolve_ref_name(export.archetype_index) {
                writeln!(
                    out,
                    "    archetype: {name} ({})",
                    export.archetype_index.raw()
                )?;
            }
            if !export.package_path.is_empty() {
                writeln!(out, "    path: {}", export.package_path.join("/"))?;
            }
            writeln!(out, "    object flags: {:#x}", export.object_flags)?;
            writeln!(
                out,
                "    serialize size: {:#x}, serial offset: {:#x}",
                export.serialize_size, export.serial_offset
            )?;
            writeln!(
                out,
                "    export flags: ({:#x}) {}",
                export.export_flags,
                format_flags(export.export_flags, EXPORT_FLAGS)
            )?;
            if !export.generation_net_object_counts.is_empty() {
                writeln!(
                    out,
                    "    generation net object counts: {:?}",
                    export.generation_net_object_counts
                )?;
            }
            writeln!(out, "    guid: {}", export.guid)?;
            writeln!(out, "    package flags: {:#x}", export.package_flags)?;
        }
        Ok(())
    }

    /// Serde-serializable view of the whole decoded model.
    #[must_use]
    pub fn json(&self) -> PackageJson<'a> {
        let package = self.package;
        let header = &package.header;
        PackageJson {
            header: HeaderJson {
                file_version: header.file_version_low(),
                licensee_version: header.licensee_version(),
                total_header_size: header.total_header_size,
                folder_name: &header.folder_name,
                package_flags: header.package_flags,
                package_flag_names: set_flag_names(header.package_flags, PACKAGE_FLAGS),
                name_count: header.name_count,
                name_offset: header.name_offset,
                export_count: header.export_count,
                export_offset: header.export_offset,
                import_count: header.import_count,
                import_offset: header.import_offset,
                depends_offset: header.depends_offset,
                guid_table: header.guid_table,
                thumbnail_table_offset: header.thumbnail_table_offset,
                guid: header.guid,
                generations: &header.generations,
                engine_version: header.engine_version,
                cooked_content_version: header.cooked_content_version,
                compression_flags: header.compression_flags,
                compression_flag_names: set_flag_names(
                    header.compression_flags,
                    COMPRESSION_FLAGS,
                ),
                compressed: header.is_compressed(),
                compressed_chunks: &header.compressed_chunks,
                package_source: header.package_source,
                additional_packages_to_cook: &header.additional_packages_to_cook,
                texture_allocations: &header.texture_allocations,
            },
            names: package
                .names
                .entries()
                .iter()
                .map(|entry| NameJson {
                    name: &entry.name,
                    context_flags: entry.context_flags,
                })
                .collect(),
            imports: package
                .imports
                .entries()
                .iter()
                .map(|import| ImportJson {
                    class_package: package.names.display(import.class_package),
                    class_name: package.names.display(import.class_name),
                    outer_index: import.outer.raw(),
                    outer_name: package.resolve_ref_name(import.outer),
                    object_name: package.names.display(import.object_name),
                })
                .collect(),
            exports: package
                .exports
                .entries()
                .iter()
                .map(|export| ExportJson {
                    name: &export.name,
                    class_index: export.class_index.raw(),
                    class_name: &export.class_name,
                    super_index: export.super_index.raw(),
                    super_name: package.resolve_ref_name(export.super_index),
                    outer_index: export.outer_index.raw(),
                    outer_name: package.resolve_ref_name(export.outer_index),
                    archetype_index: export.archetype_index.raw(),
                    archetype_name: package.resolve_ref_name(export.archetype_index),
                    object_flags: export.object_flags,
                    serialize_size: export.serialize_size,
                    serial_offset: export.serial_offset,
                    export_flags: export.export_flags,
                    export_flag_names: set_flag_names(export.export_flags, EXPORT_FLAGS),
                    generation_net_object_counts: &export.generation_net_object_counts,
                    guid: export.guid,
                    package_flags: export.package_flags,
                    package_path: &export.package_path,
                })
                .collect(),
        }
    }
}

/// JSON model of a decoded package.
#[derive(Serialize)]
pub struct PackageJson<'a> {
    header: HeaderJson<'a>,
    names: Vec<NameJson<'a>>,
    imports: Vec<ImportJson>,
    exports: Vec<ExportJson<'a>>,
}

#[derive(Serialize)]
struct HeaderJson<'a> {
    file_version: u16,
    licensee_version: u16,
    total_header_size: i32,
    folder_name: &'a str,
    package_flags: u32,
    package_flag_names: Vec<&'static str>,
    name_count: i32,
    name_offset: i32,
    export_count: i32,
    export_offset: i32,
    import_count: i32,
    import_offset: i32,
    depends_offset: i32,
    guid_table: Option<GuidTableInfo>,
    thumbnail_table_offset: Option<i32>,
    guid: Guid,
    generations: &'a [GenerationSummary],
    engine_version: i32,
    cooked_content_version: i32,
    compression_flags: u32,
    compression_flag_names: Vec<&'static str>,
    compressed: bool,
    compressed_chunks: &'a [CompressedChunk],
    package_source: u32,
    additional_packages_to_cook: &'a [String],
    texture_allocations: &'a [TextureAllocation],
}

#[derive(Serialize)]
struct NameJson<'a> {
    name: &'a str,
    context_flags: u64,
}

#[derive(Serialize)]
struct ImportJson {
    class_package: String,
    class_name: String,
    outer_index: i32,
    outer_name: Option<String>,
    object_name: String,
}

#[derive(Serialize)]
struct ExportJson<'a> {
    name: &'a str,
    class_index: i32,
    class_name: &'a str,
    super_index: i32,
    super_name: Option<String>,
    outer_index: i32,
    outer_name: Option<String>,
    archetype_index: i32,
    archetype_name: Option<String>,
    object_flags: u64,
    serialize_size: i32,
    serial_offset: i32,
    export_flags: u32,
    export_flag_names: Vec<&'static str>,
    generation_net_object_counts: &'a [i32],
    guid: Guid,
    package_flags: u32,
    package_path: &'a [String],
}
