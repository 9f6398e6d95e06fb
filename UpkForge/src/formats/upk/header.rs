//! Package header reading.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use super::read::{read_guid, read_string};
use super::types::{
    CompressedChunk, GenerationSummary, GuidTableInfo, TextureAllocation, UpkHeader, VersionCaps,
};
use super::PACKAGE_FILE_TAG;
use crate::error::{Error, Result};

/// Read and parse the package header.
///
/// The engine version in the low half of the version word is resolved into
/// a [`VersionCaps`] once, and every conditional field below follows it.
pub(crate) fn read_header<R: Read + Seek>(reader: &mut R) -> Result<UpkHeader> {
    reader.seek(SeekFrom::Start(0))?;

    let tag = reader.read_u32::<LittleEndian>()?;
    if tag != PACKAGE_FILE_TAG {
        return Err(Error::BadTag(tag));
    }

    let file_version = reader.read_u32::<LittleEndian>()?;
    let caps = VersionCaps::for_engine_version((file_version & 0xffff) as u16);

    let total_header_size = reader.read_i32::<LittleEndian>()?;
    let folder_name = read_string(reader)?;
    let package_flags = reader.read_u32::<LittleEndian>()?;

    let name_count = reader.read_i32::<LittleEndian>()?;
    let name_offset = reader.read_i32::<LittleEndian>()?;
    let export_count = reader.read_i32::<LittleEndian>()?;
    let export_offset = reader.read_i32::<LittleEndian>()?;
    let import_count = reader.read_i32::<LittleEndian>()?;
    let import_offset = reader.read_i32::<LittleEndian>()?;
    let depends_offset = reader.read_i32::<LittleEndian>()?;

    let guid_table = if caps.has_guid_offsets {
        Some(GuidTableInfo {
            import_export_guids_offset: reader.read_i32::<LittleEndian>()?,
            import_guids_count: reader.read_i32::<LittleEndian>()?,
            export_guids_count: reader.read_i32::<LittleEndian>()?,
        })
    } else {
        None
    };

    let thumbnail_table_offset = if caps.has_thumbnail_offset {
        Some(reader.read_i32::<LittleEndian>()?)
    } else {
        None
    };

    let guid = read_guid(reader)?;

    let generation_count = reader.read_i32::<LittleEndian>()?;
    let mut generations = Vec::with_capacity(generation_count.max(0) as usize);
    for _ in 0..generation_count {
        generations.push(GenerationSummary {
            export_count: reader.read_i32::<LittleEndian>()?,
            name_count: reader.read_i32::<LittleEndian>()?,
            net_object_count: reader.read_i32::<LittleEndian>()?,
        });
    }

    let engine_version = reader.read_i32::<LittleEndian>()?;
    let cooked_content_version = reader.read_i32::<LittleEndian>()?;
    let compression_flags = reader.read_u32::<LittleEndian>()?;

    let chunk_count = reader.read_i32::<LittleEndian>()?;
    let mut compressed_chunks = Vec::with_capacity(chunk_count.max(0) as usize);
    for _ in 0..chunk_count {
        compressed_chunks.push(CompressedChunk {
            uncompressed_offset: reader.read_u32::<LittleEndian>()?,
            uncompressed_size: reader.read_u32::<LittleEndian>()?,
            compressed_offset: reader.read_u32::<LittleEndian>()?,
            compressed_size: reader.read_u32::<LittleEndian>()?,
        });
    }

    let package_source = reader.read_u32::<LittleEndian>()?;

    let mut additional_packages_to_cook = Vec::new();
    if caps.has_additional_packages {
        let count = reader.read_i32::<LittleEndian>()?;
        additional_packages_to_cook.reserve(count.max(0) as usize);
        for _ in 0..count {
            additional_packages_to_cook.push(read_string(reader)?);
        }
    }

    let mut texture_allocations = Vec::new();
    if caps.has_texture_allocations {
        let count = reader.read_i32::<LittleEndian>()?;
        texture_allocations.reserve(count.max(0) as usize);
        for _ in 0..count {
            let size_x = reader.read_i32::<LittleEndian>()?;
            let size_y = reader.read_i32::<LittleEndian>()?;
            let num_mips = reader.read_i32::<LittleEndian>()?;
            let format = reader.read_u32::<LittleEndian>()?;
            let tex_create_flags = reader.read_u32::<LittleEndian>()?;
            let index_count = reader.read_i32::<LittleEndian>()?;
            let mut export_indices = Vec::with_capacity(index_count.max(0) as usize);
            for _ in 0..index_count {
                export_indices.push(reader.read_i32::<LittleEndian>()?);
            }
            texture_allocations.push(TextureAllocation {
                size_x,
                size_y,
                num_mips,
                format,
                tex_create_flags,
                export_indices,
            });
        }
    }

    Ok(UpkHeader {
        tag,
        file_version,
        total_header_size,
        folder_name,
        package_flags,
        name_count,
        name_offset,
        export_count,
        export_offset,
        import_count,
        import_offset,
        depends_offset,
        guid_table,
        thumbnail_table_offset,
        guid,
        generations,
        engine_version,
        cooked_content_version,
        compression_flags,
        compressed_chunks,
        package_source,
        additional_packages_to_cook,
        texture_allocations,
    })
}
