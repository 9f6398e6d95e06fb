//! Export table decoding.
//!
//! Exports cross-reference each other in both directions, so decoding runs
//! in two passes over the same region: a stub pass that materializes every
//! export's display name, then a full pass that can resolve class, super,
//! outer and archetype references against the complete name array.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use super::imports::ImportTable;
use super::names::NameTable;
use super::read::{read_guid, read_name_ref};
use super::types::{Export, ObjectRef, VersionCaps};
use crate::error::{Error, Result};

/// Objects serialized inside the package, in decode order.
#[derive(Debug, Default)]
pub struct ExportTable {
    entries: Vec<Export>,
}

impl ExportTable {
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut R,
        offset: i32,
        count: i32,
        names: &NameTable,
        imports: &ImportTable,
        caps: VersionCaps,
    ) -> Result<Self> {
        let count = count.max(0) as usize;
        let stub_names = read_stub_names(reader, offset, count, names)?;
        let mut entries = read_full(reader, offset, count, names, imports, caps, &stub_names)?;
        build_package_paths(&mut entries)?;
        tracing::debug!("decoded {} exports", entries.len());
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Export> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[Export] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Export> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ExportTable {
    type Item = &'a Export;
    type IntoIter = std::slice::Iter<'a, Export>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Pass 1: collect every export's display name, skipping all other fields.
///
/// The skips mirror the record layout of pass 2: 12 bytes of class/super/
/// outer indices, then the name, then 24 bytes covering the archetype
/// index, object flags, size/offset pair and export flags, then the
/// variable-length net-object-count array, then the trailing 20 bytes of
/// GUID and package flags.
fn read_stub_names<R: Read + Seek>(
    reader: &mut R,
    offset: i32,
    count: usize,
    names: &NameTable,
) -> Result<Vec<String>> {
    reader.seek(SeekFrom::Start(offset as u64))?;
    let mut stub_names = Vec::with_capacity(count);
    for _ in 0..count {
        reader.seek(SeekFrom::Current(12))?;
        let object_name = read_name_ref(reader, names)?;
        stub_names.push(names.display(object_name));
        reader.seek(SeekFrom::Current(24))?;
        let net_count = reader.read_i32::<LittleEndian>()?;
        if net_count > 0 {
            reader.seek(SeekFrom::Current(i64::from(net_count) * 4))?;
        }
        reader.seek(SeekFrom::Current(20))?;
    }
    Ok(stub_names)
}

/// Pass 2: decode every field and resolve the cross-references.
fn read_full<R: Read + Seek>(
    reader: &mut R,
    offset: i32,
    count: usize,
    names: &NameTable,
    imports: &ImportTable,
    caps: VersionCaps,
    stub_names: &[String],
) -> Result<Vec<Export>> {
    reader.seek(SeekFrom::Start(offset as u64))?;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let class_index = read_object_ref(reader, imports.len(), count)?;
        let super_index = read_object_ref(reader, imports.len(), count)?;
        let outer_index = read_object_ref(reader, imports.len(), count)?;
        let object_name = read_name_ref(reader, names)?;
        let archetype_index = read_object_ref(reader, imports.len(), count)?;
        let object_flags = reader.read_u64::<LittleEndian>()?;

        // Patch anchor: the repackage pass seeks back here to overwrite
        // serialize size and serial offset together.
        let size_field_offset = reader.stream_position()?;
        let serialize_size = reader.read_i32::<LittleEndian>()?;
        let serial_offset = reader.read_i32::<LittleEndian>()?;

        if caps.has_legacy_export_array {
            let len = reader.read_i32::<LittleEndian>()?;
            if len > 0 {
                reader.seek(SeekFrom::Current(i64::from(len) * 12))?;
            }
        }

        let export_flags = reader.read_u32::<LittleEndian>()?;
        let net_count = reader.read_i32::<LittleEndian>()?;
        let mut generation_net_object_counts = Vec::with_capacity(net_count.max(0) as usize);
        for _ in 0..net_count {
            generation_net_object_counts.push(reader.read_i32::<LittleEndian>()?);
        }
        let guid = read_guid(reader)?;
        let package_flags = reader.read_u32::<LittleEndian>()?;

        let name = names.display(object_name);
        let class_name = match class_index {
            ObjectRef::None => String::new(),
            ObjectRef::Import(i) => names.display(imports.entries()[i].object_name),
            ObjectRef::Export(i) => stub_names[i].clone(),
        };

        entries.push(Export {
            class_index,
            super_index,
            outer_index,
            object_name,
            archetype_index,
            object_flags,
            serialize_size,
            serial_offset,
            export_flags,
            generation_net_object_counts,
            guid,
            package_flags,
            size_field_offset,
            name,
            class_name,
            package_path: Vec::new(),
        });
    }
    Ok(entries)
}

/// Read one signed object index, validating its magnitude against the table
/// it points into.
fn read_object_ref<R: Read>(
    reader: &mut R,
    import_count: usize,
    export_count: usize,
) -> Result<ObjectRef> {
    let raw = reader.read_i32::<LittleEndian>()?;
    let reference = ObjectRef::from_raw(raw);
    match reference {
        ObjectRef::Import(i) if i >= import_count => Err(Error::ObjectIndexOutOfRange {
            index: raw,
            table: "import",
            count: import_count,
        }),
        ObjectRef::Export(i) if i >= export_count => Err(Error::ObjectIndexOutOfRange {
            index: raw,
            table: "export",
            count: export_count,
        }),
        _ => Ok(reference),
    }
}

/// Post-pass: reconstruct each export's hierarchical package path by
/// walking its outer chain.
///
/// The chain ends at the first non-positive index (zero = package root,
/// negative = import; imports never own file-resident payloads). A
/// revisited slot means the file encodes a cycle, which would otherwise
/// produce a silently wrong path.
fn build_package_paths(entries: &mut [Export]) -> Result<()> {
    for i in 0..entries.len() {
        let mut path = Vec::new();
        let mut seen = Vec::new();
        let mut outer = entries[i].outer_index;
        while let ObjectRef::Export(idx) = outer {
            if seen.contains(&idx) {
                return Err(Error::CyclicOuterChain { index: i });
            }
            seen.push(idx);
            path.push(entries[idx].name.clone());
            outer = entries[idx].outer_index;
        }
        path.reverse();
        entries[i].package_path = path;
    }
    Ok(())
}
