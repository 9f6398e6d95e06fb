//! Import table decoding.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use super::names::NameTable;
use super::read::read_name_ref;
use super::types::{Import, ObjectRef};
use crate::error::{Error, Result};

/// References to objects defined in other packages.
///
/// Decoded in a single pass. Imports may reference each other in either
/// direction, so display names of outer references are resolved on demand
/// against the finished table rather than during decoding.
#[derive(Debug, Default)]
pub struct ImportTable {
    entries: Vec<Import>,
}

impl ImportTable {
    /// Decode `count` fixed-layout records starting at `offset`.
    ///
    /// Fails if any name index is out of range, if an outer index points
    /// into the export table, or if it points past the end of this table.
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut R,
        offset: i32,
        count: i32,
        names: &NameTable,
    ) -> Result<Self> {
        reader.seek(SeekFrom::Start(offset as u64))?;
        let count = count.max(0) as usize;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let class_package = read_name_ref(reader, names)?;
            let class_name = read_name_ref(reader, names)?;
            let raw_outer = reader.read_i32::<LittleEndian>()?;
            if raw_outer > 0 {
                return Err(Error::InvalidImportOuterIndex { index: raw_outer });
            }
            let outer = ObjectRef::from_raw(raw_outer);
            if let ObjectRef::Import(i) = outer {
                if i >= count {
                    return Err(Error::ObjectIndexOutOfRange {
                        index: raw_outer,
                        table: "import",
                        count,
                    });
                }
            }
            let object_name = read_name_ref(reader, names)?;
            entries.push(Import {
                class_package,
                class_name,
                outer,
                object_name,
            });
        }
        tracing::debug!("decoded {} imports", entries.len());
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
    pub fn get(&self, index: usize) -> Option<&Import> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[Import] {
        &self.entries
    }

    /// Display name of import `index`, or `None` when out of range.
    #[must_use]
    pub fn display_name(&self, index: usize, names: &NameTable) -> Option<String> {
        self.entries
            .get(index)
            .map(|import| names.display(import.object_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn names(list: &[&str]) -> NameTable {
        let mut bytes = Vec::new();
        for name in list {
            bytes.extend_from_slice(&((name.len() + 1) as i32).to_le_bytes());
            bytes.extend_from_slice(name.as_bytes());
            bytes.push(0);
            bytes.extend_from_slice(&0u64.to_le_bytes());
        }
        NameTable::read(&mut Cursor::new(bytes), 0, list.len() as i32).unwrap()
    }

    fn import_record(class_package: i32, class_name: i32, outer: i32, object: i32) -> Vec<u8> {
        let mut bytes = Vec::new();
        for field in [class_package, 0, class_name, 0, outer] {
            bytes.extend_from_slice(&field.to_le_bytes());
        }
        bytes.extend_from_slice(&object.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes
    }

    #[test]
    fn forward_outer_reference_decodes() {
        let names = names(&["Core", "Package", "Engine", "Texture2D"]);
        // Import 0 references import 1, which appears later in the table.
        let mut bytes = import_record(0, 1, -2, 3);
        bytes.extend_from_slice(&import_record(0, 1, 0, 2));
        let imports = ImportTable::read(&mut Cursor::new(bytes), 0, 2, &names).unwrap();

        assert_eq!(imports.len(), 2);
        assert_eq!(imports.get(0).unwrap().outer, ObjectRef::Import(1));
        assert_eq!(imports.display_name(1, &names).unwrap(), "Engine");
    }

    #[test]
    fn positive_outer_index_is_fatal() {
        let names = names(&["Core"]);
        let bytes = import_record(0, 0, 3, 0);
        let err = ImportTable::read(&mut Cursor::new(bytes), 0, 1, &names).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidImportOuterIndex { index: 3 }
        ));
    }

    #[test]
    fn outer_index_past_table_end_is_fatal() {
        let names = names(&["Core"]);
        let bytes = import_record(0, 0, -5, 0);
        let err = ImportTable::read(&mut Cursor::new(bytes), 0, 1, &names).unwrap_err();
        assert!(matches!(err, Error::ObjectIndexOutOfRange { .. }));
    }

    #[test]
    fn name_index_out_of_range_is_fatal() {
        let names = names(&["Core"]);
        let bytes = import_record(9, 0, 0, 0);
        let err = ImportTable::read(&mut Cursor::new(bytes), 0, 1, &names).unwrap_err();
        assert!(matches!(err, Error::NameIndexOutOfRange { index: 9, .. }));
    }
}
