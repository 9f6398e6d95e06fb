//! Name table decoding and name-reference rendering.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use super::read::read_string;
use super::types::{NameRef, NameTableEntry};
use crate::error::Result;

/// Ordered collection of the package's name strings.
///
/// Decode order is the index space for every name reference in the file, so
/// entries are never removed or reordered after decoding.
#[derive(Debug, Default)]
pub struct NameTable {
    entries: Vec<NameTableEntry>,
}

impl NameTable {
    /// Decode `count` entries starting at `offset`. Each entry is a string
    /// followed by a 64-bit context-flags word kept only for reporting.
    pub(crate) fn read<R: Read + Seek>(reader: &mut R, offset: i32, count: i32) -> Result<Self> {
        reader.seek(SeekFrom::Start(offset as u64))?;
        let mut entries = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let name = read_string(reader)?;
            let context_flags = reader.read_u64::<LittleEndian>()?;
            entries.push(NameTableEntry {
                name,
                context_flags,
            });
        }
        tracing::debug!("decoded {} names", entries.len());
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
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_str())
    }

    #[must_use]
    pub fn entries(&self) -> &[NameTableEntry] {
        &self.entries
    }

    /// Render a name reference: the base name, with `_{number - 1}`
    /// appended when the numeric part is nonzero.
    ///
    /// The reference's index was validated against this table when it was
    /// decoded.
    #[must_use]
    pub fn display(&self, name_ref: NameRef) -> String {
        let base = &self.entries[name_ref.index as usize].name;
        if name_ref.number != 0 {
            format!("{}_{}", base, i64::from(name_ref.number) - 1)
        } else {
            base.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(names: &[&str]) -> NameTable {
        NameTable {
            entries: names
                .iter()
                .map(|n| NameTableEntry {
                    name: (*n).to_string(),
                    context_flags: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn zero_number_renders_bare_name() {
        let names = table(&["Engine"]);
        assert_eq!(names.display(NameRef { index: 0, number: 0 }), "Engine");
    }

    #[test]
    fn number_renders_decremented_suffix() {
        let names = table(&["Brush"]);
        assert_eq!(names.display(NameRef { index: 0, number: 1 }), "Brush_0");
        assert_eq!(names.display(NameRef { index: 0, number: 5 }), "Brush_4");
    }
}
