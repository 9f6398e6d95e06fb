//! UPK package reader.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use super::exports::ExportTable;
use super::header::read_header;
use super::imports::ImportTable;
use super::names::NameTable;
use super::types::{ObjectRef, UpkHeader};
use crate::error::{Error, Result};

/// Fully decoded structural model of a package file.
///
/// For a compressed package only the header is populated: the stream
/// offsets past it no longer correspond to uncompressed positions, so the
/// tables stay empty and the caller is expected to delegate to an external
/// decompressor.
#[derive(Debug)]
pub struct UpkPackage {
    pub header: UpkHeader,
    pub names: NameTable,
    pub imports: ImportTable,
    pub exports: ExportTable,
}

impl UpkPackage {
    /// Decode a package from a file on disk.
    pub fn read_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        UpkReader::new(file).read_package()
    }

    /// Resolve an object reference to the display name of the entry it
    /// points at. `None` for a null reference or an index past either
    /// table (decoded references are always in range).
    #[must_use]
    pub fn resolve_ref_name(&self, reference: ObjectRef) -> Option<String> {
        match reference {
            ObjectRef::None => None,
            ObjectRef::Import(i) => self.imports.display_name(i, &self.names),
            ObjectRef::Export(i) => self.exports.get(i).map(|e| e.name.clone()),
        }
    }
}

/// Incremental package reader.
///
/// The tables depend on one another, so the read methods must run in
/// order: header, names, imports, exports. [`UpkReader::read_package`]
/// drives all of them and is what most callers want.
pub struct UpkReader<R: Read + Seek> {
    reader: BufReader<R>,
    header: Option<UpkHeader>,
}

impl<R: Read + Seek> UpkReader<R> {
    /// Create a new reader over a `Read + Seek` source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            header: None,
        }
    }

    /// Read and parse the package header.
    pub fn read_header(&mut self) -> Result<&UpkHeader> {
        let header = read_header(&mut self.reader)?;
        tracing::debug!(
            version = header.file_version_low(),
            licensee = header.licensee_version(),
            names = header.name_count,
            imports = header.import_count,
            exports = header.export_count,
            "read package header"
        );
        self.header = Some(header);
        Ok(self.header.as_ref().unwrap())
    }

    /// Read the name table at the offset the header points to.
    pub fn read_names(&mut self) -> Result<NameTable> {
        let header = self.header.as_ref().ok_or(Error::HeaderNotRead)?;
        NameTable::read(&mut self.reader, header.name_offset, header.name_count)
    }

    /// Read the import table. Needs the decoded name table.
    pub fn read_imports(&mut self, names: &NameTable) -> Result<ImportTable> {
        let header = self.header.as_ref().ok_or(Error::HeaderNotRead)?;
        ImportTable::read(
            &mut self.reader,
            header.import_offset,
            header.import_count,
            names,
        )
    }

    /// Read the export table. Needs the decoded name and import tables.
    pub fn read_exports(&mut self, names: &NameTable, imports: &ImportTable) -> Result<ExportTable> {
        let header = self.header.as_ref().ok_or(Error::HeaderNotRead)?;
        ExportTable::read(
            &mut self.reader,
            header.export_offset,
            header.export_count,
            names,
            imports,
            header.caps(),
        )
    }

    /// Decode the whole package: header, then the three tables in
    /// dependency order.
    ///
    /// A compressed package decodes successfully but with empty tables;
    /// check [`UpkHeader::is_compressed`] on the result.
    pub fn read_package(mut self) -> Result<UpkPackage> {
        let header = self.read_header()?.clone();

        if header.is_compressed() {
            tracing::info!(
                flags = format_args!("{:#x}", header.compression_flags),
                "package is compressed; skipping table decode"
            );
            return Ok(UpkPackage {
                header,
                names: NameTable::default(),
                imports: ImportTable::default(),
                exports: ExportTable::default(),
            });
        }

        let names = self.read_names()?;
        let imports = self.read_imports(&names)?;
        let exports = self.read_exports(&names, &imports)?;

        Ok(UpkPackage {
            header,
            names,
            imports,
            exports,
        })
    }
}
