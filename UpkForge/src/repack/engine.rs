//! The repackage engine.
//!
//! The output is staged in a temporary file next to the destination and
//! only renamed into place once every export has been patched, so a
//! missing payload or IO failure never leaves a half-patched package
//! behind.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use tempfile::NamedTempFile;

use super::payload::PayloadDir;
use crate::error::{Error, Result};
use crate::formats::upk::{UpkPackage, UpkReader};

/// Progress callback type: current export, total exports, export name.
pub type ProgressCallback<'a> = &'a dyn Fn(usize, usize, &str);

/// What a repackaging run produced.
#[derive(Debug, Clone)]
pub struct RepackSummary {
    /// Number of exports whose payload and size/offset fields were patched.
    pub exports_patched: usize,
    /// Total replacement payload bytes written.
    pub payload_bytes: u64,
    /// Where the patched copy landed.
    pub output: PathBuf,
}

/// Rewrites a package with replacement payloads from an extraction
/// directory.
///
/// The source package is opened read-only and never modified.
pub struct Repackager {
    source: PathBuf,
    payloads: PayloadDir,
}

impl Repackager {
    pub fn new(source: impl Into<PathBuf>, payload_root: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            payloads: PayloadDir::new(payload_root),
        }
    }

    /// Write the patched copy to `output`.
    pub fn write(&self, output: impl AsRef<Path>) -> Result<RepackSummary> {
        self.write_with_progress(output, &|_, _, _| {})
    }

    /// Write the patched copy to `output`, reporting per-export progress.
    ///
    /// `output` must not already exist; the original tool's create-new
    /// semantics are kept so a repack can never clobber a package.
    pub fn write_with_progress(
        &self,
        output: impl AsRef<Path>,
        progress: ProgressCallback,
    ) -> Result<RepackSummary> {
        let output = output.as_ref();
        if output.exists() {
            return Err(Error::OutputCreateFailure {
                path: output.to_path_buf(),
                source: io::Error::from(io::ErrorKind::AlreadyExists),
            });
        }

        let package = UpkReader::new(File::open(&self.source)?).read_package()?;
        if package.header.is_compressed() {
            return Err(Error::Compressed {
                flags: package.header.compression_flags,
            });
        }

        tracing::info!(
            source = %self.source.display(),
            output = %output.display(),
            exports = package.exports.len(),
            "repackaging"
        );

        let header_size = package.header.total_header_size.max(0) as u64;
        let mut staged = self.stage_output(output, header_size)?;
        let summary = self.patch_exports(&package, staged.as_file_mut(), progress)?;

        staged
            .persist_noclobber(output)
            .map_err(|e| Error::OutputCreateFailure {
                path: output.to_path_buf(),
                source: e.error,
            })?;

        tracing::info!(
            exports = summary.exports_patched,
            bytes = summary.payload_bytes,
            "repackage complete"
        );
        Ok(RepackSummary {
            output: output.to_path_buf(),
            ..summary
        })
    }

    /// Create the staging file and seed it with a verbatim copy of the
    /// source's header region (header plus all three tables).
    fn stage_output(&self, output: &Path, header_size: u64) -> Result<NamedTempFile> {
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::Builder::new()
            .prefix(".upkforge-staging")
            .tempfile_in(dir)
            .map_err(|e| Error::OutputCreateFailure {
                path: output.to_path_buf(),
                source: e,
            })?;

        let mut source = File::open(&self.source)?;
        let copied = io::copy(&mut (&mut source).take(header_size), staged.as_file_mut())?;
        if copied < header_size {
            return Err(Error::TruncatedInput);
        }
        Ok(staged)
    }

    /// Walk the exports in decode order, streaming each replacement payload
    /// into a contiguous region and rewriting the two size/offset fields at
    /// the recorded patch anchor.
    fn patch_exports(
        &self,
        package: &UpkPackage,
        out: &mut File,
        progress: ProgressCallback,
    ) -> Result<RepackSummary> {
        let total = package.exports.len();
        let mut payload_bytes = 0u64;

        // The new payload region starts where the first export's payload
        // used to; sizes change, so every later offset is recomputed
        // forward from this single anchor.
        let Some(first) = package.exports.entries().first() else {
            return Ok(RepackSummary {
                exports_patched: 0,
                payload_bytes: 0,
                output: PathBuf::new(),
            });
        };
        let mut current_offset = first.serial_offset as i64;

        for (i, export) in package.exports.iter().enumerate() {
            progress(i + 1, total, &export.name);

            let data = self.payloads.read(export)?;
            let size = i32::try_from(data.len()).map_err(|_| Error::PayloadTooLarge {
                path: self.payloads.expected_path(export),
                size: data.len() as u64,
            })?;
            let offset = i32::try_from(current_offset)
                .ok()
                .filter(|off| *off >= 0)
                .ok_or(Error::OffsetOverflow {
                    offset: current_offset.max(0) as u64,
                })?;

            out.seek(SeekFrom::Start(offset as u64))?;
            out.write_all(&data)?;

            out.seek(SeekFrom::Start(export.size_field_offset))?;
            out.write_i32::<LittleEndian>(size)?;
            out.write_i32::<LittleEndian>(offset)?;

            current_offset += i64::from(size);
            payload_bytes += data.len() as u64;
        }

        out.flush()?;
        Ok(RepackSummary {
            exports_patched: total,
            payload_bytes,
            output: PathBuf::new(),
        })
    }
}
