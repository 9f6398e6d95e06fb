//! Error types for `UpkForge`

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

/// The error type for `UpkForge` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(std::io::Error),

    /// Fewer bytes were available than a field required.
    #[error("unexpected end of file")]
    TruncatedInput,

    // ==================== Package Structure Errors ====================
    /// The file does not start with the UE3 package tag.
    #[error("invalid package tag: expected 0x9E2A83C1, found {0:#010x}")]
    BadTag(u32),

    /// A name reference points outside the decoded name table.
    #[error("name index {index} outside the range [0;{count})")]
    NameIndexOutOfRange {
        /// The index read from the file.
        index: i32,
        /// Number of entries in the name table.
        count: usize,
    },

    /// An object index resolves outside the import or export table.
    #[error("object index {index} outside the {table} table ({count} entries)")]
    ObjectIndexOutOfRange {
        /// The raw signed index read from the file.
        index: i32,
        /// Which table the index points into ("import" or "export").
        table: &'static str,
        /// Number of entries in that table.
        count: usize,
    },

    /// An import's outer index points into the export table.
    ///
    /// Imports may only reference other imports, or nothing.
    #[error("outer index {index} in imports points to exports")]
    InvalidImportOuterIndex {
        /// The offending raw index.
        index: i32,
    },

    /// An export's outer chain revisits an export it already passed through.
    #[error("cyclic outer chain starting at export {index}")]
    CyclicOuterChain {
        /// The export whose chain never terminates.
        index: usize,
    },

    /// The package header has not been read yet (internal state error).
    #[error("package header not read")]
    HeaderNotRead,

    // ==================== Repackaging Errors ====================
    /// The package is compressed; stream offsets no longer correspond to
    /// uncompressed positions, so the tables cannot be decoded in place.
    #[error("package is compressed (flags {flags:#x}); decompress it with an external tool first")]
    Compressed {
        /// The nonzero compression-flags word.
        flags: u32,
    },

    /// An expected replacement payload file is absent.
    #[error("replacement file not found: {path}")]
    ResourceNotFound {
        /// The path that was probed.
        path: PathBuf,
    },

    /// A replacement payload does not fit the 32-bit size field.
    #[error("replacement file too large: {path} ({size} bytes)")]
    PayloadTooLarge {
        /// The oversized payload file.
        path: PathBuf,
        /// Its size in bytes.
        size: u64,
    },

    /// Recomputed payload offsets no longer fit the 32-bit offset field.
    #[error("patched payload region exceeds 32-bit offsets at {offset:#x}")]
    OffsetOverflow {
        /// The offset that overflowed.
        offset: u64,
    },

    /// The destination file already exists or cannot be created.
    #[error("cannot create output file {path}: {source}")]
    OutputCreateFailure {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },
}

// Short reads surface as TruncatedInput so callers can tell a structurally
// truncated package apart from ordinary IO failures.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == ErrorKind::UnexpectedEof {
            Error::TruncatedInput
        } else {
            Error::Io(err)
        }
    }
}

/// A specialized Result type for `UpkForge` operations.
pub type Result<T> = std::result::Result<T, Error>;
