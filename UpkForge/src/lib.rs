//! # UpkForge
//!
//! A pure-Rust library for inspecting and repackaging Unreal Engine 3
//! package (UPK) files.
//!
//! The decoder reads the package header and the three interlinked index
//! tables (names, imports, exports) into an immutable model. The
//! repackage engine then produces a byte-identical copy of the package
//! with only the export payload bytes swapped for replacement files from
//! an extraction directory, rewriting each export's size and offset so
//! the structure stays self-consistent.
//!
//! ## Quick Start
//!
//! ### Inspecting a package
//!
//! ```no_run
//! use upkforge::formats::upk::UpkPackage;
//!
//! let package = UpkPackage::read_path("Startup.upk")?;
//! println!("{} exports", package.exports.len());
//! # Ok::<(), upkforge::Error>(())
//! ```
//!
//! ### Repackaging with replacement payloads
//!
//! ```no_run
//! use upkforge::repack::Repackager;
//!
//! let summary = Repackager::new("Startup.upk", "extracted/Startup")
//!     .write("Startup.patched.upk")?;
//! println!("patched {} exports", summary.exports_patched);
//! # Ok::<(), upkforge::Error>(())
//! ```
//!
//! Compressed packages are detected and refused: decompress them with an
//! external tool before repackaging.

pub mod error;
pub mod formats;
pub mod repack;
pub mod report;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::upk::{
        Export, Guid, Import, NameRef, NameTable, ObjectRef, UpkHeader, UpkPackage, UpkReader,
    };
    pub use crate::repack::{PayloadDir, RepackSummary, Repackager};
    pub use crate::report::PackageReport;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
