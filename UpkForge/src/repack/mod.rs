//! Repackaging: copy a package, swapping every export's payload for a
//! replacement file from an extraction directory and rewriting the
//! size/offset fields to match.

mod engine;
mod payload;

pub use engine::{ProgressCallback, RepackSummary, Repackager};
pub use payload::PayloadDir;
