//! File format support.

pub mod upk;
