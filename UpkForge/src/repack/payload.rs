//! Replacement payload lookup.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::formats::upk::Export;

/// Locates replacement payload files under an extraction directory.
///
/// The extraction tool lays files out as one directory level per package
/// path segment, with `Name.Class` as the file name; the same layout is
/// probed here.
#[derive(Debug, Clone)]
pub struct PayloadDir {
    root: PathBuf,
}

impl PayloadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expected on-disk location of an export's payload.
    #[must_use]
    pub fn expected_path(&self, export: &Export) -> PathBuf {
        let mut path = self.root.clone();
        for segment in &export.package_path {
            path.push(segment);
        }
        path.push(format!("{}.{}", export.name, export.class_name));
        path
    }

    /// Read an export's replacement bytes.
    ///
    /// Fails with [`Error::ResourceNotFound`] when the expected file is
    /// absent, so a typo in the extraction directory surfaces before any
    /// further payload is written.
    pub fn read(&self, export: &Export) -> Result<Vec<u8>> {
        let path = self.expected_path(export);
        if !path.is_file() {
            return Err(Error::ResourceNotFound { path });
        }
        Ok(std::fs::read(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::upk::{Guid, NameRef, ObjectRef};
    use pretty_assertions::assert_eq;

    fn export(name: &str, class_name: &str, package_path: &[&str]) -> Export {
        Export {
            class_index: ObjectRef::None,
            super_index: ObjectRef::None,
            outer_index: ObjectRef::None,
            object_name: NameRef { index: 0, number: 0 },
            archetype_index: ObjectRef::None,
            object_flags: 0,
            serialize_size: 0,
            serial_offset: 0,
            export_flags: 0,
            generation_net_object_counts: Vec::new(),
            guid: Guid::default(),
            package_flags: 0,
            size_field_offset: 0,
            name: name.to_string(),
            class_name: class_name.to_string(),
            package_path: package_path.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn path_joins_package_segments_and_class_suffix() {
        let dir = PayloadDir::new("/tmp/extracted");
        let export = export("Thing", "SomeClass", &["Pkg", "SubPkg"]);
        assert_eq!(
            dir.expected_path(&export),
            PathBuf::from("/tmp/extracted/Pkg/SubPkg/Thing.SomeClass")
        );
    }

    #[test]
    fn missing_file_is_resource_not_found() {
        let dir = PayloadDir::new("/nonexistent-root");
        let export = export("Thing", "SomeClass", &[]);
        let err = dir.read(&export).unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound { .. }));
    }
}
