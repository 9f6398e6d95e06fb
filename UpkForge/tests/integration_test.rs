//! End-to-end tests over synthetic package files.
//!
//! The builder below produces a small but fully-formed package: six names,
//! one import, and three exports nested A -> B -> C, with one payload per
//! export following the header region.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use upkforge::formats::upk::{ObjectRef, UpkPackage, UpkReader};
use upkforge::repack::Repackager;
use upkforge::Error;

const LICENSEE: u16 = 3;

fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Narrow (single-byte) string encoding: length including NUL, bytes, NUL.
fn put_string(buf: &mut Vec<u8>, s: &str) {
    put_i32(buf, (s.len() + 1) as i32);
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

/// Header bytes for the given engine version. Table counts and offsets are
/// passed through verbatim; gated fields follow the version thresholds.
fn build_header(
    version: u16,
    total_header_size: i32,
    counts: [(i32, i32); 3], // (count, offset) for names, exports, imports
    compression_flags: u32,
) -> Vec<u8> {
    let mut buf = Vec::new();
    put_u32(&mut buf, 0x9E2A83C1);
    put_u32(&mut buf, (u32::from(LICENSEE) << 16) | u32::from(version));
    put_i32(&mut buf, total_header_size);
    put_string(&mut buf, "CookedPC");
    put_u32(&mut buf, 0x8); // Cooked

    let [(name_count, name_offset), (export_count, export_offset), (import_count, import_offset)] =
        counts;
    put_i32(&mut buf, name_count);
    put_i32(&mut buf, name_offset);
    put_i32(&mut buf, export_count);
    put_i32(&mut buf, export_offset);
    put_i32(&mut buf, import_count);
    put_i32(&mut buf, import_offset);
    put_i32(&mut buf, 0x77); // depends offset

    if version >= 623 {
        put_i32(&mut buf, 0x99); // import/export guid offset
        put_i32(&mut buf, 0);
        put_i32(&mut buf, 0);
    }
    if version >= 584 {
        put_i32(&mut buf, 0x55); // thumbnail table offset
    }

    for word in [1u32, 2, 3, 4] {
        put_u32(&mut buf, word); // package guid
    }

    put_i32(&mut buf, 1); // generation count
    put_i32(&mut buf, 3);
    put_i32(&mut buf, 6);
    put_i32(&mut buf, 3);

    put_i32(&mut buf, 12791); // engine version
    put_i32(&mut buf, 1); // cooked content version
    put_u32(&mut buf, compression_flags);

    if compression_flags == 0 {
        put_i32(&mut buf, 0); // no compressed chunks
    } else {
        put_i32(&mut buf, 1);
        for word in [0x400u32, 0x1000, 0x100, 0x800] {
            put_u32(&mut buf, word);
        }
    }

    put_u32(&mut buf, 0x12345678); // package source

    if version >= 516 {
        put_i32(&mut buf, 1);
        put_string(&mut buf, "Startup_LOC");
    }
    if version >= 767 {
        put_i32(&mut buf, 1);
        put_i32(&mut buf, 256); // size x
        put_i32(&mut buf, 128); // size y
        put_i32(&mut buf, 5); // mips
        put_u32(&mut buf, 7); // format
        put_u32(&mut buf, 0x20); // tex create flags
        put_i32(&mut buf, 1); // export index count
        put_i32(&mut buf, 1);
    }

    buf
}

fn build_name_table() -> Vec<u8> {
    let mut buf = Vec::new();
    for name in ["A", "B", "C", "SomeClass", "Core", "Class"] {
        put_string(&mut buf, name);
        put_u64(&mut buf, 0x7);
    }
    buf
}

fn build_import_table() -> Vec<u8> {
    let mut buf = Vec::new();
    put_i32(&mut buf, 4); // class package: Core
    put_i32(&mut buf, 0);
    put_i32(&mut buf, 5); // class name: Class
    put_i32(&mut buf, 0);
    put_i32(&mut buf, 0); // outer
    put_i32(&mut buf, 3); // object name: SomeClass
    put_i32(&mut buf, 0);
    buf
}

fn export_record(outer: i32, name_index: i32, size: i32, offset: i32) -> Vec<u8> {
    let mut buf = Vec::new();
    put_i32(&mut buf, -1); // class: import 0 (SomeClass)
    put_i32(&mut buf, 0); // super
    put_i32(&mut buf, outer);
    put_i32(&mut buf, name_index);
    put_i32(&mut buf, 0);
    put_i32(&mut buf, 0); // archetype
    put_u64(&mut buf, 0x0400_0000); // object flags
    put_i32(&mut buf, size);
    put_i32(&mut buf, offset);
    put_u32(&mut buf, 0); // export flags
    put_i32(&mut buf, 2); // net object count count
    put_i32(&mut buf, 3);
    put_i32(&mut buf, 4);
    for word in [0u32; 4] {
        put_u32(&mut buf, word); // export guid
    }
    put_u32(&mut buf, 0); // export package flags
    buf
}

/// A complete version-900 package with three nested exports and one
/// payload per export directly after the header region.
fn build_package(payloads: &[&[u8]; 3]) -> Vec<u8> {
    let names = build_name_table();
    let imports = build_import_table();
    let record_len = export_record(0, 0, 0, 0).len();

    let header_len = build_header(900, 0, [(0, 0); 3], 0).len();
    let name_offset = header_len as i32;
    let import_offset = name_offset + names.len() as i32;
    let export_offset = import_offset + imports.len() as i32;
    let total_header_size = export_offset + (3 * record_len) as i32;

    let mut exports = Vec::new();
    let mut offset = total_header_size;
    for (i, payload) in payloads.iter().enumerate() {
        // Exports nest A -> B -> C: each outer index points at the
        // previous export (1-based), zero for the root.
        exports.extend_from_slice(&export_record(
            i as i32,
            i as i32,
            payload.len() as i32,
            offset,
        ));
        offset += payload.len() as i32;
    }

    let mut file = build_header(
        900,
        total_header_size,
        [
            (6, name_offset),
            (3, export_offset),
            (1, import_offset),
        ],
        0,
    );
    file.extend_from_slice(&names);
    file.extend_from_slice(&imports);
    file.extend_from_slice(&exports);
    assert_eq!(file.len(), total_header_size as usize);
    for payload in payloads {
        file.extend_from_slice(payload);
    }
    file
}

fn decode(bytes: Vec<u8>) -> UpkPackage {
    UpkReader::new(Cursor::new(bytes)).read_package().unwrap()
}

/// Write the extraction tree the repackager expects: one file per export,
/// package path as directories, `Name.Class` as the file name.
fn write_extraction_tree(root: &Path, a: &[u8], b: &[u8], c: &[u8]) {
    fs::create_dir_all(root.join("A/B")).unwrap();
    fs::write(root.join("A.SomeClass"), a).unwrap();
    fs::write(root.join("A/B.SomeClass"), b).unwrap();
    fs::write(root.join("A/B/C.SomeClass"), c).unwrap();
}

#[test]
fn decodes_a_full_package() {
    let package = decode(build_package(&[b"alpha", b"bee", b"sea payload"]));
    let header = &package.header;

    assert_eq!(header.file_version_low(), 900);
    assert_eq!(header.licensee_version(), LICENSEE);
    assert_eq!(header.folder_name, "CookedPC");
    assert_eq!(header.package_flags, 0x8);
    assert_eq!(header.name_count, 6);
    assert_eq!(header.import_count, 1);
    assert_eq!(header.export_count, 3);
    assert_eq!(header.guid_table.unwrap().import_export_guids_offset, 0x99);
    assert_eq!(header.thumbnail_table_offset, Some(0x55));
    assert_eq!(header.guid.to_string(), "00000001-0002-0000-0300-000004000000");
    assert_eq!(header.generations.len(), 1);
    assert_eq!(header.engine_version, 12791);
    assert_eq!(header.additional_packages_to_cook, vec!["Startup_LOC"]);
    assert_eq!(header.texture_allocations.len(), 1);
    assert_eq!(header.texture_allocations[0].export_indices, vec![1]);
    assert!(!header.is_compressed());

    assert_eq!(package.names.len(), 6);
    assert_eq!(package.names.get(3), Some("SomeClass"));

    assert_eq!(package.imports.len(), 1);
    let import = package.imports.get(0).unwrap();
    assert_eq!(package.names.display(import.object_name), "SomeClass");
    assert_eq!(import.outer, ObjectRef::None);

    let exports = package.exports.entries();
    assert_eq!(exports.len(), 3);
    assert_eq!(exports[0].name, "A");
    assert_eq!(exports[1].name, "B");
    assert_eq!(exports[2].name, "C");
    for export in exports {
        assert_eq!(export.class_name, "SomeClass");
        assert_eq!(export.class_index, ObjectRef::Import(0));
    }
    assert_eq!(exports[0].package_path, Vec::<String>::new());
    assert_eq!(exports[1].package_path, vec!["A"]);
    assert_eq!(exports[2].package_path, vec!["A", "B"]);

    // Payloads sit contiguously after the header region.
    let base = header.total_header_size;
    assert_eq!(exports[0].serial_offset, base);
    assert_eq!(exports[0].serialize_size, 5);
    assert_eq!(exports[1].serial_offset, base + 5);
    assert_eq!(exports[2].serial_offset, base + 5 + 3);
}

#[test]
fn patch_anchor_points_at_size_field() {
    let bytes = build_package(&[b"alpha", b"bee", b"sea payload"]);
    let package = decode(bytes.clone());

    for export in package.exports.entries() {
        let anchor = export.size_field_offset as usize;
        let size = i32::from_le_bytes(bytes[anchor..anchor + 4].try_into().unwrap());
        let offset = i32::from_le_bytes(bytes[anchor + 4..anchor + 8].try_into().unwrap());
        assert_eq!(size, export.serialize_size);
        assert_eq!(offset, export.serial_offset);
    }
}

#[test]
fn version_gating_skips_absent_fields() {
    // 600: thumbnail offset present, guid table and texture allocations not.
    let package = decode(build_header(600, 0x40, [(0, 0); 3], 0));
    assert!(package.header.guid_table.is_none());
    assert_eq!(package.header.thumbnail_table_offset, Some(0x55));
    assert_eq!(package.header.guid.to_string(), "00000001-0002-0000-0300-000004000000");
    assert!(package.header.texture_allocations.is_empty());
    assert_eq!(package.header.additional_packages_to_cook, vec!["Startup_LOC"]);

    // 500: no gated field at all.
    let package = decode(build_header(500, 0x40, [(0, 0); 3], 0));
    assert!(package.header.guid_table.is_none());
    assert!(package.header.thumbnail_table_offset.is_none());
    assert_eq!(package.header.guid.to_string(), "00000001-0002-0000-0300-000004000000");
    assert!(package.header.additional_packages_to_cook.is_empty());

    // 900: everything, in order, before the package guid.
    let package = decode(build_header(900, 0x40, [(0, 0); 3], 0));
    assert!(package.header.guid_table.is_some());
    assert_eq!(package.header.thumbnail_table_offset, Some(0x55));
    assert_eq!(package.header.guid.to_string(), "00000001-0002-0000-0300-000004000000");
}

#[test]
fn compressed_package_stops_after_header() {
    // The file ends right after the header: any table read would fail.
    let bytes = build_header(900, 0x40, [(6, 0x1000), (3, 0x2000), (1, 0x3000)], 0x01);
    let package = decode(bytes);
    assert!(package.header.is_compressed());
    assert_eq!(package.header.compressed_chunks.len(), 1);
    assert!(package.names.is_empty());
    assert!(package.imports.is_empty());
    assert!(package.exports.is_empty());
}

#[test]
fn bad_tag_is_rejected() {
    let mut bytes = build_header(900, 0x40, [(0, 0); 3], 0);
    bytes[..4].copy_from_slice(&0x4B505350u32.to_le_bytes());
    let err = UpkReader::new(Cursor::new(bytes)).read_package().unwrap_err();
    assert!(matches!(err, Error::BadTag(0x4B505350)));
}

#[test]
fn truncated_package_is_rejected() {
    let mut bytes = build_package(&[b"alpha", b"bee", b"sea payload"]);
    bytes.truncate(bytes.len() / 2);
    let err = UpkReader::new(Cursor::new(bytes)).read_package().unwrap_err();
    assert!(matches!(err, Error::TruncatedInput));
}

#[test]
fn repack_rewrites_payloads_and_offsets() {
    let dir = tempdir().unwrap();
    let source_bytes = build_package(&[b"alpha", b"bee", b"sea payload"]);
    let source_path = dir.path().join("Test.upk");
    fs::write(&source_path, &source_bytes).unwrap();

    // Replacement payloads with different sizes than the originals.
    let (new_a, new_b, new_c) = (b"replacement A".as_slice(), b"b!".as_slice(), b"CCCC".as_slice());
    let extracted = dir.path().join("extracted");
    write_extraction_tree(&extracted, new_a, new_b, new_c);

    let output_path = dir.path().join("Test.patched.upk");
    let summary = Repackager::new(&source_path, &extracted)
        .write(&output_path)
        .unwrap();
    assert_eq!(summary.exports_patched, 3);
    assert_eq!(summary.payload_bytes, (new_a.len() + new_b.len() + new_c.len()) as u64);

    let source = decode(source_bytes.clone());
    let header_size = source.header.total_header_size as usize;
    let base = source.header.total_header_size;

    // Expected output: the source header region with only the three
    // size/offset windows rewritten, then the new payloads back to back.
    let mut expected = source_bytes[..header_size].to_vec();
    let new_payloads = [new_a, new_b, new_c];
    let mut offset = base;
    for (export, payload) in source.exports.entries().iter().zip(new_payloads) {
        let anchor = export.size_field_offset as usize;
        expected[anchor..anchor + 4].copy_from_slice(&(payload.len() as i32).to_le_bytes());
        expected[anchor + 4..anchor + 8].copy_from_slice(&offset.to_le_bytes());
        offset += payload.len() as i32;
    }
    for payload in new_payloads {
        expected.extend_from_slice(payload);
    }
    assert_eq!(fs::read(&output_path).unwrap(), expected);

    // The patched copy decodes, with monotonically recomputed offsets.
    let patched = decode(expected);
    let exports = patched.exports.entries();
    assert_eq!(exports[0].serialize_size, new_a.len() as i32);
    assert_eq!(exports[0].serial_offset, base);
    assert_eq!(exports[1].serial_offset, base + new_a.len() as i32);
    assert_eq!(
        exports[2].serial_offset,
        base + (new_a.len() + new_b.len()) as i32
    );
}

#[test]
fn missing_payload_leaves_no_output_behind() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("Test.upk");
    fs::write(&source_path, build_package(&[b"alpha", b"bee", b"sea payload"])).unwrap();

    let extracted = dir.path().join("extracted");
    fs::create_dir_all(extracted.join("A/B")).unwrap();
    fs::write(extracted.join("A.SomeClass"), b"a").unwrap();
    fs::write(extracted.join("A/B.SomeClass"), b"b").unwrap();
    // A/B/C.SomeClass is deliberately absent.

    let output_path = dir.path().join("Test.patched.upk");
    let err = Repackager::new(&source_path, &extracted)
        .write(&output_path)
        .unwrap_err();
    match err {
        Error::ResourceNotFound { path } => {
            assert_eq!(path, extracted.join("A/B/C.SomeClass"));
        }
        other => panic!("expected ResourceNotFound, got {other:?}"),
    }
    assert!(!output_path.exists());
}

#[test]
fn existing_output_is_refused() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("Test.upk");
    fs::write(&source_path, build_package(&[b"alpha", b"bee", b"sea payload"])).unwrap();
    let extracted = dir.path().join("extracted");
    write_extraction_tree(&extracted, b"a", b"b", b"c");

    let output_path = dir.path().join("Test.patched.upk");
    fs::write(&output_path, b"already here").unwrap();

    let err = Repackager::new(&source_path, &extracted)
        .write(&output_path)
        .unwrap_err();
    assert!(matches!(err, Error::OutputCreateFailure { .. }));
    assert_eq!(fs::read(&output_path).unwrap(), b"already here");
}

#[test]
fn compressed_package_is_refused_for_repack() {
    let dir = tempdir().unwrap();
    let source_path = dir.path().join("Test.upk");
    fs::write(&source_path, build_header(900, 0x40, [(0, 0); 3], 0x01)).unwrap();

    let err = Repackager::new(&source_path, dir.path().join("extracted"))
        .write(dir.path().join("out.upk"))
        .unwrap_err();
    assert!(matches!(err, Error::Compressed { flags: 0x01 }));
}
