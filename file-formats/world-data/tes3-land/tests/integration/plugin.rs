//! Plugin files on disk

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tes3_land::image_io::{InputKind, detect_input, read_heightmap, write_heightmap};
use tes3_land::plugin::{PluginHeader, read_plugin_file, write_plugin_file};
use tes3_land::{
    CellCoord, ConversionPolicy, ImageKind, LandError, LandStore, RecordStore, RecordTag,
    SubrecordKind, export_heightmap, import_heightmap,
};

use super::ramp;

#[test]
fn import_write_read_export() {
    let dir = TempDir::new().unwrap();
    let esp = dir.path().join("land.esp");

    let image = ramp(128, 64, 20);
    let policy = ConversionPolicy::builder()
        .cell_offset(2, -1)
        .fixed_texture(1)
        .build()
        .unwrap();
    let mut store = LandStore::new();
    import_heightmap(&image, None, &policy, &mut store).unwrap();
    write_plugin_file(&esp, &store, &PluginHeader::default()).unwrap();

    assert_eq!(detect_input(&esp).unwrap(), InputKind::Plugin);

    let plugin = read_plugin_file(&esp).unwrap();
    assert_eq!(plugin.land, store);
    assert_eq!(plugin.header.num_records, 4);
    assert_eq!(plugin.record_counts.get(&RecordTag::CELL), Some(&2));

    let exported = export_heightmap(&plugin.land, &policy).unwrap();
    assert_eq!(exported.origin, CellCoord::new(2, -1));
    assert_eq!(exported.heights, image);
}

#[test]
fn land_without_heights_survives_and_is_left_out_of_export() {
    let dir = TempDir::new().unwrap();
    let esp = dir.path().join("sparse.esp");

    let policy = ConversionPolicy::default();
    let mut store = LandStore::new();
    import_heightmap(&ramp(64, 64, 10), None, &policy, &mut store).unwrap();

    // Flags 0: no heights, normals or map data
    let bare = CellCoord::new(1, 0);
    store
        .write_subrecord(bare, SubrecordKind::CellCoord, bare.to_bytes().to_vec())
        .unwrap();
    store
        .write_subrecord(bare, SubrecordKind::Flags, 0u32.to_le_bytes().to_vec())
        .unwrap();
    write_plugin_file(&esp, &store, &PluginHeader::default()).unwrap();

    let plugin = read_plugin_file(&esp).unwrap();
    assert_eq!(plugin.land.len(), 2);

    let exported = export_heightmap(&plugin.land, &policy).unwrap();
    assert_eq!(exported.report.cells_exported, 1);
    assert_eq!(exported.report.cells_skipped, 1);
    assert_eq!(exported.heights, ramp(64, 64, 10));
}

#[test]
fn later_plugin_replaces_land_wholesale() {
    let policy = ConversionPolicy::default();

    let mut base = LandStore::new();
    import_heightmap(&ramp(128, 64, 0), None, &policy, &mut base).unwrap();

    let patch_policy = ConversionPolicy::builder()
        .cell_offset(1, 0)
        .build()
        .unwrap();
    let mut patch = LandStore::new();
    import_heightmap(&ramp(64, 64, 500), None, &patch_policy, &mut patch).unwrap();

    let replaced = base.overlay(patch);
    assert_eq!(replaced, 1);

    let exported = export_heightmap(&base, &policy).unwrap();
    assert_eq!(exported.heights.get(64, 0), Some(500));
    assert_eq!(exported.heights.get(0, 0), Some(0));
}

#[test]
fn image_files_round_trip_through_plugin() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("in.raw");
    let out = dir.path().join("out.raw");

    let policy = ConversionPolicy::builder()
        .image_kind(ImageKind::Raw)
        .bits(16)
        .dimensions(64, 128)
        .build()
        .unwrap();
    let image = ramp(64, 128, -200);
    write_heightmap(&raw, &image, &policy).unwrap();

    let read = read_heightmap(&raw, &policy).unwrap();
    let mut store = LandStore::new();
    import_heightmap(&read, None, &policy, &mut store).unwrap();
    let exported = export_heightmap(&store, &policy).unwrap();
    write_heightmap(&out, &exported.heights, &policy).unwrap();

    assert_eq!(std::fs::read(&raw).unwrap(), std::fs::read(&out).unwrap());
}

#[test]
fn non_plugin_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fake.esp");
    std::fs::write(&path, b"TES4\x10\0\0\0\0\0\0\0\0\0\0\0").unwrap();

    let err = read_plugin_file(&path).unwrap_err();
    assert!(matches!(err, LandError::InvalidMagic { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = read_plugin_file(dir.path().join("absent.esp")).unwrap_err();
    assert!(matches!(err, LandError::Io(_)));
}
