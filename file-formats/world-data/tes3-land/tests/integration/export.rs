//! Export pipeline behaviour over hand-built stores

use pretty_assertions::assert_eq;
use tes3_land::height::encode;
use tes3_land::store::LandRecord;
use tes3_land::types::HeightGrid;
use tes3_land::{
    CellCoord, ConversionPolicy, LandError, LandStore, RecordStore, RecordTag, SubrecordKind,
    export_heightmap,
};

fn flat_cell(store: &mut LandStore, cell: CellCoord, height: f32) {
    store
        .write_subrecord(
            cell,
            SubrecordKind::Height,
            encode(&HeightGrid::filled(height)).to_bytes(),
        )
        .unwrap();
}

#[test]
fn disagreeing_edges_resolve_to_the_later_cell() {
    let mut store = LandStore::new();
    flat_cell(&mut store, CellCoord::new(0, 0), 10.0);
    flat_cell(&mut store, CellCoord::new(1, 0), 20.0);

    let exported = export_heightmap(&store, &ConversionPolicy::default()).unwrap();
    // Column 64 is written by both cells; (1, 0) comes later in row-major order
    for y in 0..64 {
        assert_eq!(exported.heights.get(64, y), Some(20));
        assert_eq!(exported.heights.get(63, y), Some(10));
    }
    assert_eq!(exported.report.inconsistent_vertices, 64);
}

#[test]
fn export_is_deterministic() {
    let mut store = LandStore::new();
    flat_cell(&mut store, CellCoord::new(0, 1), 5.0);
    flat_cell(&mut store, CellCoord::new(0, 0), 7.0);
    flat_cell(&mut store, CellCoord::new(1, 1), 9.0);

    let policy = ConversionPolicy::default();
    let first = export_heightmap(&store, &policy).unwrap();
    let second = export_heightmap(&store.clone(), &policy).unwrap();
    assert_eq!(first.heights, second.heights);
    assert_eq!(first.report, second.report);
}

#[test]
fn truncated_vhgt_aborts_export() {
    let mut store = LandStore::new();
    flat_cell(&mut store, CellCoord::new(0, 0), 1.0);

    let broken = CellCoord::new(3, -1);
    let mut record = LandRecord::new();
    record.insert(SubrecordKind::Height, vec![0; 100]);
    store.insert_record(broken, record);

    let err = export_heightmap(&store, &ConversionPolicy::default()).unwrap_err();
    match err {
        LandError::MalformedRecord { cell, tag, .. } => {
            assert_eq!(cell, broken);
            assert_eq!(tag, RecordTag::VHGT);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unpadded_vhgt_is_accepted() {
    let mut store = LandStore::new();
    let mut bytes = encode(&HeightGrid::filled(42.0)).to_bytes();
    bytes.truncate(bytes.len() - 3);
    store
        .write_subrecord(CellCoord::default(), SubrecordKind::Height, bytes)
        .unwrap();

    let exported = export_heightmap(&store, &ConversionPolicy::default()).unwrap();
    assert!(exported.heights.as_slice().iter().all(|&h| h == 42));
}

#[test]
fn textures_are_laid_out_per_cell() {
    let mut store = LandStore::new();
    flat_cell(&mut store, CellCoord::new(0, 0), 0.0);
    flat_cell(&mut store, CellCoord::new(1, 0), 0.0);
    store
        .write_subrecord(
            CellCoord::new(1, 0),
            SubrecordKind::Texture,
            tes3_land::texture::uniform_vtex(3),
        )
        .unwrap();

    let exported = export_heightmap(&store, &ConversionPolicy::default()).unwrap();
    let textures = exported.textures.expect("textures exported");
    assert_eq!((textures.width(), textures.height()), (32, 16));
    assert_eq!(textures.get(15, 0), Some(0));
    assert_eq!(textures.get(16, 0), Some(3));
}
