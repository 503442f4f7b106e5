//! Image -> LAND -> image round trips

use pretty_assertions::assert_eq;
use tes3_land::height::parse_vhgt;
use tes3_land::{
    CellCoord, ConversionPolicy, ImageKind, LandStore, Raster, RecordStore, SubrecordKind,
    export_heightmap, import_heightmap,
};

use super::ramp;

#[test]
fn four_cell_image_round_trips() {
    let image = ramp(128, 128, -50);
    let policy = ConversionPolicy::default();
    let mut store = LandStore::new();

    let imported = import_heightmap(&image, None, &policy, &mut store).unwrap();
    assert_eq!(imported.cells_written, 4);
    assert_eq!(imported.deltas_clamped, 0);
    assert_eq!(
        store.list_cells(),
        vec![
            CellCoord::new(0, 0),
            CellCoord::new(1, 0),
            CellCoord::new(0, 1),
            CellCoord::new(1, 1),
        ]
    );

    let exported = export_heightmap(&store, &policy).unwrap();
    assert_eq!(exported.origin, CellCoord::new(0, 0));
    assert_eq!(exported.report.inconsistent_vertices, 0);
    assert_eq!(exported.report.samples_saturated, 0);
    assert_eq!(exported.heights, image);
}

#[test]
fn uniform_eight_bit_image_gives_four_flat_cells() {
    let image = Raster::new(128, 128, 128);
    let policy = ConversionPolicy::builder()
        .image_kind(ImageKind::Raw)
        .bits(8)
        .dimensions(128, 128)
        .cell_offset(0, 0)
        .build()
        .unwrap();
    let mut store = LandStore::new();

    let report = import_heightmap(&image, None, &policy, &mut store).unwrap();
    assert_eq!(report.cells_written, 4);
    assert_eq!(report.deltas_clamped, 0);

    let cells = store.list_cells();
    assert_eq!(cells.len(), 4);
    let mut offsets = Vec::new();
    for cell in cells {
        let vhgt = store
            .read_subrecord(cell, SubrecordKind::Height)
            .unwrap()
            .unwrap();
        let (offset, deltas) = parse_vhgt(cell, &vhgt).unwrap();
        assert!(
            deltas.as_slice().iter().all(|&d| d == 0),
            "{cell} has non-zero deltas"
        );
        offsets.push(offset);
    }
    assert!(offsets.iter().all(|&o| o == offsets[0]));
    assert_eq!(offsets[0], 128.0);

    let exported = export_heightmap(&store, &policy).unwrap();
    assert_eq!(exported.heights, image);
}

#[test]
fn negative_origin_round_trips() {
    let image = ramp(64, 128, 300);
    let policy = ConversionPolicy::builder()
        .cell_offset(-7, -2)
        .build()
        .unwrap();
    let mut store = LandStore::new();
    import_heightmap(&image, None, &policy, &mut store).unwrap();

    let exported = export_heightmap(&store, &policy).unwrap();
    assert_eq!(exported.origin, CellCoord::new(-7, -2));
    assert_eq!(exported.heights, image);
}

#[test]
fn scale_and_offset_invert_on_export() {
    let image = ramp(64, 64, 10);
    let policy = ConversionPolicy::builder()
        .scale(2.0)
        .height_offset(100)
        .build()
        .unwrap();
    let mut store = LandStore::new();
    import_heightmap(&image, None, &policy, &mut store).unwrap();

    let exported = export_heightmap(&store, &policy).unwrap();
    assert_eq!(exported.heights, image);

    // Without the inverse, samples come back in height units
    let plain = export_heightmap(&store, &ConversionPolicy::default()).unwrap();
    let expected = (10.0f32 * 2.0 + 12.5).round() as i32;
    assert_eq!(plain.heights.get(0, 0), Some(expected));
}

#[test]
fn eight_bit_round_trip() {
    let image = ramp(64, 64, 0);
    let policy = ConversionPolicy::builder().bits(8).build().unwrap();
    let mut store = LandStore::new();
    import_heightmap(&image, None, &policy, &mut store).unwrap();

    let exported = export_heightmap(&store, &policy).unwrap();
    assert_eq!(exported.heights, image);
}

#[test]
fn colours_round_trip() {
    let image = ramp(128, 64, 0);
    let mut colors = Raster::new(128, 64, [0u8; 3]);
    for y in 0..64 {
        for x in 0..128 {
            colors.set(x, y, [x as u8, y as u8, 200]);
        }
    }
    let policy = ConversionPolicy::builder()
        .vertex_color(true)
        .build()
        .unwrap();
    let mut store = LandStore::new();
    import_heightmap(&image, Some(&colors), &policy, &mut store).unwrap();

    let exported = export_heightmap(&store, &policy).unwrap();
    assert_eq!(exported.colors, Some(colors));
}
