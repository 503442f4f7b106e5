//! Import pipeline policy behaviour

use pretty_assertions::assert_eq;
use tes3_land::height::decode_vhgt;
use tes3_land::store::{FLAG_HEIGHTS, FLAG_TEXTURES};
use tes3_land::texture::decode_vtex;
use tes3_land::{
    CellCoord, ConversionPolicy, LandStore, Raster, RecordStore, SubrecordKind, import_heightmap,
};

fn heights_of(store: &LandStore, cell: CellCoord) -> Vec<f32> {
    let vhgt = store
        .read_subrecord(cell, SubrecordKind::Height)
        .unwrap()
        .expect("cell has heights");
    decode_vhgt(cell, &vhgt).unwrap().as_slice().to_vec()
}

#[test]
fn clamp_limits_are_inclusive() {
    // +-800 game units is +-100 height units
    let policy = ConversionPolicy::builder()
        .clamp_limits(-800, 800)
        .build()
        .unwrap();

    let mut store = LandStore::new();
    let report =
        import_heightmap(&Raster::new(64, 64, 100), None, &policy, &mut store).unwrap();
    assert_eq!(report.heights_clamped, 0);
    assert!(heights_of(&store, CellCoord::default()).iter().all(|&h| h == 100.0));

    let mut store = LandStore::new();
    let report =
        import_heightmap(&Raster::new(64, 64, 101), None, &policy, &mut store).unwrap();
    assert_eq!(report.heights_clamped, 65 * 65);
    assert!(heights_of(&store, CellCoord::default()).iter().all(|&h| h == 100.0));

    let mut store = LandStore::new();
    import_heightmap(&Raster::new(64, 64, -500), None, &policy, &mut store).unwrap();
    assert!(heights_of(&store, CellCoord::default()).iter().all(|&h| h == -100.0));
}

#[test]
fn lower_clamp_limit_is_inclusive() {
    let policy = ConversionPolicy::builder()
        .clamp_limits(-800, 800)
        .build()
        .unwrap();

    let mut store = LandStore::new();
    let report =
        import_heightmap(&Raster::new(64, 64, -100), None, &policy, &mut store).unwrap();
    assert_eq!(report.heights_clamped, 0);
    assert!(heights_of(&store, CellCoord::default()).iter().all(|&h| h == -100.0));

    let mut store = LandStore::new();
    let report =
        import_heightmap(&Raster::new(64, 64, -101), None, &policy, &mut store).unwrap();
    assert_eq!(report.heights_clamped, 65 * 65);
    assert!(heights_of(&store, CellCoord::default()).iter().all(|&h| h == -100.0));
}

#[test]
fn ignore_band_skips_only_cells_entirely_inside() {
    let policy = ConversionPolicy::builder()
        .ignore_band(-64, 0)
        .build()
        .unwrap();

    // Two cells of sea floor at -64 game units
    let mut image = Raster::new(128, 64, -8);
    // One vertex of the eastern cell sits 8 game units above the band
    image.set(100, 10, 1);

    let mut store = LandStore::new();
    let report = import_heightmap(&image, None, &policy, &mut store).unwrap();
    assert_eq!(report.cells_skipped, 1);
    assert_eq!(report.cells_written, 1);
    assert_eq!(store.list_cells(), vec![CellCoord::new(1, 0)]);
}

#[test]
fn ignore_band_upper_bound_is_inclusive() {
    let policy = ConversionPolicy::builder()
        .ignore_band(-64, 0)
        .build()
        .unwrap();
    let mut store = LandStore::new();
    let report = import_heightmap(&Raster::new(64, 64, 0), None, &policy, &mut store).unwrap();
    assert_eq!(report.cells_skipped, 1);
    assert!(store.is_empty());
}

#[test]
fn fixed_texture_paints_every_tile() {
    let policy = ConversionPolicy::builder()
        .fixed_texture(12)
        .build()
        .unwrap();
    let mut store = LandStore::new();
    import_heightmap(&Raster::new(64, 64, 0), None, &policy, &mut store).unwrap();

    let cell = CellCoord::default();
    let record = store.record(cell).unwrap();
    assert_eq!(record.flags(), FLAG_HEIGHTS | FLAG_TEXTURES);

    let vtex = record.get(SubrecordKind::Texture).unwrap();
    let textures = decode_vtex(cell, vtex).unwrap();
    assert!(textures.as_slice().iter().all(|&t| t == 12));
}

#[test]
fn steep_cliffs_are_counted() {
    let mut image = Raster::new(64, 64, 0);
    for y in 0..64 {
        image.set(32, y, 1000);
    }
    let mut store = LandStore::new();
    let report =
        import_heightmap(&image, None, &ConversionPolicy::default(), &mut store).unwrap();
    assert!(report.deltas_clamped > 0);
    assert_eq!(report.cells_written, 1);
}

#[test]
fn shared_edges_match_between_neighbours() {
    let image = super::ramp(128, 128, 0);
    let mut store = LandStore::new();
    import_heightmap(&image, None, &ConversionPolicy::default(), &mut store).unwrap();

    let west = heights_of(&store, CellCoord::new(0, 0));
    let east = heights_of(&store, CellCoord::new(1, 0));
    let north = heights_of(&store, CellCoord::new(0, 1));
    for i in 0..65 {
        assert_eq!(west[i * 65 + 64], east[i * 65], "row {i}");
        assert_eq!(west[64 * 65 + i], north[i], "column {i}");
    }
}
