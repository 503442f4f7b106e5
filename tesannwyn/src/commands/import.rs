//! Heightmap image to plugin

use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;

use tes3_land::image_io::{read_colors, read_heightmap};
use tes3_land::import::import_heightmap_with;
use tes3_land::plugin::{PluginHeader, write_plugin_file};
use tes3_land::{ImportReport, LandStore};

use super::{DEFAULT_PLUGIN, DEFAULT_VCLR_IMAGE};
use crate::cli::ImportArgs;
use crate::utils::{create_progress_bar, property_table};

pub fn execute(args: ImportArgs) -> Result<()> {
    let policy = args.conversion.to_policy()?;

    let heights = read_heightmap(&args.image, &policy)
        .with_context(|| format!("Failed to read heightmap: {}", args.image.display()))?;

    let colors_path = args
        .colors
        .or_else(|| policy.vertex_color().then(|| PathBuf::from(DEFAULT_VCLR_IMAGE)));
    let colors = match &colors_path {
        Some(path) => Some(
            read_colors(path)
                .with_context(|| format!("Failed to read vertex colours: {}", path.display()))?,
        ),
        None => None,
    };

    let (columns, rows) = heights.rect().cell_span();
    let pb = create_progress_bar((columns * rows) as u64, "Importing cells");
    let mut store = LandStore::new();
    let report = import_heightmap_with(&heights, colors.as_ref(), &policy, &mut store, |_| {
        pb.inc(1);
    })
    .with_context(|| format!("Failed to import {}", args.image.display()))?;
    pb.finish_and_clear();

    let output = args.output.unwrap_or_else(|| PathBuf::from(DEFAULT_PLUGIN));
    write_plugin_file(&output, &store, &PluginHeader::default())
        .with_context(|| format!("Failed to write plugin: {}", output.display()))?;

    println!(
        "Imported {} into {} ({} cells from {})",
        style(args.image.display()).cyan(),
        style(output.display()).cyan(),
        style(report.cells_written).green(),
        policy.cell_offset()
    );
    print_report(&report);
    Ok(())
}

fn print_report(report: &ImportReport) {
    property_table(&[
        ("Cells written", report.cells_written.to_string()),
        ("Cells skipped", report.cells_skipped.to_string()),
        ("Heights clamped", report.heights_clamped.to_string()),
        ("Lossy height steps", report.deltas_clamped.to_string()),
    ])
    .printstd();
}
