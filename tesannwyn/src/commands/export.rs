//! Plugin landscape to heightmap image

use anyhow::{Context, Result, bail};
use console::style;
use log::info;
use std::path::PathBuf;

use tes3_land::export::export_heightmap_with;
use tes3_land::image_io::{write_colors, write_heightmap, write_textures};
use tes3_land::plugin::read_plugin_file;
use tes3_land::{ExportedHeightmap, LandStore};

use super::{DEFAULT_VCLR_IMAGE, default_image};
use crate::cli::ExportArgs;
use crate::utils::{create_progress_bar, property_table};

pub fn execute(args: ExportArgs) -> Result<()> {
    let policy = args.conversion.to_policy()?;

    let mut store = LandStore::new();
    for path in &args.plugins {
        let plugin = read_plugin_file(path)
            .with_context(|| format!("Failed to read plugin: {}", path.display()))?;
        let replaced = store.overlay(plugin.land);
        if replaced > 0 {
            info!("{} replaces LAND in {replaced} cells", path.display());
        }
    }
    if store.is_empty() {
        bail!("No LAND records found in the given plugins");
    }

    let pb = create_progress_bar(store.len() as u64, "Decoding cells");
    let exported = export_heightmap_with(&store, &policy, |_| pb.inc(1))
        .context("Failed to export landscape")?;
    pb.finish_and_clear();
    if exported.report.cells_exported == 0 {
        bail!(
            "None of the {} LAND records carry heights",
            exported.report.cells_skipped
        );
    }

    let output = args
        .output
        .unwrap_or_else(|| default_image(policy.image_kind()));
    write_heightmap(&output, &exported.heights, &policy)
        .with_context(|| format!("Failed to write heightmap: {}", output.display()))?;

    if let Some(colors) = &exported.colors {
        let path = args
            .colors
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VCLR_IMAGE));
        write_colors(&path, colors)
            .with_context(|| format!("Failed to write vertex colours: {}", path.display()))?;
        println!("Vertex colours written to {}", style(path.display()).cyan());
    }

    if let Some(path) = &args.textures {
        match &exported.textures {
            Some(textures) => write_textures(path, textures)
                .with_context(|| format!("Failed to write textures: {}", path.display()))?,
            None => log::warn!("No cell has texture indices, {} not written", path.display()),
        }
    }

    println!(
        "Exported {} cells to {} ({}x{})",
        style(exported.report.cells_exported).green(),
        style(output.display()).cyan(),
        exported.heights.width(),
        exported.heights.height()
    );
    print_report(&exported);
    println!(
        "Re-import at the same place with: -x {} -y {}",
        style(exported.origin.x).yellow(),
        style(exported.origin.y).yellow()
    );
    Ok(())
}

fn print_report(exported: &ExportedHeightmap) {
    let report = &exported.report;
    property_table(&[
        ("Origin cell", exported.origin.to_string()),
        ("Cells exported", report.cells_exported.to_string()),
        ("Cells without heights", report.cells_skipped.to_string()),
        ("Samples saturated", report.samples_saturated.to_string()),
        (
            "Inconsistent edge vertices",
            report.inconsistent_vertices.to_string(),
        ),
    ])
    .printstd();
}
