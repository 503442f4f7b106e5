//! Plugin header and landscape summary

use anyhow::{Context, Result};
use console::style;
use log::debug;
use std::path::{Path, PathBuf};

use tes3_land::height::decode_vhgt;
use tes3_land::plugin::{Plugin, read_plugin_file};
use tes3_land::types::GAME_UNITS_PER_HEIGHT_UNIT;
use tes3_land::{CellCoord, SubrecordKind};

use crate::utils::{add_table_row, create_table, property_table};

pub fn execute(plugins: &[PathBuf]) -> Result<()> {
    for path in plugins {
        let plugin = read_plugin_file(path)
            .with_context(|| format!("Failed to read plugin: {}", path.display()))?;
        print_plugin(path, &plugin);
    }
    Ok(())
}

fn print_plugin(path: &Path, plugin: &Plugin) {
    println!("{}", style(path.display()).bold().cyan());

    let header = &plugin.header;
    let file_type = match header.file_type {
        0 => "Plugin (esp)".to_string(),
        1 => "Master (esm)".to_string(),
        other => format!("Unknown ({other})"),
    };
    property_table(&[
        ("Version", format!("{:.2}", header.version)),
        ("Type", file_type),
        ("Author", header.author.clone()),
        ("Description", header.description.clone()),
        ("Records", header.num_records.to_string()),
    ])
    .printstd();

    let mut counts = create_table(&["Record", "Count"]);
    for (tag, count) in &plugin.record_counts {
        add_table_row(&mut counts, [tag.to_string(), count.to_string()]);
    }
    counts.printstd();

    match LandSummary::collect(plugin) {
        Some(summary) => summary.print(),
        None => println!("{}", style("No LAND records").yellow()),
    }
    println!();
}

/// Landscape statistics over every LAND record of a plugin
struct LandSummary {
    cells: usize,
    min_cell: CellCoord,
    max_cell: CellCoord,
    with_colors: usize,
    with_textures: usize,
    without_heights: usize,
    malformed: usize,
    heights: Option<(f32, f32)>,
}

impl LandSummary {
    fn collect(plugin: &Plugin) -> Option<Self> {
        let mut cells = plugin.land.iter().map(|(cell, _)| *cell);
        let first = cells.next()?;
        let (min_cell, max_cell) = cells.fold((first, first), |(lo, hi), c| {
            (
                CellCoord::new(lo.x.min(c.x), lo.y.min(c.y)),
                CellCoord::new(hi.x.max(c.x), hi.y.max(c.y)),
            )
        });

        let mut summary = Self {
            cells: plugin.land.len(),
            min_cell,
            max_cell,
            with_colors: 0,
            with_textures: 0,
            without_heights: 0,
            malformed: 0,
            heights: None,
        };

        for (cell, record) in plugin.land.iter() {
            if record.contains(SubrecordKind::Color) {
                summary.with_colors += 1;
            }
            if record.contains(SubrecordKind::Texture) {
                summary.with_textures += 1;
            }

            let Some(vhgt) = record.get(SubrecordKind::Height) else {
                summary.without_heights += 1;
                continue;
            };
            match decode_vhgt(*cell, vhgt) {
                Ok(grid) => {
                    let (lo, hi) = grid.height_range();
                    summary.heights = Some(match summary.heights {
                        Some((min, max)) => (min.min(lo), max.max(hi)),
                        None => (lo, hi),
                    });
                }
                Err(e) => {
                    debug!("{cell}: {e}");
                    summary.malformed += 1;
                }
            }
        }

        Some(summary)
    }

    fn print(&self) {
        let units = GAME_UNITS_PER_HEIGHT_UNIT as f32;
        let (lowest, highest) = match self.heights {
            Some((lo, hi)) => (
                format!("{:.0}", lo * units),
                format!("{:.0}", hi * units),
            ),
            None => ("-".to_string(), "-".to_string()),
        };

        property_table(&[
            ("LAND cells", self.cells.to_string()),
            ("South-west cell", self.min_cell.to_string()),
            ("North-east cell", self.max_cell.to_string()),
            ("With vertex colours", self.with_colors.to_string()),
            ("With textures", self.with_textures.to_string()),
            ("Lowest point (game units)", lowest),
            ("Highest point (game units)", highest),
            ("Without heights", self.without_heights.to_string()),
            ("Malformed heights", self.malformed.to_string()),
        ])
        .printstd();
    }
}
