//! Pick a direction from the input file's contents

use anyhow::{Context, Result};
use log::{info, warn};

use tes3_land::ImageKind;
use tes3_land::image_io::{InputKind, detect_input};

use crate::cli::{ConvertArgs, ExportArgs, ImportArgs};

pub fn execute(args: ConvertArgs) -> Result<()> {
    let detected = detect_input(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    info!("{} looks like {:?} input", args.input.display(), detected);

    match detected {
        InputKind::Plugin => super::export::execute(ExportArgs {
            plugins: vec![args.input],
            output: None,
            colors: None,
            textures: None,
            conversion: args.conversion,
        }),
        InputKind::Bmp => {
            let mut conversion = args.conversion;
            if let Some(kind) = conversion.kind
                && kind != ImageKind::Bmp
            {
                warn!("Input is a BMP file, ignoring image type {kind}");
            }
            conversion.kind = Some(ImageKind::Bmp);
            super::import::execute(ImportArgs {
                image: args.input,
                output: None,
                colors: None,
                conversion,
            })
        }
        InputKind::Raw => super::import::execute(ImportArgs {
            image: args.input,
            output: None,
            colors: None,
            conversion: args.conversion,
        }),
    }
}
