use std::path::{Path, PathBuf};
use clap::{Parser};

use crate::{Error, Result, ColourSpace, Options, PaletteBits};
use crate::palette::{Builtin, PaletteDir, PaletteSource};

/// Constructs a default output path from `in_path`: the same directory and
/// file stem, with `_pixelated.png` appended.
pub fn default_out_path(in_path: &Path) -> Result<PathBuf> {
    let stem = in_path.file_stem().ok_or_else(|| Error::InvalidArgument("Empty filename".into()))?;
    let mut name = stem.to_os_string();
    name.push("_pixelated.png");
    Ok(in_path.with_file_name(name))
}

// ----------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(about = "Turn an image into pixel art.")]
#[command(author, version, long_about = None)]
pub struct Args {
    /// Input path.
    pub in_path: PathBuf,

    /// Output path. Defaults to `<input>_pixelated.png`.
    #[arg(short, long)]
    pub out_path: Option<PathBuf>,

    /// Block coarseness (>0): a bigger value means bigger blocks.
    #[arg(short, long, default_value_t = 1)]
    pub granularity: usize,

    /// Number of colours to use: 1-256.
    #[arg(short = 'n', long, default_value_t = 256)]
    pub ncolors: usize,

    /// Number of bits of the palette. 24 means no palette.
    #[arg(short = 'p', long, default_value_t = 24)]
    pub nbits: u32,

    /// Compare colours in L*a*b* instead of RGB.
    #[arg(short, long)]
    pub lab: bool,

    /// Read palettes from `<dir>/<bits>bit.palette` instead of using the
    /// built-in ones.
    #[arg(long)]
    pub palette_dir: Option<PathBuf>,

    /// Show progress.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Returns `out_path` or `default_out_path()`.
    pub fn out_path(&self) -> Result<PathBuf> {
        self.out_path.clone().map_or_else(|| default_out_path(&self.in_path), Ok)
    }

    /// Collects and validates the pipeline parameters.
    pub fn options(&self) -> Result<Options> {
        let options = Options {
            granularity: self.granularity,
            ncolours: self.ncolors,
            bits: PaletteBits::try_from(self.nbits)?,
            space: if self.lab { ColourSpace::Lab } else { ColourSpace::Rgb },
        };
        options.validate()?;
        Ok(options)
    }

    /// Returns the source of palettes.
    pub fn palettes(&self) -> Box<dyn PaletteSource> {
        match &self.palette_dir {
            Some(dir) => Box::new(PaletteDir(dir.clone())),
            None => Box::new(Builtin),
        }
    }
}

// ----------------------------------------------------------------------------
