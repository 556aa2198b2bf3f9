use log::{debug, info};

use super::{Error, Result};
use super::grid::{BlockGrid};
use super::colour::{ColourSpace, Reducer};
use super::io::{PixelArray};
use super::palette::{self, PaletteBits, PaletteSource};
use super::quantize::{self, Indexed, MAX_COLOURS};

/// The parameters of a run of [`pixelate()`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Options {
    /// Selects the block size. `1` gives single-pixel blocks; larger values
    /// give larger blocks.
    pub granularity: usize,

    /// The maximum number of colours in the output (`1` to `256`).
    pub ncolours: usize,

    /// The palette that block colours are snapped to, if any.
    pub bits: PaletteBits,

    /// How colours are compared when snapping to the palette.
    pub space: ColourSpace,
}

impl Default for Options {
    fn default() -> Self {
        Self {granularity: 1, ncolours: MAX_COLOURS, bits: PaletteBits::TrueColour, space: ColourSpace::Rgb}
    }
}

impl Options {
    /// Checks that the numeric parameters are in range.
    pub fn validate(&self) -> Result {
        if self.granularity < 1 {
            return Err(Error::InvalidArgument("granularity must be at least 1".into()));
        }
        if !(1..=MAX_COLOURS).contains(&self.ncolours) {
            return Err(Error::InvalidArgument(format!(
                "the number of colours must be between 1 and {}, not {}", MAX_COLOURS, self.ncolours,
            )));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------

/// A phase of [`pixelate()`].
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum Stage {
    /// Replacing every block with its representative colour.
    Blocks,

    /// Reducing the whole image to a bounded palette.
    Quantize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Blocks => "Building pixelated image",
            Stage::Quantize => "Quantizing",
        })
    }
}

/// Receives progress reports from [`pixelate()`].
pub trait Progress {
    /// `fraction` runs from `0.0` to `1.0` within each `stage`.
    fn report(&mut self, stage: Stage, fraction: f32);
}

impl<F: FnMut(Stage, f32)> Progress for F {
    fn report(&mut self, stage: Stage, fraction: f32) { self(stage, fraction) }
}

/// A `Progress` that ignores all reports.
#[derive(Debug, Default, Copy, Clone)]
pub struct Silent;

impl Progress for Silent {
    fn report(&mut self, _: Stage, _: f32) {}
}

// ----------------------------------------------------------------------------

/// Turns `image` into pixel art.
///
/// The image is divided into a grid of equal blocks chosen by
/// `options.granularity`. Each block is painted with one colour: its mean,
/// or the closest entry of the palette selected by `options.bits`, which is
/// obtained from `palettes`. The result is then reduced to at most
/// `options.ncolours` colours. Nothing is returned unless every step
/// succeeds.
pub fn pixelate(
    image: &PixelArray,
    options: &Options,
    palettes: &dyn PaletteSource,
    progress: &mut dyn Progress,
) -> Result<Indexed> {
    options.validate()?;
    let palette = palette::resolve(palettes, options.bits)?;
    let reducer = Reducer::new(options.space, palette);

    let (height, width) = image.dimensions();
    debug!("Input image dimensions -> width={}, height={}", width, height);
    let grid = BlockGrid::for_granularity((height, width), options.granularity)?;
    debug!("Block dimensions -> width={}, height={}", grid.block.1, grid.block.0);
    debug!("Grid dimensions -> width={}, height={}", grid.cells.1, grid.cells.0);

    info!("Building pixelated image from {} blocks", grid.len());
    let mut out = image.clone();
    for n in 0..grid.len() {
        progress.report(Stage::Blocks, n as f32 / grid.len() as f32);
        let bbox = grid.bbox_at(n)?;
        let colour = reducer.reduce(&grid.extract(image, n)?);
        out.fill(bbox, colour);
    }
    progress.report(Stage::Blocks, 1.0);

    info!("Reducing to at most {} colours", options.ncolours);
    progress.report(Stage::Quantize, 0.0);
    let indexed = quantize::quantize(&out, options.ncolours)?;
    progress.report(Stage::Quantize, 1.0);
    debug!("Output palette has {} colours", indexed.palette.len());
    Ok(indexed)
}

// ----------------------------------------------------------------------------
