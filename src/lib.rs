//! Turns photographs into pixel art.
//!
//! The image is cut into a grid of equal blocks whose size is chosen by a
//! granularity level, every block is replaced by one representative colour
//! (its mean, optionally snapped to a fixed [`Palette`]), and the result is
//! quantized to a bounded number of colours.

/// Everything that can go wrong while pixelating an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter is outside the range the pipeline accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A block index is not inside the grid.
    #[error("block {index} is out of range (the grid has {count} blocks)")]
    OutOfRange { index: usize, count: usize },

    /// A palette resource could not be found or understood.
    #[error("failed to load the {bits}-bit palette: {reason}")]
    ResourceLoad { bits: u32, reason: String },

    /// The source image could not be decoded.
    #[error("failed to load image: {0}")]
    ImageLoad(#[source] image::ImageError),

    /// The output image could not be encoded.
    #[error("failed to save image: {0}")]
    ImageSave(#[source] image::ImageError),
}

/// A general `Result` type.
pub type Result<T=()> = std::result::Result<T, Error>;

// ----------------------------------------------------------------------------

/// Pixel coordinates, with `(0, 0)` at the top left. The coordinates are
/// listed in the order `(row, column)`, i.e. y-coordinate first.
pub type Grid = (usize, usize);

/// An 8-bit RGB colour.
pub type Colour = [u8; 3];

// ----------------------------------------------------------------------------

pub mod io;

mod grid;
pub use grid::{find_block_dim, BBox, BlockGrid};

mod colour;
pub use colour::{ColourSpace, Reducer, mean_colour};

pub mod palette;
pub use palette::{Palette, PaletteBits, PaletteSource};

mod quantize;
pub use quantize::{Indexed, quantize};

mod pixelate;
pub use pixelate::{Options, Progress, Silent, Stage, pixelate};
