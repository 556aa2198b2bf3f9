use std::path::{Path};

use image::{ImageError, RgbImage};
use image::error::{ParameterError, ParameterErrorKind};
use log::{debug};

use super::{Error, Result};

pub mod cli;

mod pixels;
pub use pixels::{PixelArray, RGB};

// ----------------------------------------------------------------------------

/// Converts a decoded image into a `PixelArray`. Alpha is discarded and deeper
/// formats are reduced to 8 bits per channel.
pub fn from_image(img: image::DynamicImage) -> PixelArray {
    let img = img.into_rgb8();
    let size = (img.height() as usize, img.width() as usize);
    PixelArray::from_raw(size, img.into_raw())
}

/// Converts a `PixelArray` into an `RgbImage`.
pub fn to_image(pixels: PixelArray) -> Result<RgbImage> {
    let (height, width) = pixels.dimensions();
    let raw: Vec<u8> = pixels.into_raw().into();
    RgbImage::from_raw(width as u32, height as u32, raw).ok_or_else(|| Error::ImageSave(
        ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch))
    ))
}

/// Load the specified file into a `PixelArray`.
pub fn load_image(name: impl AsRef<Path>) -> Result<PixelArray> {
    let name = name.as_ref();
    let img = image::open(name).map_err(Error::ImageLoad)?;
    debug!("Decoded {} ({}x{})", name.display(), img.width(), img.height());
    Ok(from_image(img))
}

/// Save `pixels` to the specified file. The format is chosen by the file
/// extension.
pub fn save_image(pixels: PixelArray, name: impl AsRef<Path>) -> Result {
    to_image(pixels)?.save(name).map_err(Error::ImageSave)
}

// ----------------------------------------------------------------------------
