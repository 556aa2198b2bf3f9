use std::mem::{transmute};

use multidimension::{NonTuple, Index, StaticIndex, View, Array};

use crate::{Grid, Colour};
use crate::grid::{BBox};

// ----------------------------------------------------------------------------

/// Indicates a channel of a colour image.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(u8)]
pub enum RGB {Red=0, Green=1, Blue=2}

impl NonTuple for RGB {}

impl StaticIndex for RGB {
    const ALL: &'static [Self] = &[RGB::Red, RGB::Green, RGB::Blue];
    fn to_usize(self) -> usize { self as usize }
    fn from_usize(index: usize) -> Self { unsafe { transmute(index as u8) } }
}

// ----------------------------------------------------------------------------

/// A rectangular grid of 8-bit RGB pixels, indexed by `((row, column), RGB)`.
#[derive(Clone)]
pub struct PixelArray(pub Array<(Grid, RGB), u8>);

impl PixelArray {
    /// Wraps `raw`, which must hold `height * width * 3` interleaved channel
    /// values in row-major order.
    pub fn from_raw(size: Grid, raw: impl Into<Box<[u8]>>) -> Self {
        let raw: Box<[u8]> = raw.into();
        Self(Array::new((size, ()), raw))
    }

    /// Constructs a `PixelArray` of the given size by calling `f` for every
    /// pixel.
    pub fn from_fn(size: Grid, f: impl Fn(Grid) -> Colour) -> Self {
        Self(<(Grid, RGB)>::all((size, ())).map(|(yx, c)| f(yx)[c as usize]).collect())
    }

    /// Returns the size of the image as `(height, width)`.
    pub fn dimensions(&self) -> Grid { self.0.size().0 }

    /// Returns the colour of the pixel at `yx`.
    pub fn pixel(&self, yx: Grid) -> Colour {
        [self.0[(yx, RGB::Red)], self.0[(yx, RGB::Green)], self.0[(yx, RGB::Blue)]]
    }

    /// Copies the region covered by `bbox`.
    pub fn crop(&self, bbox: BBox) -> Self {
        let (top, left) = (bbox.top, bbox.left);
        Self(<(Grid, RGB)>::all((bbox.size(), ())).map(
            |((y, x), c)| ((y + top, x + left), c)
        ).compose(&self.0).collect())
    }

    /// Paints every pixel covered by `bbox` with `colour`.
    pub fn fill(&mut self, bbox: BBox, colour: Colour) {
        for y in bbox.top..bbox.bottom {
            for x in bbox.left..bbox.right {
                RGB::each((), |c| { self.0[((y, x), c)] = colour[c as usize]; });
            }
        }
    }

    /// Calls `f` for every pixel, in row-major order.
    pub fn each_pixel(&self, mut f: impl FnMut(Colour)) {
        let (height, width) = self.dimensions();
        for y in 0..height {
            for x in 0..width {
                f(self.pixel((y, x)));
            }
        }
    }

    /// Returns the interleaved channel values in row-major order.
    pub fn into_raw(self) -> Box<[u8]> { self.0.to_raw().into() }
}

// ----------------------------------------------------------------------------
