use super::{Error, Result, Grid};
use super::io::{PixelArray};

/// Finds the side length of a block along an image dimension of length `dim`.
///
/// Candidate lengths are scanned upward from `1`, and the `granularity`-th one
/// that divides `dim` is returned. `1` counts as the first divisor, so
/// `granularity == 1` gives single-pixel blocks. Asking for more divisors than
/// `dim` has is not an error: the result saturates at `dim` itself.
pub fn find_block_dim(dim: usize, granularity: usize) -> Result<usize> {
    if dim == 0 {
        return Err(Error::InvalidArgument("image dimensions must be positive".into()));
    }
    if granularity == 0 {
        return Err(Error::InvalidArgument("granularity must be at least 1".into()));
    }
    let block_dim = (1..=dim)
        .filter(|candidate| dim % candidate == 0)
        .nth(granularity - 1)
        .unwrap_or(dim);
    debug_assert_eq!(dim % block_dim, 0);
    Ok(block_dim)
}

// ----------------------------------------------------------------------------

/// An axis-aligned rectangle of pixels. `right` and `bottom` are exclusive.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct BBox {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl BBox {
    /// Returns the size of the rectangle as `(height, width)`.
    pub fn size(&self) -> Grid { (self.bottom - self.top, self.right - self.left) }

    /// Tests whether the pixel at `yx` is inside the rectangle.
    pub fn contains(&self, yx: Grid) -> bool {
        (self.top..self.bottom).contains(&yx.0) && (self.left..self.right).contains(&yx.1)
    }
}

// ----------------------------------------------------------------------------

/// Divides an image into equal blocks, numbered in row-major order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockGrid {
    /// The size of every block, in pixels.
    pub block: Grid,

    /// The number of blocks in each direction.
    pub cells: Grid,
}

impl BlockGrid {
    /// Constructs a `BlockGrid` for an image of the given `(height, width)`,
    /// using blocks of size `block`. Each side of `block` must divide the
    /// corresponding side of the image.
    pub fn new(image: Grid, block: Grid) -> Result<Self> {
        let (height, width) = image;
        let (block_height, block_width) = block;
        if block_height == 0 || block_width == 0 || height % block_height != 0 || width % block_width != 0 {
            return Err(Error::InvalidArgument(format!(
                "{}x{} blocks do not tile a {}x{} image", block_width, block_height, width, height,
            )));
        }
        Ok(Self {block, cells: (height / block_height, width / block_width)})
    }

    /// Chooses block dimensions for an image of the given `(height, width)`
    /// at `granularity`, solving each axis independently.
    pub fn for_granularity(image: Grid, granularity: usize) -> Result<Self> {
        let block_height = find_block_dim(image.0, granularity)?;
        let block_width = find_block_dim(image.1, granularity)?;
        Self::new(image, (block_height, block_width))
    }

    /// The number of blocks.
    pub fn len(&self) -> usize { self.cells.0 * self.cells.1 }

    /// Returns `(row, column)` of block `n` within the grid.
    pub fn cell_at(&self, n: usize) -> Result<Grid> {
        if n >= self.len() {
            return Err(Error::OutOfRange {index: n, count: self.len()});
        }
        Ok((n / self.cells.1, n % self.cells.1))
    }

    /// Returns the pixels covered by block `n`.
    pub fn bbox_at(&self, n: usize) -> Result<BBox> {
        let (row, column) = self.cell_at(n)?;
        let (block_height, block_width) = self.block;
        let left = column * block_width;
        let top = row * block_height;
        Ok(BBox {left, top, right: left + block_width, bottom: top + block_height})
    }

    /// Copies the pixels of block `n` out of `image`.
    pub fn extract(&self, image: &PixelArray, n: usize) -> Result<PixelArray> {
        Ok(image.crop(self.bbox_at(n)?))
    }
}

// ----------------------------------------------------------------------------
