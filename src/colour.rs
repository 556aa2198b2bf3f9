use colcon::{Space};
use log::{debug};

use super::{Colour};
use super::io::{PixelArray};
use super::palette::{Palette};

/// Selects how the difference between two colours is measured.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum ColourSpace {
    /// Squared Euclidean distance between the 8-bit sRGB channel values.
    #[default]
    Rgb,

    /// Squared Euclidean distance in CIE L*a*b* (D65), i.e. CIE76 ΔE
    /// without the square root.
    Lab,
}

impl ColourSpace {
    /// Maps a colour with channels on the `0..=255` scale to the coordinates
    /// in which this colour space measures distance.
    pub fn coords(self, colour: [f64; 3]) -> [f64; 3] {
        match self {
            ColourSpace::Rgb => colour,
            ColourSpace::Lab => {
                let mut pixel = colour.map(|x| (x / 255.0) as f32);
                colcon::convert_space(Space::SRGB, Space::LAB, &mut pixel);
                pixel.map(f64::from)
            },
        }
    }

    /// The difference between `a` and `b`. Only the ordering of the results
    /// is meaningful.
    pub fn diff(self, a: [f64; 3], b: [f64; 3]) -> f64 {
        distance(self.coords(a), self.coords(b))
    }
}

/// Squared L2 norm of `a - b`.
fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter().zip(&b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn widen(colour: Colour) -> [f64; 3] { colour.map(f64::from) }

// ----------------------------------------------------------------------------

/// Computes the mean of each channel over all pixels of `block`.
///
/// The channels are summed exactly as integers and divided once at the end.
pub fn mean_colour(block: &PixelArray) -> [f64; 3] {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    block.each_pixel(|pixel| {
        for (s, x) in sum.iter_mut().zip(pixel) { *s += u64::from(x); }
        count += 1;
    });
    if count == 0 { return [0.0; 3]; }
    sum.map(|s| s as f64 / count as f64)
}

// ----------------------------------------------------------------------------

/// Chooses one representative colour per block.
///
/// Without a palette the block's mean colour is rounded to the nearest
/// integer. With a palette, the entry closest to the mean is chosen; on a tie
/// the earliest entry wins.
#[derive(Debug, Clone)]
pub struct Reducer {
    space: ColourSpace,
    palette: Option<Palette>,

    /// `palette` mapped through `space.coords()`.
    coords: Box<[[f64; 3]]>,
}

impl Reducer {
    pub fn new(space: ColourSpace, palette: Option<Palette>) -> Self {
        let coords = palette.iter()
            .flat_map(|palette| palette.iter())
            .map(|&entry| space.coords(widen(entry)))
            .collect();
        if let Some(palette) = &palette {
            debug!("Snapping blocks to {} palette entries ({:?} metric)", palette.len(), space);
        }
        Self {space, palette, coords}
    }

    pub fn space(&self) -> ColourSpace { self.space }

    pub fn palette(&self) -> Option<&Palette> { self.palette.as_ref() }

    /// Returns the representative colour of `block`.
    pub fn reduce(&self, block: &PixelArray) -> Colour {
        self.snap(mean_colour(block))
    }

    /// Returns the output colour for a block whose mean colour is `mean`.
    pub fn snap(&self, mean: [f64; 3]) -> Colour {
        match &self.palette {
            None => mean.map(|x| x.round().clamp(0.0, 255.0) as u8),
            Some(palette) => palette[self.nearest(mean)],
        }
    }

    /// Returns the index of the palette entry closest to `mean`.
    fn nearest(&self, mean: [f64; 3]) -> usize {
        let target = self.space.coords(mean);
        let mut best = 0;
        let mut best_diff = f64::INFINITY;
        for (i, &entry) in self.coords.iter().enumerate() {
            let diff = distance(entry, target);
            if diff < best_diff {
                best = i;
                best_diff = diff;
            }
        }
        best
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{PaletteBits, Builtin, PaletteSource};

    fn solid(colour: Colour) -> PixelArray {
        PixelArray::from_fn((4, 4), |_| colour)
    }

    fn palette(entries: &[Colour]) -> Palette {
        Palette::new(entries.to_vec()).unwrap()
    }

    #[test]
    fn mean() {
        let block = PixelArray::from_fn((2, 2), |(y, x)| [(100 * y + 50 * x) as u8, 7, 255]);
        let mean = mean_colour(&block);
        assert!((mean[0] - 75.0).abs() < 1e-9);
        assert!((mean[1] - 7.0).abs() < 1e-9);
        assert!((mean[2] - 255.0).abs() < 1e-9);
    }

    #[test]
    fn rounds_mean() {
        let block = PixelArray::from_fn((1, 4), |(_, x)| if x == 0 { [1, 0, 10] } else { [0, 0, 10] });
        let reducer = Reducer::new(ColourSpace::Rgb, None);
        // Means are (0.25, 0, 10).
        assert_eq!(reducer.reduce(&block), [0, 0, 10]);
        let block = PixelArray::from_fn((1, 4), |(_, x)| if x < 3 { [3, 200, 0] } else { [0, 201, 0] });
        // Means are (2.25, 200.25, 0).
        assert_eq!(reducer.reduce(&block), [2, 200, 0]);
    }

    #[test]
    fn rgb_metric() {
        assert_eq!(ColourSpace::Rgb.diff([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]), 14.0);
        assert_eq!(ColourSpace::Rgb.diff([9.0, 9.0, 9.0], [9.0, 9.0, 9.0]), 0.0);
    }

    #[test]
    fn lab_metric() {
        let black = [0.0, 0.0, 0.0];
        let white = [255.0, 255.0, 255.0];
        let grey = [128.0, 128.0, 128.0];
        assert!(ColourSpace::Lab.diff(white, white) < 1e-6);
        assert!(ColourSpace::Lab.diff(black, grey) < ColourSpace::Lab.diff(black, white));
        let l = ColourSpace::Lab.coords(white)[0];
        assert!(l > ColourSpace::Lab.coords(grey)[0]);
    }

    #[test]
    fn lab_reference() {
        let close = |colour: [f64; 3], expected: [f64; 3]| {
            let lab = ColourSpace::Lab.coords(colour);
            assert!(lab.iter().zip(&expected).all(|(a, b)| (a - b).abs() < 0.5), "{:?} -> {:?}", colour, lab);
        };
        close([255.0, 0.0, 0.0], [53.24, 80.09, 67.20]);
        close([0.0, 255.0, 0.0], [87.74, -86.18, 83.18]);
        close([255.0, 255.0, 255.0], [100.0, 0.0, 0.0]);
        close([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn snaps_to_nearest() {
        let entries = palette(&[[0, 0, 0], [255, 255, 255], [200, 0, 0]]);
        let reducer = Reducer::new(ColourSpace::Rgb, Some(entries));
        assert_eq!(reducer.reduce(&solid([180, 20, 10])), [200, 0, 0]);
        assert_eq!(reducer.reduce(&solid([30, 30, 30])), [0, 0, 0]);
        assert_eq!(reducer.reduce(&solid([230, 230, 240])), [255, 255, 255]);
    }

    #[test]
    fn earliest_entry_wins_ties() {
        // Both entries are at distance 100 from (10, 10, 10).
        let first = palette(&[[20, 10, 10], [10, 0, 10], [10, 10, 0]]);
        let reducer = Reducer::new(ColourSpace::Rgb, Some(first));
        assert_eq!(reducer.reduce(&solid([10, 10, 10])), [20, 10, 10]);

        let second = palette(&[[50, 50, 50], [10, 0, 10], [10, 10, 0]]);
        let reducer = Reducer::new(ColourSpace::Rgb, Some(second));
        assert_eq!(reducer.reduce(&solid([10, 10, 10])), [10, 0, 10]);
    }

    #[test]
    fn deterministic() {
        let palette = Builtin.load(PaletteBits::Nine).unwrap();
        let block = PixelArray::from_fn((3, 5), |(y, x)| [(y * 40) as u8, (x * 30) as u8, 77]);
        for space in [ColourSpace::Rgb, ColourSpace::Lab] {
            let reducer = Reducer::new(space, Some(palette.clone()));
            let first = reducer.reduce(&block);
            for _ in 0..10 { assert_eq!(reducer.reduce(&block), first); }
        }
    }

    #[test]
    fn eight_bit_entry() {
        let palette = Builtin.load(PaletteBits::Eight).unwrap();
        assert_eq!(palette[3], [0, 0, 255]);
        let reducer = Reducer::new(ColourSpace::Rgb, Some(palette));
        assert_eq!(reducer.reduce(&solid([0, 0, 250])), [0, 0, 255]);
    }

    #[test]
    fn metrics_diverge() {
        let entries = palette(&[[100, 50, 200], [255, 200, 200]]);
        let block = solid([100, 100, 100]);
        let rgb = Reducer::new(ColourSpace::Rgb, Some(entries.clone()));
        let lab = Reducer::new(ColourSpace::Lab, Some(entries));
        assert_eq!(rgb.reduce(&block), [100, 50, 200]);
        assert_eq!(lab.reduce(&block), [255, 200, 200]);
    }
}
