use std::collections::{HashMap, HashSet};

use color_quant::{NeuQuant};
use log::{debug};
use multidimension::{Index, View, Array};

use super::{Error, Result, Grid, Colour};
use super::io::{PixelArray};

/// The largest palette an [`Indexed`] image can have.
pub const MAX_COLOURS: usize = 256;

/// An image stored as a palette plus one palette index per pixel.
#[derive(Clone)]
pub struct Indexed {
    pub palette: Vec<Colour>,
    pub indices: Array<Grid, u8>,
}

impl Indexed {
    /// Returns the size of the image as `(height, width)`.
    pub fn dimensions(&self) -> Grid { self.indices.size() }

    /// Looks up the colour of the pixel at `yx`.
    pub fn pixel(&self, yx: Grid) -> Colour { self.palette[self.indices[yx] as usize] }

    /// Expands the palette indices back into colours.
    pub fn to_pixels(&self) -> PixelArray {
        PixelArray::from_fn(self.dimensions(), |yx| self.pixel(yx))
    }
}

// ----------------------------------------------------------------------------

/// NeuQuant sampling factor, from `1` (slowest, best) to `30`.
const SAMPLE_FACTOR: i32 = 10;

/// The smallest network that is trained. Smaller palettes are obtained by
/// merging its entries.
const MIN_NETWORK: usize = 16;

/// NeuQuant learns in 100 cycles over `pixels / SAMPLE_FACTOR` samples.
/// Below this there is less than one sample per cycle.
const MIN_TRAINING_PIXELS: usize = 100 * SAMPLE_FACTOR as usize;

/// Returns the distinct colours of `pixels` in sorted order, or `None` if
/// there are more than `limit`.
fn distinct_colours(pixels: &PixelArray, limit: usize) -> Option<Vec<Colour>> {
    let mut seen = HashSet::new();
    let (height, width) = pixels.dimensions();
    for y in 0..height {
        for x in 0..width {
            seen.insert(pixels.pixel((y, x)));
            if seen.len() > limit { return None; }
        }
    }
    let mut colours: Vec<Colour> = seen.into_iter().collect();
    colours.sort_unstable();
    Some(colours)
}

/// Returns the RGBA samples NeuQuant learns from. Small images are repeated
/// until there are at least `MIN_TRAINING_PIXELS`.
fn training_data(pixels: &PixelArray) -> Vec<u8> {
    let mut rgba = Vec::new();
    pixels.each_pixel(|[r, g, b]| rgba.extend_from_slice(&[r, g, b, 255]));
    let len = rgba.len();
    while rgba.len() < MIN_TRAINING_PIXELS * 4 {
        rgba.extend_from_within(..len);
    }
    rgba
}

/// Merges palette entries until at most `ncolours` remain, always joining
/// the closest pair. Entries with `usage == 0` are dropped first.
///
/// Returns the merged palette and, for each original entry, its index in it.
fn merge(palette: &[Colour], usage: &[u64], ncolours: usize) -> (Vec<Colour>, Vec<u8>) {
    // (usage-weighted mean, total usage, original entries)
    let mut groups: Vec<([f64; 3], u64, Vec<usize>)> = palette.iter().zip(usage)
        .enumerate()
        .filter(|(_, (_, &count))| count > 0)
        .map(|(i, (colour, &count))| (colour.map(f64::from), count, vec![i]))
        .collect();
    while groups.len() > ncolours {
        let mut best = (0, 1);
        let mut best_distance = f64::INFINITY;
        for i in 0..groups.len() {
            for j in i + 1..groups.len() {
                let d: f64 = groups[i].0.iter().zip(&groups[j].0).map(|(a, b)| (a - b) * (a - b)).sum();
                if d < best_distance {
                    best = (i, j);
                    best_distance = d;
                }
            }
        }
        let (mean, count, members) = groups.remove(best.1);
        let group = &mut groups[best.0];
        let total = (group.1 + count) as f64;
        for (a, b) in group.0.iter_mut().zip(mean) {
            *a = (*a * group.1 as f64 + b * count as f64) / total;
        }
        group.1 += count;
        group.2.extend(members);
    }
    let mut remap = vec![0u8; palette.len()];
    let merged = groups.iter().enumerate().map(|(i, (mean, _, members))| {
        for &m in members { remap[m] = i as u8; }
        mean.map(|x| x.round().clamp(0.0, 255.0) as u8)
    }).collect();
    (merged, remap)
}

/// Reduces `pixels` to at most `ncolours` colours (between 1 and 256).
///
/// If the image already has few enough colours they are kept exactly.
/// Otherwise an adaptive palette is learnt by NeuQuant.
pub fn quantize(pixels: &PixelArray, ncolours: usize) -> Result<Indexed> {
    if !(1..=MAX_COLOURS).contains(&ncolours) {
        return Err(Error::InvalidArgument(format!(
            "the number of colours must be between 1 and {}, not {}", MAX_COLOURS, ncolours,
        )));
    }
    if let Some(palette) = distinct_colours(pixels, ncolours) {
        debug!("Keeping all {} colours", palette.len());
        let lookup: HashMap<Colour, u8> = palette.iter().enumerate().map(|(i, &c)| (c, i as u8)).collect();
        let indices = Grid::all(pixels.dimensions()).map(|yx| lookup[&pixels.pixel(yx)]).collect();
        return Ok(Indexed {palette, indices});
    }

    let network = ncolours.max(MIN_NETWORK);
    debug!("Training a {}-colour network", network);
    let nq = NeuQuant::new(SAMPLE_FACTOR, network, &training_data(pixels));
    let learnt: Vec<Colour> = nq.color_map_rgb().chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
    let nearest: Array<Grid, usize> = Grid::all(pixels.dimensions()).map(|yx| {
        let [r, g, b] = pixels.pixel(yx);
        nq.index_of(&[r, g, b, 255])
    }).collect();
    let mut usage = vec![0u64; learnt.len()];
    (&nearest).each(|i| usage[i] += 1);

    let (palette, remap) = merge(&learnt, &usage, ncolours);
    let indices = nearest.map(|i| remap[i]).collect();
    Ok(Indexed {palette, indices})
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn distinct(pixels: &PixelArray) -> usize {
        let mut set = HashSet::new();
        pixels.each_pixel(|colour| { set.insert(colour); });
        set.len()
    }

    fn noise(size: Grid) -> PixelArray {
        PixelArray::from_fn(size, |(y, x)| {
            let h = (y * 7919 + x * 104729) ^ (x * y * 31);
            [h as u8, (h >> 8) as u8, (h >> 3) as u8]
        })
    }

    #[test]
    fn bad_counts() {
        let pixels = noise((2, 2));
        assert!(matches!(quantize(&pixels, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(quantize(&pixels, 257), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn few_colours_are_kept() {
        let pixels = PixelArray::from_fn((4, 4), |(y, _)| if y < 2 { [10, 20, 30] } else { [200, 0, 0] });
        let indexed = quantize(&pixels, 256).unwrap();
        assert_eq!(indexed.palette, vec![[10, 20, 30], [200, 0, 0]]);
        assert_eq!(indexed.to_pixels().into_raw(), pixels.into_raw());
    }

    #[test]
    fn bounded() {
        let pixels = noise((32, 32));
        assert!(distinct(&pixels) > 256);
        for ncolours in [1, 2, 3, 16, 100, 256] {
            let indexed = quantize(&pixels, ncolours).unwrap();
            assert!(indexed.palette.len() <= ncolours);
            assert_eq!(indexed.dimensions(), (32, 32));
            assert!(distinct(&indexed.to_pixels()) <= ncolours);
        }
    }

    #[test]
    fn single_colour() {
        let pixels = noise((8, 8));
        let indexed = quantize(&pixels, 1).unwrap();
        assert_eq!(indexed.palette.len(), 1);
        assert_eq!(distinct(&indexed.to_pixels()), 1);
    }

    #[test]
    fn separates_clusters() {
        let pixels = PixelArray::from_fn((10, 10), |(y, x)| {
            if x < 5 { [(y + x) as u8, 0, 0] } else { [250 - (y + x) as u8, 250, 250] }
        });
        let indexed = quantize(&pixels, 2).unwrap();
        assert_eq!(indexed.palette.len(), 2);
        assert_ne!(indexed.indices[(0, 0)], indexed.indices[(0, 9)]);
        assert_eq!(indexed.indices[(0, 0)], indexed.indices[(9, 4)]);
        assert_eq!(indexed.indices[(0, 5)], indexed.indices[(9, 9)]);
    }

    #[test]
    fn small_image() {
        let pixels = noise((3, 3));
        assert_eq!(distinct(&pixels), 9);
        let indexed = quantize(&pixels, 4).unwrap();
        assert!(indexed.palette.len() <= 4);
        assert!(distinct(&indexed.to_pixels()) <= 4);
    }

    #[test]
    fn merges_closest_entries() {
        let palette = [[0, 0, 0], [10, 0, 0], [255, 255, 255], [250, 250, 250], [99, 99, 99]];
        let usage = [1, 3, 2, 2, 0];
        let (merged, remap) = merge(&palette, &usage, 2);
        // The unused grey is dropped; each pair collapses to its weighted mean.
        assert_eq!(merged, vec![[8, 0, 0], [253, 253, 253]]);
        assert_eq!(&remap[..4], &[0, 0, 1, 1]);

        let (merged, _) = merge(&palette, &usage, 1);
        assert_eq!(merged.len(), 1);
        let (merged, remap) = merge(&palette, &usage, 16);
        assert_eq!(merged, palette[..4].to_vec());
        assert_eq!(&remap[..4], &[0, 1, 2, 3]);
    }

    #[test]
    fn deterministic() {
        let pixels = noise((16, 16));
        let a = quantize(&pixels, 12).unwrap();
        let b = quantize(&pixels, 12).unwrap();
        assert_eq!(a.palette, b.palette);
        assert_eq!(a.indices.to_raw(), b.indices.to_raw());
    }
}
