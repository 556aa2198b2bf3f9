//! Fixed palettes that block colours can be snapped to.
//!
//! A palette is identified by a bit depth. Where the palettes come from is up
//! to a [`PaletteSource`]: [`Builtin`] generates them, [`PaletteDir`] reads
//! them from files.

use std::path::{PathBuf};

use log::{debug};

use super::{Error, Result, Colour};

/// The supported palette bit depths.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum PaletteBits {
    /// 1 bit per channel: 8 colours.
    Three,

    /// 3 bits of red, 3 of green and 2 of blue: 256 colours.
    Eight,

    /// 3 bits per channel: 512 colours.
    Nine,

    /// No palette. Block colours are used as computed.
    #[default]
    TrueColour,
}

impl PaletteBits {
    pub const ALL: [Self; 4] = [Self::Three, Self::Eight, Self::Nine, Self::TrueColour];

    /// The number of bits.
    pub fn bits(self) -> u32 {
        match self {
            Self::Three => 3,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::TrueColour => 24,
        }
    }

    /// The number of bits given to each of red, green and blue, or `None` for
    /// [`PaletteBits::TrueColour`].
    fn channel_bits(self) -> Option<[u32; 3]> {
        match self {
            Self::Three => Some([1, 1, 1]),
            Self::Eight => Some([3, 3, 2]),
            Self::Nine => Some([3, 3, 3]),
            Self::TrueColour => None,
        }
    }
}

impl TryFrom<u32> for PaletteBits {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        Self::ALL.into_iter().find(|b| b.bits() == bits).ok_or_else(
            || Error::InvalidArgument(format!("unsupported palette depth: {} bits (expected 3, 8, 9 or 24)", bits))
        )
    }
}

impl std::fmt::Display for PaletteBits {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// ----------------------------------------------------------------------------

/// A non-empty, ordered list of colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Box<[Colour]>);

impl Palette {
    pub fn new(entries: impl Into<Box<[Colour]>>) -> Result<Self> {
        let entries = entries.into();
        if entries.is_empty() {
            return Err(Error::InvalidArgument("a palette needs at least one colour".into()));
        }
        Ok(Self(entries))
    }

    /// Parses a palette file: consecutive RGB triples, one byte per channel.
    pub fn from_bytes(bits: PaletteBits, bytes: &[u8]) -> Result<Self> {
        let fail = |reason: String| Error::ResourceLoad {bits: bits.bits(), reason};
        if bytes.is_empty() {
            return Err(fail("the palette is empty".into()));
        }
        if bytes.len() % 3 != 0 {
            return Err(fail(format!("{} bytes is not a whole number of RGB triples", bytes.len())));
        }
        Ok(Self(bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()))
    }

    /// Encodes the palette in the format read by [`Palette::from_bytes()`].
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flatten().copied().collect()
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn iter(&self) -> std::slice::Iter<'_, Colour> { self.0.iter() }
}

impl std::ops::Deref for Palette {
    type Target = [Colour];
    fn deref(&self) -> &Self::Target { &self.0 }
}

// ----------------------------------------------------------------------------

/// Supplies the palette for a bit depth.
pub trait PaletteSource {
    /// Returns the palette for `bits`, which is never
    /// [`PaletteBits::TrueColour`].
    fn load(&self, bits: PaletteBits) -> Result<Palette>;
}

/// Returns the palette required by `bits`, or `None` if `bits` asks for no
/// palette.
pub fn resolve(source: &dyn PaletteSource, bits: PaletteBits) -> Result<Option<Palette>> {
    if bits == PaletteBits::TrueColour { return Ok(None); }
    let palette = source.load(bits)?;
    debug!("Loaded the {}-bit palette ({} colours)", bits, palette.len());
    Ok(Some(palette))
}

// ----------------------------------------------------------------------------

/// Generates evenly spaced palettes.
///
/// A channel with `k` bits takes the levels `round(i * 255 / (2^k - 1))`.
/// Entries are ordered by red, then green, then blue.
#[derive(Debug, Default, Copy, Clone)]
pub struct Builtin;

fn levels(bits: u32) -> Vec<u8> {
    let top = (1u32 << bits) - 1;
    (0..=top).map(|i| ((i * 255 + top / 2) / top) as u8).collect()
}

impl PaletteSource for Builtin {
    fn load(&self, bits: PaletteBits) -> Result<Palette> {
        let [r, g, b] = bits.channel_bits().ok_or_else(|| Error::ResourceLoad {
            bits: bits.bits(),
            reason: "true colour has no palette".into(),
        })?.map(levels);
        let mut entries = Vec::with_capacity(r.len() * g.len() * b.len());
        for &red in &r {
            for &green in &g {
                for &blue in &b {
                    entries.push([red, green, blue]);
                }
            }
        }
        Palette::new(entries)
    }
}

// ----------------------------------------------------------------------------

/// Reads palettes from files named `<bits>bit.palette` in a directory.
#[derive(Debug, Clone)]
pub struct PaletteDir(pub PathBuf);

impl PaletteDir {
    /// The path of the file holding the palette for `bits`.
    pub fn path(&self, bits: PaletteBits) -> PathBuf {
        self.0.join(format!("{}bit.palette", bits))
    }
}

impl PaletteSource for PaletteDir {
    fn load(&self, bits: PaletteBits) -> Result<Palette> {
        let path = self.path(bits);
        let bytes = std::fs::read(&path).map_err(|e| Error::ResourceLoad {
            bits: bits.bits(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        Palette::from_bytes(bits, &bytes)
    }
}

// ----------------------------------------------------------------------------
