//! Decoded RAW pixel buffer

use std::fmt;

use crate::compression::DecodedImage;
use crate::raw::cfa::CfaPattern;
use crate::utils::tag_utils;

/// Kind of payload held by a [`RawData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    None,
    /// Uncompressed sensor mosaic
    Cfa,
    /// Sensor mosaic still in its vendor compression
    CompressedCfa,
    /// 8-bit interleaved RGB
    Pixmap8Rgb,
    /// JPEG stream
    Jpeg,
}

/// Placement of independently compressed tiles or strips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayout {
    pub tile_width: u32,
    pub tile_height: u32,
    /// Length of each tile's bytes, in storage order
    pub byte_counts: Vec<u32>,
}

/// Pixel buffer and the metadata needed to interpret it
#[derive(Debug, Clone, Default)]
pub struct RawData {
    pub width: u32,
    pub height: u32,
    /// Bits per component as stored in `bytes`
    pub bpc: u16,
    pub data_type: DataType,
    /// Compression code, after vendor translation
    pub compression: u32,
    pub cfa_pattern: CfaPattern,
    pub photometric_interpretation: u32,
    pub white_level: u16,
    /// Canon slice description: count, slice width, last slice width
    pub slices: Vec<u16>,
    /// Set when `bytes` holds several independently compressed tiles
    pub tiles: Option<TileLayout>,
    pub bytes: Vec<u8>,
}

impl RawData {
    /// Bytes used by one stored sample
    pub fn bytes_per_sample(&self) -> usize {
        (self.bpc as usize + 7) / 8
    }

    /// Replaces the payload with 16-bit samples
    pub fn set_samples(&mut self, samples: &[u16]) {
        self.bytes = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    }

    /// Replaces the payload with a decoded sample grid
    pub fn set_decoded(&mut self, image: DecodedImage) {
        self.width = image.width as u32;
        self.height = image.height as u32;
        self.bpc = 16;
        self.white_level = ((1u32 << image.bits_per_sample) - 1) as u16;
        self.data_type = DataType::Cfa;
        self.tiles = None;
        self.bytes = image.to_le_bytes();
    }

    /// Whether `bytes` holds one 16-bit word per sample
    pub fn is_16_bit_grid(&self) -> bool {
        self.bytes.len() as u64 == self.width as u64 * self.height as u64 * 2
    }

    /// Samples as 16-bit values
    ///
    /// Only available for `Cfa` data stored as one little-endian word per
    /// sample.
    pub fn samples_u16(&self) -> Option<Vec<u16>> {
        if self.data_type != DataType::Cfa || !self.is_16_bit_grid() {
            return None;
        }
        Some(
            self.bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
        )
    }
}

impl fmt::Display for RawData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Raw data:")?;
        writeln!(f, "  Type: {:?}", self.data_type)?;
        writeln!(f, "  Dimensions: {}x{}", self.width, self.height)?;
        writeln!(f, "  Bits per component: {}", self.bpc)?;
        writeln!(
            f,
            "  Compression: {} ({})",
            self.compression,
            tag_utils::get_compression_name(self.compression)
        )?;
        writeln!(f, "  CFA pattern: {}", self.cfa_pattern)?;
        writeln!(f, "  White level: {}", self.white_level)?;
        if !self.slices.is_empty() {
            writeln!(f, "  Slices: {:?}", self.slices)?;
        }
        writeln!(f, "  Size: {} bytes", self.bytes.len())
    }
}
