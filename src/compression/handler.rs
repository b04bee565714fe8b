//! Compression handler trait definition

use crate::tiff::errors::RawResult;

/// Sample grid produced by a decompressor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Samples per row, all components interleaved
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Significant bits per sample
    pub bits_per_sample: u8,
    /// Row-major samples, `width * height` of them
    pub samples: Vec<u16>,
}

impl DecodedImage {
    /// Samples serialised as little-endian 16-bit words
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.samples.len() * 2);
        for sample in &self.samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }
}

/// Strategy trait for handling different compression methods
pub trait CompressionHandler {
    /// Decompress the data
    fn decompress(&self, data: &[u8]) -> RawResult<DecodedImage>;

    /// Get the name of this compression method
    fn name(&self) -> &'static str;

    /// Get the compression code
    fn code(&self) -> u32;
}
