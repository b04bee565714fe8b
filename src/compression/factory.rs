//! Factory for creating compression handlers

use log::debug;

use crate::tiff::constants::compression;
use crate::tiff::errors::{RawError, RawResult};
use crate::utils::tag_utils;
use super::handler::CompressionHandler;
use super::ljpeg::LJpegDecompressor;
use super::olympus::OlympusDecompressor;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a decompressor for a translated compression code
    ///
    /// `width` and `height` are the mosaic dimensions from the directory;
    /// decoders that read their geometry from the stream ignore them.
    pub fn create_handler(code: u32, width: usize, height: usize) -> RawResult<Box<dyn CompressionHandler>> {
        debug!("Selecting decompressor for {} ({})", code, tag_utils::get_compression_name(code));
        match code {
            compression::LJPEG => Ok(Box::new(LJpegDecompressor::new())),
            compression::OLYMPUS => Ok(Box::new(OlympusDecompressor::new(width, height))),
            _ => Err(RawError::UnsupportedCompression(code)),
        }
    }

    /// Whether a decompressor exists for `code`
    pub fn is_supported(code: u32) -> bool {
        matches!(code, compression::LJPEG | compression::OLYMPUS)
    }
}
