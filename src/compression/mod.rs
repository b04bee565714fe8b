//! Decompressors for RAW pixel data
//!
//! This module implements strategies for the compression methods found in
//! camera RAW files.

mod handler;
mod factory;
pub mod bit_reader;
pub mod ljpeg;
pub mod olympus;

pub use handler::{CompressionHandler, DecodedImage};
pub use factory::CompressionFactory;
pub use ljpeg::LJpegDecompressor;
pub use olympus::OlympusDecompressor;
