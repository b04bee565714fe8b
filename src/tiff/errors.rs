//! Error types for RAW container parsing and pixel decoding

use std::io;
use thiserror::Error;

/// RAW decoding error types
#[derive(Debug, Error)]
pub enum RawError {
    /// I/O error from the byte source
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// The stream ended before the expected number of bytes
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// A scalar read was attempted before the byte order was known
    #[error("Byte order not yet determined")]
    EndianUndetermined,

    /// The magic header does not match the container dialect
    #[error("Invalid magic header: {0:02x?}")]
    InvalidMagic(Vec<u8>),

    /// Malformed directory table
    #[error("Structural corruption: {0}")]
    StructuralCorruption(String),

    /// Required tag not present
    #[error("Tag not found: {0}")]
    TagNotFound(u16),

    /// Tag present but its value could not be coerced to the requested type
    #[error("Type mismatch for tag {tag}: expected {expected}, found field type {found}")]
    TypeMismatch { tag: u16, expected: &'static str, found: u16 },

    /// Value index beyond the entry's count
    #[error("Value index {index} out of range for tag {tag} with {count} values")]
    ValueOutOfRange { tag: u16, index: usize, count: u32 },

    /// Something the format requires could not be located
    #[error("Not found: {0}")]
    NotFound(String),

    /// The JPEG marker stream violates the expected grammar
    #[error("Marker sequence error: {0}")]
    MarkerSequence(String),

    /// A Huffman code or table could not be decoded
    #[error("Huffman decode error: {0}")]
    HuffmanDecode(String),

    /// The entropy-coded data ended in the middle of the image
    #[error("Truncated data: {0}")]
    Truncated(String),

    /// Recognized compression scheme without a decoder
    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u32),

    /// Valid but unsupported stream feature
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// No driver for the requested file type
    #[error("Unknown RAW file type: {0}")]
    UnknownFileType(String),

    /// Output image could not be encoded
    #[error("Image output error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Bad command line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for RAW operations
pub type RawResult<T> = Result<T, RawError>;

