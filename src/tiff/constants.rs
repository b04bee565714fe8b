//! TIFF and RAW format constants
//!
//! This module defines constants used throughout the container and decoding
//! code, replacing magic numbers with descriptive names.

/// Container header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// "II*\0" little-endian TIFF header
    pub const TIFF_LITTLE_ENDIAN: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];

    /// "MM\0*" big-endian TIFF header
    pub const TIFF_BIG_ENDIAN: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A];

    /// "IIRO" Olympus ORF header, 16 bits per sample
    pub const ORF_LITTLE_ENDIAN_RO: [u8; 4] = [0x49, 0x49, 0x52, 0x4F];

    /// "IIRS" Olympus ORF header, 12 bits per sample
    pub const ORF_LITTLE_ENDIAN_RS: [u8; 4] = [0x49, 0x49, 0x52, 0x53];

    /// "MMOR" big-endian Olympus ORF header
    pub const ORF_BIG_ENDIAN: [u8; 4] = [0x4D, 0x4D, 0x4F, 0x52];

    /// "IIU\0" Panasonic RW2 header
    pub const RW2_LITTLE_ENDIAN: [u8; 4] = [0x49, 0x49, 0x55, 0x00];

    /// Size of the header preceding the first directory offset
    pub const MAGIC_SIZE: usize = 4;
}

/// Field types as defined in the TIFF spec
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
    pub const IFD: u16 = 13;       // 32-bit directory offset
}

/// Directory layout
pub mod layout {
    /// Size of the entry count field
    pub const ENTRY_COUNT_SIZE: u64 = 2;

    /// Size of one directory entry record
    pub const ENTRY_SIZE: u64 = 12;

    /// Size of the next-directory link
    pub const NEXT_OFFSET_SIZE: u64 = 4;

    /// Bytes available for an inline value
    pub const INLINE_VALUE_SIZE: u64 = 4;

    /// Entry counts above this are treated as corruption
    pub const MAX_ENTRY_COUNT: u16 = 1000;

    /// Upper bound on the length of a directory chain
    pub const MAX_CHAIN_LENGTH: usize = 64;
}

/// Standard TIFF, TIFF-EP and EXIF tags
pub mod tags {
    pub const NEW_SUBFILE_TYPE: u16 = 254;         // Subfile data descriptor
    pub const IMAGE_WIDTH: u16 = 256;              // Width of the image in pixels
    pub const IMAGE_LENGTH: u16 = 257;             // Height of the image in pixels
    pub const BITS_PER_SAMPLE: u16 = 258;          // Bits per component
    pub const COMPRESSION: u16 = 259;              // Compression scheme
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 262; // Color space of image data
    pub const MAKE: u16 = 271;                     // Camera manufacturer
    pub const MODEL: u16 = 272;                    // Camera model
    pub const STRIP_OFFSETS: u16 = 273;            // Offsets to the data strips
    pub const ORIENTATION: u16 = 274;              // Image orientation
    pub const SAMPLES_PER_PIXEL: u16 = 277;        // Number of components per pixel
    pub const ROWS_PER_STRIP: u16 = 278;           // Rows per strip of data
    pub const STRIP_BYTE_COUNTS: u16 = 279;        // Bytes counts for strips
    pub const SOFTWARE: u16 = 305;                 // Software used to create the image
    pub const DATE_TIME: u16 = 306;                // Date and time of image creation
    pub const TILE_WIDTH: u16 = 322;               // Width of a tile
    pub const TILE_LENGTH: u16 = 323;              // Length of a tile
    pub const TILE_OFFSETS: u16 = 324;             // Offsets to the data tiles
    pub const TILE_BYTE_COUNTS: u16 = 325;         // Byte counts for tiles
    pub const SUB_IFDS: u16 = 330;                 // Offsets of child directories
    pub const JPEG_INTERCHANGE_FORMAT: u16 = 513;  // Offset of an embedded JPEG
    pub const JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 514; // Length of an embedded JPEG

    pub const CFA_REPEAT_PATTERN_DIM: u16 = 33421; // TIFF-EP CFA pattern dimensions
    pub const CFA_PATTERN: u16 = 33422;            // TIFF-EP CFA pattern
    pub const EXIF_IFD: u16 = 34665;               // Offset of the EXIF directory
    pub const MAKER_NOTE: u16 = 37500;             // Vendor private data
    pub const EXIF_CFA_PATTERN: u16 = 41730;       // EXIF CFA pattern structure

    pub const CR2_SLICE: u16 = 50752;              // Canon slice layout
    pub const DNG_VERSION: u16 = 50706;            // DNG version
}

/// Panasonic RW2 private tags, stored in the main directory
pub mod rw2_tags {
    pub const SENSOR_WIDTH: u16 = 0x0002;
    pub const SENSOR_HEIGHT: u16 = 0x0003;
    pub const RAW_DATA_OFFSET: u16 = 0x0118;
}

/// Compression types
///
/// Codes above `u16::MAX` are internal, produced by per-vendor translation.
pub mod compression {
    pub const NONE: u32 = 1;              // No compression
    pub const JPEG_OLD: u32 = 6;          // Old-style JPEG, lossless in CR2
    pub const LJPEG: u32 = 7;             // JPEG, lossless in DNG
    pub const ARW: u32 = 32767;           // Sony ARW compression
    pub const EPSON_ERF: u32 = 32769;     // Epson ERF compression
    pub const NIKON_PACK: u32 = 32769;    // Nikon packed data
    pub const PANASONIC: u32 = 34316;     // Panasonic RW2 compression
    pub const NIKON_QUANTIZED: u32 = 34713; // Nikon quantized Huffman
    pub const CUSTOM: u32 = 65535;        // Vendor custom, Pentax and Olympus
    pub const OLYMPUS: u32 = 0x10000;     // Internal: Olympus ORF bit-unpacking
}

/// Photometric interpretation values
pub mod photometric {
    pub const BLACK_IS_ZERO: u32 = 1;     // Minimum value is black
    pub const RGB: u32 = 2;               // RGB color model
    pub const YCBCR: u32 = 6;             // YCbCr color model
    pub const CFA: u32 = 32803;           // Color filter array
    pub const LINEAR_RAW: u32 = 34892;    // DNG linear raw
}

/// Subfile type bit flags
pub mod new_subfile_type {
    pub const REDUCED_RESOLUTION: u32 = 1; // Reduced resolution version of another image
}
