//! Tag utilities
//!
//! Human-readable names for tags, field types and code values, used by
//! logging and the analyze command.

use crate::tiff::constants::{compression, field_types, photometric, tags};

/// Get the name of a tag
///
/// Returns a human-readable name for a tag based on its numeric ID.
/// If the tag is not recognized, returns "Unknown".
///
/// # Arguments
/// * `tag` - The tag ID to look up
///
/// # Returns
/// A string representing the tag name
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        // Basic image structure tags
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::ORIENTATION => "Orientation",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",

        // Descriptive tags
        tags::MAKE => "Make",
        tags::MODEL => "Model",
        tags::SOFTWARE => "Software",
        tags::DATE_TIME => "DateTime",

        // Tiling tags
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",

        // Tree and thumbnail tags
        tags::SUB_IFDS => "SubIFDs",
        tags::JPEG_INTERCHANGE_FORMAT => "JPEGInterchangeFormat",
        tags::JPEG_INTERCHANGE_FORMAT_LENGTH => "JPEGInterchangeFormatLength",
        tags::EXIF_IFD => "ExifIFD",
        tags::MAKER_NOTE => "MakerNote",

        // TIFF-EP and EXIF CFA tags
        tags::CFA_REPEAT_PATTERN_DIM => "CFARepeatPatternDim",
        tags::CFA_PATTERN => "CFAPattern",
        tags::EXIF_CFA_PATTERN => "ExifCFAPattern",

        // Vendor tags
        tags::CR2_SLICE => "CR2Slice",
        tags::DNG_VERSION => "DNGVersion",

        // Default for unknown tags
        _ => "Unknown",
    }
}

/// Get the name of a field type
///
/// # Arguments
/// * `field_type` - The field type ID to look up
///
/// # Returns
/// A string representing the field type name
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::IFD => "IFD",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
///
/// Vendor codes that share a value are reported under a combined name.
pub fn get_compression_name(compression_code: u32) -> &'static str {
    match compression_code {
        compression::NONE => "None",
        compression::JPEG_OLD => "Old JPEG",
        compression::LJPEG => "Lossless JPEG",
        compression::ARW => "Sony ARW",
        compression::NIKON_PACK => "Nikon packed / Epson ERF",
        compression::PANASONIC => "Panasonic RW2",
        compression::NIKON_QUANTIZED => "Nikon quantized",
        compression::CUSTOM => "Vendor custom",
        compression::OLYMPUS => "Olympus",
        _ => "Unknown",
    }
}

/// Get the name of a photometric interpretation method
pub fn get_photometric_name(photometric_code: u32) -> &'static str {
    match photometric_code {
        photometric::BLACK_IS_ZERO => "BlackIsZero",
        photometric::RGB => "RGB",
        photometric::YCBCR => "YCbCr",
        photometric::CFA => "CFA",
        photometric::LINEAR_RAW => "LinearRaw",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_known_codes() {
        assert_eq!(get_tag_name(tags::CFA_PATTERN), "CFAPattern");
        assert_eq!(get_tag_name(0xFFFF), "Unknown");
        assert_eq!(get_field_type_name(field_types::SRATIONAL), "SRATIONAL");
        assert_eq!(get_compression_name(compression::EPSON_ERF), "Nikon packed / Epson ERF");
        assert_eq!(get_photometric_name(photometric::CFA), "CFA");
    }
}
