//! Colour filter array patterns

use std::fmt;

use log::debug;

use crate::io::byte_order::ByteOrderHandler;

/// 2x2 Bayer arrangement of the sensor colour filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfaPattern {
    /// Unknown or absent
    #[default]
    None,
    /// A 2x2 pattern that is not made of red, green and blue
    NonRgb22,
    Rggb,
    Gbrg,
    Bggr,
    Grbg,
}

// TIFF-EP colour codes
const RED: u8 = 0;
const GREEN: u8 = 1;
const BLUE: u8 = 2;

impl CfaPattern {
    /// Pattern from four colour codes in row-major order
    pub fn from_colors(colors: &[u8]) -> CfaPattern {
        match colors {
            [RED, GREEN, GREEN, BLUE] => CfaPattern::Rggb,
            [GREEN, BLUE, RED, GREEN] => CfaPattern::Gbrg,
            [BLUE, GREEN, GREEN, RED] => CfaPattern::Bggr,
            [GREEN, RED, BLUE, GREEN] => CfaPattern::Grbg,
            [_, _, _, _] => CfaPattern::NonRgb22,
            _ => CfaPattern::None,
        }
    }

    /// Pattern from the TIFF-EP `CFARepeatPatternDim` and `CFAPattern` tags
    pub fn from_tiff_ep(dims: &[u16], pattern: &[u8]) -> CfaPattern {
        if dims != [2, 2] {
            debug!("Unsupported CFA repeat dimensions {:?}", dims);
            return CfaPattern::None;
        }
        CfaPattern::from_colors(pattern)
    }

    /// Pattern from the EXIF `CFAPattern` structure
    ///
    /// The structure starts with the horizontal and vertical repeat counts.
    /// Some writers store them in the opposite byte order to the file, so
    /// both orders are tried.
    pub fn from_exif(data: &[u8], handler: &dyn ByteOrderHandler) -> CfaPattern {
        if data.len() < 8 {
            return CfaPattern::None;
        }
        let h = handler.read_u16(&mut &data[0..2]).unwrap_or(0);
        let v = handler.read_u16(&mut &data[2..4]).unwrap_or(0);
        let dims_ok = (h == 2 && v == 2) || (h.swap_bytes() == 2 && v.swap_bytes() == 2);
        if !dims_ok {
            debug!("Unsupported EXIF CFA repeat dimensions {}x{}", h, v);
            return CfaPattern::None;
        }
        CfaPattern::from_colors(&data[4..8])
    }

    /// Short name such as "RGGB"
    pub fn name(&self) -> &'static str {
        match self {
            CfaPattern::None => "none",
            CfaPattern::NonRgb22 => "non-RGB 2x2",
            CfaPattern::Rggb => "RGGB",
            CfaPattern::Gbrg => "GBRG",
            CfaPattern::Bggr => "BGGR",
            CfaPattern::Grbg => "GRBG",
        }
    }
}

impl fmt::Display for CfaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::{BigEndianHandler, LittleEndianHandler};

    #[test]
    fn tiff_ep_patterns() {
        assert_eq!(CfaPattern::from_tiff_ep(&[2, 2], &[0, 1, 1, 2]), CfaPattern::Rggb);
        assert_eq!(CfaPattern::from_tiff_ep(&[2, 2], &[1, 0, 2, 1]), CfaPattern::Grbg);
        assert_eq!(CfaPattern::from_tiff_ep(&[2, 2], &[3, 4, 5, 1]), CfaPattern::NonRgb22);
        assert_eq!(CfaPattern::from_tiff_ep(&[3, 3], &[0; 9]), CfaPattern::None);
    }

    #[test]
    fn exif_structure_in_either_order() {
        let le = [2, 0, 2, 0, 2, 1, 1, 0];
        assert_eq!(CfaPattern::from_exif(&le, &LittleEndianHandler), CfaPattern::Bggr);
        assert_eq!(CfaPattern::from_exif(&le, &BigEndianHandler), CfaPattern::Bggr);
        assert_eq!(CfaPattern::from_exif(&le[..6], &LittleEndianHandler), CfaPattern::None);
    }
}
