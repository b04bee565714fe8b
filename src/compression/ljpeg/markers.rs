//! JPEG marker codes and segment parsing

use byteorder::{BigEndian, ReadBytesExt};
use log::trace;

use crate::tiff::errors::{RawError, RawResult};

pub const SOF0: u8 = 0xC0;
pub const SOF3: u8 = 0xC3;
pub const DHT: u8 = 0xC4;
pub const JPG: u8 = 0xC8;
pub const DAC: u8 = 0xCC;
pub const SOF15: u8 = 0xCF;
pub const RST0: u8 = 0xD0;
pub const RST7: u8 = 0xD7;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const DQT: u8 = 0xDB;
pub const DNL: u8 = 0xDC;
pub const DRI: u8 = 0xDD;
pub const APP0: u8 = 0xE0;
pub const APP15: u8 = 0xEF;
pub const COM: u8 = 0xFE;

/// Whether `marker` starts a frame of any coding process
pub fn is_sof(marker: u8) -> bool {
    (SOF0..=SOF15).contains(&marker) && marker != DHT && marker != JPG && marker != DAC
}

/// Whether `marker` is a restart marker
pub fn is_rst(marker: u8) -> bool {
    (RST0..=RST7).contains(&marker)
}

/// Reads the marker at `pos`, skipping `FF` fill bytes
///
/// Advances `pos` past the marker code.
pub fn read_marker(data: &[u8], pos: &mut usize) -> RawResult<u8> {
    if data.get(*pos) != Some(&0xFF) {
        return Err(RawError::MarkerSequence(format!(
            "expected a marker at byte {}",
            *pos
        )));
    }
    while data.get(*pos) == Some(&0xFF) {
        *pos += 1;
    }
    match data.get(*pos) {
        Some(&code) if code != 0x00 => {
            *pos += 1;
            trace!("Marker {:#04x} at byte {}", code, *pos - 2);
            Ok(code)
        }
        Some(_) => Err(RawError::MarkerSequence(format!(
            "stuffed byte outside entropy data at {}",
            *pos
        ))),
        None => Err(RawError::Truncated("stream ends inside a marker".to_string())),
    }
}

/// Returns the payload of the segment at `pos` and advances past it
pub fn read_segment<'a>(data: &'a [u8], pos: &mut usize) -> RawResult<&'a [u8]> {
    let mut header = data.get(*pos..).unwrap_or(&[]);
    let length = header
        .read_u16::<BigEndian>()
        .map_err(|_| RawError::Truncated("stream ends inside a segment length".to_string()))?
        as usize;
    if length < 2 {
        return Err(RawError::MarkerSequence(format!("segment length {} too small", length)));
    }
    let start = *pos + 2;
    let end = *pos + length;
    let payload = data
        .get(start..end)
        .ok_or_else(|| RawError::Truncated(format!("segment needs {} bytes past {}", length, *pos)))?;
    *pos = end;
    Ok(payload)
}

/// Component of a frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameComponent {
    pub id: u8,
    pub h: u8,
    pub v: u8,
}

/// Frame header (SOFn)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub precision: u8,
    pub rows: u16,
    pub cols: u16,
    pub components: Vec<FrameComponent>,
}

impl FrameHeader {
    /// Parses an SOFn payload
    pub fn parse(mut payload: &[u8]) -> RawResult<Self> {
        let short = |_| RawError::MarkerSequence("frame header too short".to_string());
        let precision = payload.read_u8().map_err(short)?;
        let rows = payload.read_u16::<BigEndian>().map_err(short)?;
        let cols = payload.read_u16::<BigEndian>().map_err(short)?;
        let count = payload.read_u8().map_err(short)?;

        let mut components = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = payload.read_u8().map_err(short)?;
            let sampling = payload.read_u8().map_err(short)?;
            let _quant_table = payload.read_u8().map_err(short)?;
            components.push(FrameComponent {
                id,
                h: sampling >> 4,
                v: sampling & 0x0F,
            });
        }

        Ok(FrameHeader {
            precision,
            rows,
            cols,
            components,
        })
    }
}

/// Scan header (SOS)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    /// (component id, DC table selector)
    pub components: Vec<(u8, u8)>,
    /// Predictor selection value, `Ss`
    pub predictor: u8,
    /// Point transform, `Al`
    pub point_transform: u8,
}

impl ScanHeader {
    /// Parses an SOS payload
    pub fn parse(mut payload: &[u8]) -> RawResult<Self> {
        let short = |_| RawError::MarkerSequence("scan header too short".to_string());
        let count = payload.read_u8().map_err(short)?;
        let mut components = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = payload.read_u8().map_err(short)?;
            let tables = payload.read_u8().map_err(short)?;
            components.push((id, tables >> 4));
        }
        let predictor = payload.read_u8().map_err(short)?;
        let _se = payload.read_u8().map_err(short)?;
        let approx = payload.read_u8().map_err(short)?;

        Ok(ScanHeader {
            components,
            predictor,
            point_transform: approx & 0x0F,
        })
    }
}

/// First frame header of a JPEG stream and its SOF marker
pub fn first_frame(data: &[u8]) -> Option<(u8, FrameHeader)> {
    let mut pos = 0;
    if read_marker(data, &mut pos).ok()? != SOI {
        return None;
    }
    loop {
        let marker = read_marker(data, &mut pos).ok()?;
        if marker == EOI || marker == SOS {
            return None;
        }
        let payload = read_segment(data, &mut pos).ok()?;
        if is_sof(marker) {
            return Some((marker, FrameHeader::parse(payload).ok()?));
        }
    }
}

/// Whether `marker` starts a lossless frame
pub fn is_lossless_sof(marker: u8) -> bool {
    is_sof(marker) && marker & 0x03 == 0x03
}

/// Dimensions of a JPEG stream from its first frame header
///
/// Returns (width, height).
pub fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    first_frame(data).map(|(_, frame)| (frame.cols as u32, frame.rows as u32))
}

/// Dimensions of a viewable (DCT) JPEG stream
///
/// Lossless streams carry sensor data rather than a preview and yield `None`.
pub fn preview_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    match first_frame(data)? {
        (marker, _) if is_lossless_sof(marker) => None,
        (_, frame) => Some((frame.cols as u32, frame.rows as u32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_markers() {
        assert!(is_sof(SOF0));
        assert!(is_sof(SOF3));
        assert!(!is_sof(DHT));
        assert!(!is_sof(DAC));
        assert!(is_rst(0xD3));
        assert!(!is_rst(EOI));
    }

    #[test]
    fn marker_with_fill_bytes() {
        let data = [0xFF, 0xFF, 0xFF, 0xD8, 0x00];
        let mut pos = 0;
        assert_eq!(read_marker(&data, &mut pos).unwrap(), SOI);
        assert_eq!(pos, 4);
        assert!(read_marker(&data, &mut pos).is_err());
    }

    #[test]
    fn segment_bounds() {
        let data = [0x00, 0x04, 0xAA, 0xBB, 0xCC];
        let mut pos = 0;
        assert_eq!(read_segment(&data, &mut pos).unwrap(), &[0xAA, 0xBB]);
        assert_eq!(pos, 4);
        let mut pos = 0;
        assert!(matches!(
            read_segment(&[0x00, 0x08, 0x01], &mut pos),
            Err(RawError::Truncated(_))
        ));
    }

    #[test]
    fn dimensions_from_baseline_header() {
        let data = [
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46, // APP0
            0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x78, 0x00, 0xA0, 0x01, 0x01, 0x11, 0x00,
        ];
        assert_eq!(jpeg_dimensions(&data), Some((160, 120)));
        assert_eq!(preview_dimensions(&data), Some((160, 120)));
        assert_eq!(jpeg_dimensions(&[0x00, 0x01]), None);
    }

    #[test]
    fn lossless_stream_is_not_a_preview() {
        let data = [
            0xFF, 0xD8, // SOI
            0xFF, 0xC3, 0x00, 0x0B, 0x0C, 0x00, 0x02, 0x00, 0x04, 0x01, 0x01, 0x11, 0x00,
        ];
        assert!(is_lossless_sof(SOF3));
        assert!(!is_lossless_sof(SOF0));
        assert_eq!(jpeg_dimensions(&data), Some((4, 2)));
        assert_eq!(preview_dimensions(&data), None);
    }
}
