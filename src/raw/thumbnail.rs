//! Embedded preview images
//!
//! Previews are found in two places: a JPEG pointed to by the
//! `JPEGInterchangeFormat` pair of tags, or a directory whose single strip is
//! a JPEG or an 8-bit RGB pixmap. Each preview is keyed by its largest
//! dimension.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, trace};

use crate::compression::ljpeg::markers;
use crate::raw::rawdata::DataType;
use crate::tiff::constants::{compression, photometric, tags};
use crate::tiff::container::RawContainer;
use crate::tiff::errors::{RawError, RawResult};
use crate::tiff::ifd::IfdDir;

/// Bytes read from the start of a JPEG to find its frame header
const JPEG_PROBE_SIZE: usize = 64 * 1024;

/// Location of an embedded preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailDesc {
    pub width: u32,
    pub height: u32,
    pub data_type: DataType,
    pub offset: u64,
    pub length: u32,
}

impl ThumbnailDesc {
    /// Largest dimension, the key previews are selected by
    pub fn size(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Extracted preview
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub data_type: DataType,
    pub data: Vec<u8>,
}

impl Thumbnail {
    /// File extension matching the payload
    pub fn extension(&self) -> &'static str {
        match self.data_type {
            DataType::Jpeg => "jpg",
            _ => "ppm",
        }
    }
}

/// Picks the preview size to serve for `requested`
///
/// An exact match wins. Otherwise the smallest size above the request, then
/// the biggest size below it. Zero sizes are never picked.
pub fn select_thumbnail_size(sizes: &[u32], requested: u32) -> Option<u32> {
    let mut smallest_bigger: Option<u32> = None;
    let mut biggest_smaller: Option<u32> = None;

    for &size in sizes.iter().filter(|&&s| s != 0) {
        if size == requested {
            return Some(size);
        } else if size < requested {
            biggest_smaller = Some(biggest_smaller.map_or(size, |b| b.max(size)));
        } else {
            smallest_bigger = Some(smallest_bigger.map_or(size, |s| s.min(size)));
        }
    }

    smallest_bigger.or(biggest_smaller)
}

/// Previews referenced by `dirs` and their SubIFDs, keyed by size
///
/// The first preview found for a size is kept.
pub fn collect_thumbnails(
    container: &mut RawContainer,
    dirs: &[Rc<IfdDir>],
) -> BTreeMap<u32, ThumbnailDesc> {
    let mut found = BTreeMap::new();

    for dir in dirs {
        let mut candidates = vec![Rc::clone(dir)];
        candidates.extend(dir.get_sub_directories(container, tags::SUB_IFDS));

        for candidate in candidates {
            if let Some(desc) = thumbnail_in_directory(container, &candidate) {
                debug!(
                    "Preview {}x{} ({:?}) at {} in directory {}",
                    desc.width,
                    desc.height,
                    desc.data_type,
                    desc.offset,
                    candidate.offset()
                );
                found.entry(desc.size()).or_insert(desc);
            }
        }
    }

    found
}

fn thumbnail_in_directory(container: &mut RawContainer, dir: &IfdDir) -> Option<ThumbnailDesc> {
    if let (Some(offset), Some(length)) = (
        dir.get_integer_value(container, tags::JPEG_INTERCHANGE_FORMAT),
        dir.get_integer_value(container, tags::JPEG_INTERCHANGE_FORMAT_LENGTH),
    ) {
        return jpeg_thumbnail(container, offset as u64, length);
    }

    let offset = dir.get_integer_value(container, tags::STRIP_OFFSETS)?;
    let length = dir.get_integer_value(container, tags::STRIP_BYTE_COUNTS)?;
    let compression = dir.get_integer_value(container, tags::COMPRESSION).unwrap_or(compression::NONE);

    match compression {
        compression::JPEG_OLD | compression::LJPEG => jpeg_thumbnail(container, offset as u64, length),
        compression::NONE => {
            let photometric = dir.get_integer_value(container, tags::PHOTOMETRIC_INTERPRETATION)?;
            let spp = dir.get_integer_value(container, tags::SAMPLES_PER_PIXEL).unwrap_or(1);
            let bps = dir.get_integer_value(container, tags::BITS_PER_SAMPLE).unwrap_or(0);
            let (width, height) = dir.get_dimensions(container)?;
            let expected = width as u64 * height as u64 * 3;
            if photometric == photometric::RGB && spp == 3 && bps == 8 && length as u64 == expected {
                Some(ThumbnailDesc {
                    width,
                    height,
                    data_type: DataType::Pixmap8Rgb,
                    offset: offset as u64,
                    length,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

fn jpeg_thumbnail(container: &mut RawContainer, offset: u64, length: u32) -> Option<ThumbnailDesc> {
    if length == 0 {
        return None;
    }
    let probe = (length as usize).min(JPEG_PROBE_SIZE);
    let head = container.fetch_available(offset, probe).ok()?;
    let (width, height) = match markers::preview_dimensions(&head) {
        Some(dims) => dims,
        None => {
            trace!("No preview frame in JPEG at {}", offset);
            return None;
        }
    };
    Some(ThumbnailDesc {
        width,
        height,
        data_type: DataType::Jpeg,
        offset,
        length,
    })
}

/// Reads the bytes of a located preview
pub fn load_thumbnail(container: &mut RawContainer, desc: &ThumbnailDesc) -> RawResult<Thumbnail> {
    let data = container.fetch_block(desc.offset, desc.length as usize)?;
    Ok(Thumbnail {
        width: desc.width,
        height: desc.height,
        data_type: desc.data_type,
        data,
    })
}

/// Preview for `requested` out of `available`
pub fn find_thumbnail(
    available: &BTreeMap<u32, ThumbnailDesc>,
    requested: u32,
) -> RawResult<&ThumbnailDesc> {
    let sizes: Vec<u32> = available.keys().copied().collect();
    select_thumbnail_size(&sizes, requested)
        .and_then(|size| available.get(&size))
        .ok_or_else(|| RawError::NotFound(format!("no thumbnail for size {}", requested)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_size_wins() {
        assert_eq!(select_thumbnail_size(&[160, 1024, 640], 640), Some(640));
    }

    #[test]
    fn smallest_bigger_before_biggest_smaller() {
        assert_eq!(select_thumbnail_size(&[160, 1024, 640], 500), Some(640));
        assert_eq!(select_thumbnail_size(&[160, 1024, 640], 2000), Some(1024));
        assert_eq!(select_thumbnail_size(&[160, 120], 100), Some(120));
    }

    #[test]
    fn zero_and_empty_yield_nothing() {
        assert_eq!(select_thumbnail_size(&[], 160), None);
        assert_eq!(select_thumbnail_size(&[0], 160), None);
        assert_eq!(select_thumbnail_size(&[0, 90], 0), Some(90));
    }

    #[test]
    fn find_reports_not_found() {
        let empty = BTreeMap::new();
        assert!(matches!(find_thumbnail(&empty, 160), Err(RawError::NotFound(_))));
    }
}
