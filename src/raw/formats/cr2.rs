//! Canon CR2 driver
//!
//! The sensor data is a lossless JPEG in the fourth directory of the main
//! chain. Canon encodes the mosaic as vertical slices laid end to end, so
//! the decoded stream is reassembled using the slice tag.

use std::rc::Rc;

use log::{debug, info};

use crate::compression::ljpeg::markers;
use crate::io::byte_source::ByteSource;
use crate::raw::factory::RawFileType;
use crate::raw::rawdata::{DataType, RawData};
use crate::raw::rawfile::{decompress_raw_data, RawFile, RawFileBase, RawOptions};
use crate::tiff::constants::{compression, tags};
use crate::tiff::container::MagicHeader;
use crate::tiff::errors::{RawError, RawResult};
use crate::tiff::ifd::IfdDir;

/// Chain index of the sensor data directory
const RAW_DIRECTORY_INDEX: usize = 3;

pub struct Cr2File {
    base: RawFileBase,
}

impl Cr2File {
    pub fn open(source: Box<dyn ByteSource>) -> RawResult<Self> {
        Ok(Cr2File {
            base: RawFileBase::open(source, MagicHeader::Tiff)?,
        })
    }

    pub fn factory(source: Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>> {
        Ok(Box::new(Cr2File::open(source)?))
    }
}

impl RawFile for Cr2File {
    fn file_type(&self) -> RawFileType {
        RawFileType::Cr2
    }

    fn base(&mut self) -> &mut RawFileBase {
        &mut self.base
    }

    fn locate_cfa_directory(&mut self) -> RawResult<Rc<IfdDir>> {
        self.base
            .container()
            .set_directory(RAW_DIRECTORY_INDEX)?
            .ok_or_else(|| RawError::NotFound("CR2 raw directory".to_string()))
    }

    fn translate_compression_type(&self, code: u32) -> u32 {
        if code == compression::JPEG_OLD {
            compression::LJPEG
        } else {
            code
        }
    }

    fn get_raw_data(&mut self, options: RawOptions) -> RawResult<RawData> {
        let dir = self.locate_cfa_directory()?;
        let container = self.base.raw();

        let offset = dir
            .get_integer_value(container, tags::STRIP_OFFSETS)
            .ok_or_else(|| RawError::NotFound("strip offsets".to_string()))?;
        let length = dir
            .get_integer_value(container, tags::STRIP_BYTE_COUNTS)
            .ok_or_else(|| RawError::NotFound("strip byte counts".to_string()))?;
        let code = dir
            .get_integer_value(container, tags::COMPRESSION)
            .unwrap_or(compression::JPEG_OLD);
        let slices = dir.get_array::<u16>(container, tags::CR2_SLICE).unwrap_or_default();
        let bytes = container.fetch_block(offset as u64, length as usize)?;

        // Geometry comes from the stream, the directory rarely carries it
        let (_, frame) = markers::first_frame(&bytes)
            .ok_or_else(|| RawError::MarkerSequence("no frame header in CR2 data".to_string()))?;
        let width = frame.cols as u32 * frame.components.len() as u32;
        let height = frame.rows as u32;
        debug!("CR2 frame {}x{}, slices {:?}", width, height, slices);

        let data = RawData {
            width,
            height,
            bpc: frame.precision as u16,
            compression: self.translate_compression_type(code),
            slices,
            bytes,
            ..Default::default()
        };

        let endian = self.base.endian();
        let mut data = decompress_raw_data(data, options, endian)?;
        if data.data_type == DataType::Cfa && !data.slices.is_empty() {
            let samples = data
                .samples_u16()
                .ok_or_else(|| RawError::StructuralCorruption("CR2 data is not a sample grid".to_string()))?;
            let ordered = unslice(&samples, data.width as usize, data.height as usize, &data.slices)?;
            data.set_samples(&ordered);
            info!("Reassembled {} CR2 slices", data.slices.first().copied().unwrap_or(0) + 1);
        }
        Ok(data)
    }
}

/// Puts sliced samples back in raster order
///
/// `slices` is `[count, width, last_width]`: `count` slices of `width`
/// columns followed by one of `last_width`. The stream holds every row of
/// the first slice, then every row of the next.
pub(crate) fn unslice(samples: &[u16], width: usize, height: usize, slices: &[u16]) -> RawResult<Vec<u16>> {
    let (count, slice_width, last_width) = match *slices {
        [count, slice_width, last_width] => (count as usize, slice_width as usize, last_width as usize),
        _ => {
            return Err(RawError::StructuralCorruption(format!(
                "slice tag holds {} values",
                slices.len()
            )))
        }
    };
    if count * slice_width + last_width != width {
        return Err(RawError::StructuralCorruption(format!(
            "slices {}x{}+{} do not cover width {}",
            count, slice_width, last_width, width
        )));
    }
    if samples.len() < width * height {
        return Err(RawError::Truncated(format!(
            "{} samples for a {}x{} image",
            samples.len(),
            width,
            height
        )));
    }

    let mut out = vec![0u16; width * height];
    let mut input = 0;
    let mut x = 0;
    for slice in 0..=count {
        let columns = if slice < count { slice_width } else { last_width };
        for row in 0..height {
            let src = input + row * columns;
            let dst = row * width + x;
            out[dst..dst + columns].copy_from_slice(&samples[src..src + columns]);
        }
        input += columns * height;
        x += columns;
    }
    Ok(out)
}
