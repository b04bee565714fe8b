//! Panasonic RW2 driver

use std::rc::Rc;

use log::debug;

use crate::io::byte_source::ByteSource;
use crate::raw::factory::RawFileType;
use crate::raw::rawdata::RawData;
use crate::raw::rawfile::{decompress_raw_data, RawFile, RawFileBase, RawOptions};
use crate::tiff::constants::{compression, rw2_tags, tags};
use crate::tiff::container::{MagicHeader, RawContainer};
use crate::tiff::errors::{RawError, RawResult};
use crate::tiff::ifd::IfdDir;

/// Panasonic RAW file
///
/// Sensor geometry and the data offset live in Panasonic private tags of
/// the main directory. Data spanning two bytes per sample is unpacked,
/// anything shorter is left in its vendor packing.
pub struct Rw2File {
    base: RawFileBase,
}

impl Rw2File {
    pub fn open(source: Box<dyn ByteSource>) -> RawResult<Self> {
        Ok(Rw2File {
            base: RawFileBase::open(source, MagicHeader::Rw2)?,
        })
    }

    pub fn factory(source: Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>> {
        Ok(Box::new(Rw2File::open(source)?))
    }
}

impl RawFile for Rw2File {
    fn file_type(&self) -> RawFileType {
        RawFileType::Rw2
    }

    fn base(&mut self) -> &mut RawFileBase {
        &mut self.base
    }

    fn locate_cfa_directory(&mut self) -> RawResult<Rc<IfdDir>> {
        self.locate_main_directory()
    }

    fn get_raw_data(&mut self, options: RawOptions) -> RawResult<RawData> {
        let dir = self.locate_cfa_directory()?;
        let container = self.base.raw();

        let width = dimension(&dir, container, rw2_tags::SENSOR_WIDTH, tags::IMAGE_WIDTH)?;
        let height = dimension(&dir, container, rw2_tags::SENSOR_HEIGHT, tags::IMAGE_LENGTH)?;

        let offset = dir
            .get_integer_value(container, tags::STRIP_OFFSETS)
            .or_else(|| dir.get_integer_value(container, rw2_tags::RAW_DATA_OFFSET))
            .ok_or_else(|| RawError::NotFound("raw data offset".to_string()))? as u64;
        let length = match dir.get_integer_value(container, tags::STRIP_BYTE_COUNTS) {
            Some(count) if count > 0 => count as u64,
            _ => container.file_size()?.saturating_sub(offset),
        };
        let bytes = container.fetch_available(offset, length as usize)?;

        let bpc = dir.get_integer_value(container, tags::BITS_PER_SAMPLE).unwrap_or(12);
        let mut code = dir
            .get_integer_value(container, tags::COMPRESSION)
            .unwrap_or(compression::PANASONIC);
        if bytes.len() as u64 == width as u64 * height as u64 * 2 {
            code = compression::NONE;
        }
        debug!("RW2 {}x{}, {} bytes at {}, compression {}", width, height, bytes.len(), offset, code);

        let data = RawData {
            width,
            height,
            bpc: bpc as u16,
            compression: code,
            bytes,
            ..Default::default()
        };
        let endian = self.base.endian();
        decompress_raw_data(data, options, endian)
    }
}

/// Panasonic sensor dimension, falling back to the TIFF tag
fn dimension(dir: &IfdDir, container: &mut RawContainer, panasonic: u16, standard: u16) -> RawResult<u32> {
    dir.get_integer_value(container, panasonic)
        .or_else(|| dir.get_integer_value(container, standard))
        .ok_or(RawError::TagNotFound(panasonic))
}
