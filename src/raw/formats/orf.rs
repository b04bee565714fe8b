//! Olympus ORF driver

use std::rc::Rc;

use log::debug;

use crate::io::byte_source::ByteSource;
use crate::raw::factory::RawFileType;
use crate::raw::rawdata::RawData;
use crate::raw::rawfile::{decompress_raw_data, RawFile, RawFileBase, RawOptions};
use crate::tiff::constants::compression;
use crate::tiff::container::MagicHeader;
use crate::tiff::errors::RawResult;
use crate::tiff::ifd::IfdDir;

/// Olympus RAW file
///
/// Sensor data lives in the main directory. Olympus writers record
/// compression 1 even when the strip is packed, so a strip shorter than
/// two bytes per sample is treated as Olympus-compressed.
pub struct OrfFile {
    base: RawFileBase,
}

impl OrfFile {
    pub fn open(source: Box<dyn ByteSource>) -> RawResult<Self> {
        Ok(OrfFile {
            base: RawFileBase::open(source, MagicHeader::Orf)?,
        })
    }

    pub fn factory(source: Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>> {
        Ok(Box::new(OrfFile::open(source)?))
    }
}

impl RawFile for OrfFile {
    fn file_type(&self) -> RawFileType {
        RawFileType::Orf
    }

    fn base(&mut self) -> &mut RawFileBase {
        &mut self.base
    }

    fn locate_cfa_directory(&mut self) -> RawResult<Rc<IfdDir>> {
        self.locate_main_directory()
    }

    fn translate_compression_type(&self, code: u32) -> u32 {
        if code == compression::CUSTOM {
            compression::OLYMPUS
        } else {
            code
        }
    }

    fn get_raw_data(&mut self, options: RawOptions) -> RawResult<RawData> {
        let dir = self.locate_cfa_directory()?;
        let mut data = self.base.raw_data_from_dir(&dir)?;
        data.compression = self.translate_compression_type(data.compression);

        let full_size = data.width as u64 * data.height as u64 * 2;
        if (data.bytes.len() as u64) < full_size {
            debug!(
                "{} bytes for a {}x{} mosaic, decoding as Olympus-compressed",
                data.bytes.len(),
                data.width,
                data.height
            );
            data.compression = compression::OLYMPUS;
        }

        let endian = self.base.endian();
        decompress_raw_data(data, options, endian)
    }
}
