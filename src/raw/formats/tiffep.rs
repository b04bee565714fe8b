//! Drivers for TIFF-EP based formats
//!
//! Nikon NEF, Epson ERF, Sony ARW and Pentax PEF all keep their sensor data
//! in a CFA directory found by the TIFF-EP search. Their vendor compressions
//! have no decoder here and are returned as `CompressedCfa`.

use std::rc::Rc;

use crate::io::byte_source::ByteSource;
use crate::raw::factory::RawFileType;
use crate::raw::rawfile::{RawFile, RawFileBase};
use crate::tiff::container::MagicHeader;
use crate::tiff::errors::RawResult;
use crate::tiff::ifd::IfdDir;

pub struct TiffEpFile {
    base: RawFileBase,
    file_type: RawFileType,
}

impl TiffEpFile {
    pub fn open(source: Box<dyn ByteSource>, file_type: RawFileType) -> RawResult<Self> {
        Ok(TiffEpFile {
            base: RawFileBase::open(source, MagicHeader::Tiff)?,
            file_type,
        })
    }

    pub fn nef(source: Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>> {
        Ok(Box::new(TiffEpFile::open(source, RawFileType::Nef)?))
    }

    pub fn erf(source: Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>> {
        Ok(Box::new(TiffEpFile::open(source, RawFileType::Erf)?))
    }

    pub fn arw(source: Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>> {
        Ok(Box::new(TiffEpFile::open(source, RawFileType::Arw)?))
    }

    pub fn pef(source: Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>> {
        Ok(Box::new(TiffEpFile::open(source, RawFileType::Pef)?))
    }
}

impl RawFile for TiffEpFile {
    fn file_type(&self) -> RawFileType {
        self.file_type
    }

    fn base(&mut self) -> &mut RawFileBase {
        &mut self.base
    }

    fn locate_cfa_directory(&mut self) -> RawResult<Rc<IfdDir>> {
        self.base.tiff_ep_cfa_directory(false)
    }
}
