//! Adobe DNG driver

use std::rc::Rc;

use log::debug;

use crate::io::byte_source::ByteSource;
use crate::raw::factory::RawFileType;
use crate::raw::rawfile::{RawFile, RawFileBase};
use crate::tiff::constants::tags;
use crate::tiff::container::MagicHeader;
use crate::tiff::errors::RawResult;
use crate::tiff::ifd::IfdDir;

/// Digital Negative file
///
/// The full-resolution CFA directory is stored either uncompressed or as
/// lossless JPEG, in strips or tiles.
pub struct DngFile {
    base: RawFileBase,
}

impl DngFile {
    pub fn open(source: Box<dyn ByteSource>) -> RawResult<Self> {
        let mut base = RawFileBase::open(source, MagicHeader::Tiff)?;
        if let Ok(main) = base.main_directory() {
            if let Some(version) = main.get_array::<u8>(base.raw(), tags::DNG_VERSION) {
                debug!("DNG version {:?}", version);
            }
        }
        Ok(DngFile { base })
    }

    pub fn factory(source: Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>> {
        Ok(Box::new(DngFile::open(source)?))
    }
}

impl RawFile for DngFile {
    fn file_type(&self) -> RawFileType {
        RawFileType::Dng
    }

    fn base(&mut self) -> &mut RawFileBase {
        &mut self.base
    }

    fn locate_cfa_directory(&mut self) -> RawResult<Rc<IfdDir>> {
        self.base.tiff_ep_cfa_directory(true)
    }
}
