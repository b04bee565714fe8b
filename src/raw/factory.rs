//! Vendor format identification and driver construction

use std::fmt;
use std::path::Path;

use log::{debug, info};

use crate::io::byte_source::{ByteSource, FileSource};
use crate::raw::formats::{Cr2File, DngFile, OrfFile, Rw2File, TiffEpFile};
use crate::raw::rawfile::RawFile;
use crate::tiff::errors::{RawError, RawResult};

/// Supported RAW formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawFileType {
    Orf,
    Nef,
    Erf,
    Arw,
    Pef,
    Dng,
    Cr2,
    Rw2,
}

type Constructor = fn(Box<dyn ByteSource>) -> RawResult<Box<dyn RawFile>>;

static CONSTRUCTORS: &[(RawFileType, Constructor)] = &[
    (RawFileType::Orf, OrfFile::factory),
    (RawFileType::Nef, TiffEpFile::nef),
    (RawFileType::Erf, TiffEpFile::erf),
    (RawFileType::Arw, TiffEpFile::arw),
    (RawFileType::Pef, TiffEpFile::pef),
    (RawFileType::Dng, DngFile::factory),
    (RawFileType::Cr2, Cr2File::factory),
    (RawFileType::Rw2, Rw2File::factory),
];

static EXTENSIONS: &[(&str, RawFileType)] = &[
    ("orf", RawFileType::Orf),
    ("nef", RawFileType::Nef),
    ("erf", RawFileType::Erf),
    ("arw", RawFileType::Arw),
    ("pef", RawFileType::Pef),
    ("dng", RawFileType::Dng),
    ("cr2", RawFileType::Cr2),
    ("rw2", RawFileType::Rw2),
];

/// Longest extension considered when identifying a path
const MAX_EXTENSION_LEN: usize = 4;

impl RawFileType {
    /// Every supported type
    pub fn all() -> impl Iterator<Item = RawFileType> {
        EXTENSIONS.iter().map(|&(_, file_type)| file_type)
    }

    /// Type for a file extension, case-insensitive
    pub fn from_extension(extension: &str) -> Option<RawFileType> {
        if extension.len() > MAX_EXTENSION_LEN {
            return None;
        }
        let extension = extension.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|&(_, file_type)| file_type)
    }

    /// Type from the extension of `path`
    pub fn identify<P: AsRef<Path>>(path: P) -> Option<RawFileType> {
        let extension = path.as_ref().extension()?.to_str()?;
        let file_type = RawFileType::from_extension(extension);
        debug!("Identified {:?} as {:?}", path.as_ref(), file_type);
        file_type
    }

    /// Canonical lowercase extension
    pub fn extension(&self) -> &'static str {
        EXTENSIONS
            .iter()
            .find(|(_, file_type)| file_type == self)
            .map(|&(ext, _)| ext)
            .unwrap_or("")
    }

    /// Vendor name
    pub fn vendor(&self) -> &'static str {
        match self {
            RawFileType::Orf => "Olympus",
            RawFileType::Nef => "Nikon",
            RawFileType::Erf => "Epson",
            RawFileType::Arw => "Sony",
            RawFileType::Pef => "Pentax",
            RawFileType::Dng => "Adobe DNG",
            RawFileType::Cr2 => "Canon",
            RawFileType::Rw2 => "Panasonic",
        }
    }
}

impl fmt::Display for RawFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.extension().to_ascii_uppercase(), self.vendor())
    }
}

/// Opens `source` with the driver for `file_type`
pub fn open_raw_file(source: Box<dyn ByteSource>, file_type: RawFileType) -> RawResult<Box<dyn RawFile>> {
    let constructor = CONSTRUCTORS
        .iter()
        .find(|(t, _)| *t == file_type)
        .map(|&(_, constructor)| constructor)
        .ok_or_else(|| RawError::UnknownFileType(format!("{:?}", file_type)))?;
    info!("Opening {} file", file_type);
    constructor(source)
}

/// Opens the file at `path`, identified by extension unless `file_type` is given
pub fn open_path<P: AsRef<Path>>(path: P, file_type: Option<RawFileType>) -> RawResult<Box<dyn RawFile>> {
    let path = path.as_ref();
    let file_type = match file_type.or_else(|| RawFileType::identify(path)) {
        Some(file_type) => file_type,
        None => return Err(RawError::UnknownFileType(path.display().to_string())),
    };
    open_raw_file(Box::new(FileSource::new(path)), file_type)
}
