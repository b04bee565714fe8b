//! Camera RAW files
//!
//! Vendor drivers built on the TIFF directory layer. [`open_raw_file`]
//! picks the driver for a [`RawFileType`]; [`RawFile::get_raw_data`] returns
//! the sensor mosaic and [`RawFile::get_thumbnail`] the embedded previews.

pub mod cfa;
pub mod factory;
pub mod formats;
pub mod rawdata;
pub mod rawfile;
pub mod thumbnail;

pub use cfa::CfaPattern;
pub use factory::{open_path, open_raw_file, RawFileType};
pub use rawdata::{DataType, RawData, TileLayout};
pub use rawfile::{RawFile, RawFileBase, RawOptions};
pub use thumbnail::{select_thumbnail_size, Thumbnail, ThumbnailDesc};
