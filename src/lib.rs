pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod raw;
pub mod commands;
pub mod api;

pub use crate::api::RawKit;

pub use raw::{open_path, open_raw_file, DataType, RawData, RawFile, RawFileType, RawOptions};
pub use tiff::{RawError, RawResult};
