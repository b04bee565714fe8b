use std::path::Path;

use log::info;

use crate::raw::{open_path, open_raw_file, RawData, RawFile, RawFileType, RawOptions, Thumbnail};
use crate::io::ByteSource;
use crate::tiff::errors::RawResult;
use crate::utils::format_utils;
use crate::utils::logger::Logger;

/// Main interface to the RawKit library
pub struct RawKit {
    logger: Logger,
}

impl RawKit {
    /// Create a new RawKit instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file, defaults to "rawkit.log"
    pub fn new(log_file: Option<&str>) -> RawResult<Self> {
        let log_path = log_file.unwrap_or("rawkit.log");
        let logger = Logger::new(log_path)?;
        Ok(RawKit { logger })
    }

    /// Open a RAW file, identified by extension unless `file_type` is given
    pub fn open<P: AsRef<Path>>(&self, path: P, file_type: Option<RawFileType>) -> RawResult<Box<dyn RawFile>> {
        open_path(path, file_type)
    }

    /// Open a RAW file of a known type from any byte source
    pub fn open_source(&self, source: Box<dyn ByteSource>, file_type: RawFileType) -> RawResult<Box<dyn RawFile>> {
        open_raw_file(source, file_type)
    }

    /// Analyze a RAW file and return a report of its structure
    ///
    /// The raw data summary is computed without decompressing.
    pub fn analyze<P: AsRef<Path>>(&self, input_path: P, verbose: bool) -> RawResult<String> {
        let mut raw = open_path(&input_path, None)?;
        let lines = format_utils::analysis_report(raw.as_mut(), RawOptions::NO_DECOMPRESS, verbose)?;
        self.logger.log_section(&format!("Analysis of {}", input_path.as_ref().display()), &lines)?;
        Ok(lines.join("\n"))
    }

    /// Read the sensor data of a RAW file
    pub fn raw_data<P: AsRef<Path>>(&self, input_path: P, options: RawOptions) -> RawResult<RawData> {
        let mut raw = open_path(&input_path, None)?;
        let data = raw.get_raw_data(options)?;
        self.logger.log(&format!(
            "Read {}x{} raw data from {}",
            data.width,
            data.height,
            input_path.as_ref().display()
        ))?;
        Ok(data)
    }

    /// Sizes of the previews embedded in a RAW file
    pub fn thumbnail_sizes<P: AsRef<Path>>(&self, input_path: P) -> RawResult<Vec<u32>> {
        let mut raw = open_path(input_path, None)?;
        Ok(raw.list_thumbnail_sizes())
    }

    /// Preview closest to `size`
    pub fn thumbnail<P: AsRef<Path>>(&self, input_path: P, size: u32) -> RawResult<Thumbnail> {
        let mut raw = open_path(&input_path, None)?;
        let thumbnail = raw.get_thumbnail(size)?;
        info!(
            "Selected {}x{} thumbnail from {}",
            thumbnail.width,
            thumbnail.height,
            input_path.as_ref().display()
        );
        Ok(thumbnail)
    }
}
