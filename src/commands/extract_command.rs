//! Sensor data extraction command
//!
//! Writes the decoded mosaic as a 16-bit grayscale image when the output
//! path has an image extension, otherwise dumps the raw data bytes.

use std::path::PathBuf;

use clap::ArgMatches;
use log::{info, warn};

use crate::commands::command_traits::Command;
use crate::commands::{file_type_arg, input_arg, options_arg};
use crate::raw::{open_path, DataType, RawFileType, RawOptions};
use crate::tiff::errors::{RawError, RawResult};
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;
use crate::utils::write_utils;

/// Command for extracting the sensor data of a RAW file
pub struct ExtractCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Path to the output file
    output_file: PathBuf,
    /// Explicit file type, overriding the extension
    file_type: Option<RawFileType>,
    /// Decode options
    options: RawOptions,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> ExtractCommand<'a> {
    /// Create a new extract command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> RawResult<Self> {
        let input_file = input_arg(args)?;
        info!("Input file: {}", input_file);

        let output_file = args
            .get_one::<String>("extract-raw")
            .map(PathBuf::from)
            .ok_or_else(|| RawError::InvalidArgument("Missing output file path for extraction".to_string()))?;
        info!("Output file: {}", output_file.display());

        Ok(ExtractCommand {
            input_file,
            output_file,
            file_type: file_type_arg(args)?,
            options: options_arg(args),
            logger,
        })
    }
}

impl<'a> Command for ExtractCommand<'a> {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn execute(&self) -> RawResult<()> {
        let mut raw = open_path(&self.input_file, self.file_type)?;
        let data = raw.get_raw_data(self.options)?;
        info!(
            "Extracted {}x{} {:?} data, {} bytes",
            data.width,
            data.height,
            data.data_type,
            data.bytes.len()
        );

        match data.samples_u16() {
            Some(samples) if write_utils::is_image_path(&self.output_file) => {
                let progress = ProgressTracker::new(data.height as u64, "Writing samples");
                write_utils::save_samples(&self.output_file, data.width, data.height, &samples, &progress)?;
                progress.finish();
            }
            _ => {
                if write_utils::is_image_path(&self.output_file) {
                    warn!("{:?} data cannot be written as an image, writing raw bytes", data.data_type);
                }
                if data.data_type == DataType::CompressedCfa {
                    info!("Data is still compressed (compression {})", data.compression);
                }
                write_utils::write_bytes(&self.output_file, &data.bytes)?;
            }
        }

        self.logger.log(&format!(
            "Extracted raw data of {} to {}",
            self.input_file,
            self.output_file.display()
        ))?;
        Ok(())
    }
}
