//! Embedded preview extraction command

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::{file_type_arg, input_arg};
use crate::raw::{open_path, DataType, RawFileType};
use crate::tiff::errors::{RawError, RawResult};
use crate::utils::logger::Logger;
use crate::utils::write_utils;

/// Command for writing the preview closest to a requested size
pub struct ThumbnailCommand<'a> {
    input_file: String,
    output_file: PathBuf,
    size: u32,
    file_type: Option<RawFileType>,
    logger: &'a Logger,
}

impl<'a> ThumbnailCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> RawResult<Self> {
        let size = args
            .get_one::<String>("thumbnail")
            .ok_or_else(|| RawError::InvalidArgument("Missing thumbnail size".to_string()))?;
        let size = size
            .parse::<u32>()
            .map_err(|_| RawError::InvalidArgument(format!("Invalid thumbnail size: {}", size)))?;
        let output_file = args
            .get_one::<String>("output")
            .map(PathBuf::from)
            .ok_or_else(|| RawError::InvalidArgument("Missing --output for the thumbnail".to_string()))?;

        Ok(ThumbnailCommand {
            input_file: input_arg(args)?,
            output_file,
            size,
            file_type: file_type_arg(args)?,
            logger,
        })
    }
}

impl<'a> Command for ThumbnailCommand<'a> {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    fn execute(&self) -> RawResult<()> {
        let mut raw = open_path(&self.input_file, self.file_type)?;
        info!("Available thumbnail sizes: {:?}", raw.list_thumbnail_sizes());

        let thumbnail = raw.get_thumbnail(self.size)?;
        match thumbnail.data_type {
            DataType::Pixmap8Rgb => write_utils::save_rgb8(
                &self.output_file,
                thumbnail.width,
                thumbnail.height,
                &thumbnail.data,
            )?,
            _ => write_utils::write_bytes(&self.output_file, &thumbnail.data)?,
        }

        self.logger.log(&format!(
            "Wrote {}x{} thumbnail of {} to {}",
            thumbnail.width,
            thumbnail.height,
            self.input_file,
            self.output_file.display()
        ))?;
        Ok(())
    }
}
