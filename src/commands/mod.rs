//! CLI command implementations
//!
//! This module contains implementations of the commands supported by the
//! CLI application using the Command pattern.

pub mod command_traits;
pub mod analyze_command;
pub mod extract_command;
pub mod thumbnail_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;
pub use extract_command::ExtractCommand;
pub use thumbnail_command::ThumbnailCommand;

use clap::ArgMatches;
use crate::raw::{RawFileType, RawOptions};
use crate::utils::logger::Logger;
use crate::tiff::errors::{RawError, RawResult};

/// Factory for creating command instances based on CLI arguments
///
/// Extraction and thumbnail requests get their own command; anything else
/// analyzes the file.
pub struct RawkitCommandFactory;

impl RawkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        RawkitCommandFactory
    }
}

impl Default for RawkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for RawkitCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> RawResult<Box<dyn Command + 'a>> {
        if args.contains_id("extract-raw") {
            Ok(Box::new(ExtractCommand::new(args, logger)?))
        } else if args.contains_id("thumbnail") {
            Ok(Box::new(ThumbnailCommand::new(args, logger)?))
        } else {
            Ok(Box::new(AnalyzeCommand::new(args, logger)?))
        }
    }
}

/// The required input path
pub(crate) fn input_arg(args: &ArgMatches) -> RawResult<String> {
    args.get_one::<String>("input")
        .cloned()
        .ok_or_else(|| RawError::InvalidArgument("Missing input file".to_string()))
}

/// The `--type` override, if given
pub(crate) fn file_type_arg(args: &ArgMatches) -> RawResult<Option<RawFileType>> {
    match args.get_one::<String>("type") {
        Some(name) => RawFileType::from_extension(name)
            .map(Some)
            .ok_or_else(|| RawError::UnknownFileType(name.clone())),
        None => Ok(None),
    }
}

/// Decode options from the flags
pub(crate) fn options_arg(args: &ArgMatches) -> RawOptions {
    if args.get_flag("no-decompress") {
        RawOptions::NO_DECOMPRESS
    } else {
        RawOptions::NONE
    }
}
