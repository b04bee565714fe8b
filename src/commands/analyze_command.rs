//! RAW file structure analysis command
//!
//! This module implements the command for analyzing and displaying
//! the directory structure and sensor data of a RAW file.

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::commands::{file_type_arg, input_arg, options_arg};
use crate::raw::{open_path, RawFileType, RawOptions};
use crate::tiff::errors::RawResult;
use crate::utils::format_utils;
use crate::utils::logger::Logger;

/// Command for analyzing RAW file structure
pub struct AnalyzeCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Explicit file type, overriding the extension
    file_type: Option<RawFileType>,
    /// Options for the raw data summary
    options: RawOptions,
    /// Whether to list every directory entry
    verbose: bool,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> AnalyzeCommand<'a> {
    /// Create a new analyze command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> RawResult<Self> {
        Ok(AnalyzeCommand {
            input_file: input_arg(args)?,
            file_type: file_type_arg(args)?,
            options: options_arg(args),
            verbose: args.get_flag("verbose"),
            logger,
        })
    }
}

impl<'a> Command for AnalyzeCommand<'a> {
    fn name(&self) -> &'static str {
        "analyze"
    }

    fn execute(&self) -> RawResult<()> {
        info!("Analyzing file: {}", self.input_file);

        if self.verbose {
            debug!("Verbose mode enabled");
        }

        let mut raw = open_path(&self.input_file, self.file_type)?;
        let report = format_utils::analysis_report(raw.as_mut(), self.options, self.verbose)?;

        info!("RAW Analysis Results:");
        for line in &report {
            info!("  {}", line);
        }

        self.logger.log_section(&format!("Analysis of {}", self.input_file), &report)?;
        debug!("Analysis completed successfully");
        Ok(())
    }
}
