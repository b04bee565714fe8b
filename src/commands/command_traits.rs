//! Command pattern interfaces for the CLI

use clap::ArgMatches;

use crate::tiff::errors::RawResult;
use crate::utils::logger::Logger;

/// One CLI operation on a RAW file
pub trait Command {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Runs the operation to completion
    fn execute(&self) -> RawResult<()>;
}

/// Builds the command matching the parsed arguments
///
/// Commands borrow the session logger for their whole lifetime.
pub trait CommandFactory<'a> {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> RawResult<Box<dyn Command + 'a>>;
}
