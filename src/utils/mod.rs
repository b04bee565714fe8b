//! Utility modules for common functionality
//!
//! Logging, progress reporting, output writers and the human-readable
//! descriptions used by the commands.

pub mod logger;
pub mod progress;
pub mod write_utils;
pub mod format_utils;
pub mod tag_utils;
