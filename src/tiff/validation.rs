//! Directory validation utilities
//!
//! This module provides validation functions for directory tables to
//! reject malformed files before anything large is allocated.

use log::error;

use crate::tiff::constants::layout;
use crate::tiff::errors::{RawError, RawResult};

/// Validates a directory offset against the container size
///
/// # Arguments
/// * `offset` - The offset to validate
/// * `file_size` - The container size
///
/// # Returns
/// Ok if a directory header fits at the offset, an error otherwise
pub fn validate_directory_offset(offset: u64, file_size: u64) -> RawResult<()> {
    if offset.saturating_add(layout::ENTRY_COUNT_SIZE) > file_size {
        return Err(RawError::StructuralCorruption(format!(
            "Invalid directory offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Validates a directory entry count
///
/// # Arguments
/// * `count` - Number of entries declared by the directory
/// * `offset` - Directory offset, for the error message
pub fn validate_entry_count(count: u16, offset: u64) -> RawResult<()> {
    if count > layout::MAX_ENTRY_COUNT {
        error!("Directory at {} declares {} entries", offset, count);
        return Err(RawError::StructuralCorruption(format!(
            "Directory at {} has too many entries: {} (max {})",
            offset, count, layout::MAX_ENTRY_COUNT
        )));
    }

    Ok(())
}

/// Validates a numeric range to ensure it's within bounds
///
/// # Arguments
/// * `value` - The value to validate
/// * `min` - The minimum valid value (inclusive)
/// * `max` - The maximum valid value (inclusive)
/// * `name` - Name of the value for error messages
pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> RawResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(RawError::Unsupported(format!(
            "Invalid {}: {} (must be between {} and {})",
            name, value, min, max
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_offset_must_fit() {
        assert!(validate_directory_offset(8, 100).is_ok());
        assert!(validate_directory_offset(99, 100).is_err());
        assert!(validate_directory_offset(u64::MAX, 100).is_err());
    }

    #[test]
    fn entry_count_cap() {
        assert!(validate_entry_count(1000, 8).is_ok());
        assert!(validate_entry_count(1001, 8).is_err());
    }

    #[test]
    fn range_check() {
        assert!(validate_range(16, 2, 16, "precision").is_ok());
        assert!(validate_range(1, 2, 16, "precision").is_err());
    }
}
