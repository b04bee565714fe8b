//! TIFF-derived container parsing module
//!
//! This module provides the endian-aware container reader and the
//! directory (IFD) parser shared by every RAW format driver.

pub mod errors;
pub mod constants;
pub mod types;
pub mod container;
pub mod ifd;
pub mod ifd_container;
pub(crate) mod validation;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrderHandler, Endianness, LittleEndianHandler};
pub use container::{MagicHeader, RawContainer};
pub use errors::{RawError, RawResult};
pub use ifd::{IfdDir, IfdEntry, NamedDirectory};
pub use ifd_container::IfdFileContainer;
pub use types::{IfdType, IfdTypeTrait, Rational, SRational};
