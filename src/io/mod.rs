//! I/O utilities for file handling
//!
//! This module provides the byte source abstraction the RAW containers read
//! from, and the byte order strategies used to decode multi-byte values.

pub mod byte_order;
pub mod byte_source;

pub use byte_order::{BigEndianHandler, ByteOrderHandler, Endianness, LittleEndianHandler};
pub use byte_source::{ByteSource, FileSource, SeekableReader, StreamSource};
