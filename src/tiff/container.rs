//! Endian-aware random-access container
//!
//! A [`RawContainer`] binds a [`ByteSource`] at a base offset. It tracks the
//! detected byte order and exposes scalar reads at the cursor plus
//! absolute block fetches. All offsets are relative to the base.

use std::io::SeekFrom;

use log::{debug, trace};

use crate::io::byte_order::{ByteOrderHandler, Endianness};
use crate::io::byte_source::ByteSource;
use crate::tiff::constants::header;
use crate::tiff::errors::{RawError, RawResult};

/// Magic header dialect of a TIFF-derived container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicHeader {
    /// Standard TIFF, `II*\0` or `MM\0*`
    Tiff,
    /// Olympus ORF, `IIRO`, `IIRS` or `MMOR`
    Orf,
    /// Panasonic RW2, `IIU\0`
    Rw2,
}

impl MagicHeader {
    /// Byte order announced by `magic`, `None` if it is not this dialect
    pub fn endianness(&self, magic: &[u8]) -> Option<Endianness> {
        let magic: [u8; header::MAGIC_SIZE] = magic.get(..header::MAGIC_SIZE)?.try_into().ok()?;
        match (*self, magic) {
            (MagicHeader::Tiff, header::TIFF_LITTLE_ENDIAN) => Some(Endianness::Little),
            (MagicHeader::Tiff, header::TIFF_BIG_ENDIAN) => Some(Endianness::Big),
            (MagicHeader::Orf, header::ORF_LITTLE_ENDIAN_RO)
            | (MagicHeader::Orf, header::ORF_LITTLE_ENDIAN_RS) => Some(Endianness::Little),
            (MagicHeader::Orf, header::ORF_BIG_ENDIAN) => Some(Endianness::Big),
            (MagicHeader::Rw2, header::RW2_LITTLE_ENDIAN) => Some(Endianness::Little),
            _ => None,
        }
    }

    /// Dialect matching `magic`, trying each in turn
    pub fn sniff(magic: &[u8]) -> Option<(MagicHeader, Endianness)> {
        [MagicHeader::Tiff, MagicHeader::Orf, MagicHeader::Rw2]
            .into_iter()
            .find_map(|dialect| dialect.endianness(magic).map(|e| (dialect, e)))
    }
}

/// Container reading from a byte source
pub struct RawContainer {
    /// Underlying byte source, owned for the decode session
    source: Box<dyn ByteSource>,
    /// Base offset of the container within the source
    offset: u64,
    /// Detected byte order
    endian: Endianness,
    /// Handler for the detected byte order
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Cached source size
    size: Option<u64>,
}

impl RawContainer {
    /// Opens `source` and binds the container at `offset`
    pub fn new(mut source: Box<dyn ByteSource>, offset: u64) -> RawResult<Self> {
        source.open()?;
        source.seek(SeekFrom::Start(offset))?;
        debug!("Container opened at base offset {}", offset);

        Ok(RawContainer {
            source,
            offset,
            endian: Endianness::Undetermined,
            byte_order_handler: None,
            size: None,
        })
    }

    /// Base offset of this container
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Current byte order
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// Sets the byte order explicitly
    pub fn set_endian(&mut self, endian: Endianness) {
        debug!("Container byte order set to {}", endian.name());
        self.endian = endian;
        self.byte_order_handler = endian.create_handler();
    }

    /// Sets the byte order from a magic header
    ///
    /// Unknown magic for the dialect is an [`RawError::InvalidMagic`] error.
    pub fn detect_and_set_endianness(&mut self, magic: &[u8], dialect: MagicHeader) -> RawResult<Endianness> {
        match dialect.endianness(magic) {
            Some(endian) => {
                self.set_endian(endian);
                Ok(endian)
            }
            None => Err(RawError::InvalidMagic(magic.to_vec())),
        }
    }

    /// Handler for the current byte order
    pub fn handler(&self) -> RawResult<&dyn ByteOrderHandler> {
        self.byte_order_handler
            .as_deref()
            .ok_or(RawError::EndianUndetermined)
    }

    /// Moves the cursor to `offset`, relative to the container base
    pub fn seek(&mut self, offset: u64) -> RawResult<u64> {
        let pos = self.source.seek(SeekFrom::Start(self.offset + offset))?;
        Ok(pos - self.offset)
    }

    /// Total size of the container in bytes
    pub fn file_size(&mut self) -> RawResult<u64> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        let total = self.source.size()?;
        let size = total.saturating_sub(self.offset);
        self.size = Some(size);
        Ok(size)
    }

    /// Reads exactly `N` bytes at the cursor
    fn read_array<const N: usize>(&mut self) -> RawResult<[u8; N]> {
        let mut buf = [0u8; N];
        let n = self.source.read(&mut buf)?;
        if n < N {
            return Err(RawError::ShortRead { expected: N, actual: n });
        }
        Ok(buf)
    }

    /// Reads up to `buf.len()` bytes at the cursor, returning the count read
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> RawResult<usize> {
        Ok(self.source.read(buf)?)
    }

    /// Reads one unsigned byte
    pub fn read_u8(&mut self) -> RawResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads one signed byte
    pub fn read_i8(&mut self) -> RawResult<i8> {
        Ok(self.read_array::<1>()?[0] as i8)
    }

    /// Reads a u16 in the container byte order
    pub fn read_u16(&mut self) -> RawResult<u16> {
        self.handler()?;
        let bytes = self.read_array::<2>()?;
        Ok(self.handler()?.read_u16(&mut &bytes[..])?)
    }

    /// Reads an i16 in the container byte order
    pub fn read_i16(&mut self) -> RawResult<i16> {
        self.handler()?;
        let bytes = self.read_array::<2>()?;
        Ok(self.handler()?.read_i16(&mut &bytes[..])?)
    }

    /// Reads a u32 in the container byte order
    pub fn read_u32(&mut self) -> RawResult<u32> {
        self.handler()?;
        let bytes = self.read_array::<4>()?;
        Ok(self.handler()?.read_u32(&mut &bytes[..])?)
    }

    /// Reads an i32 in the container byte order
    pub fn read_i32(&mut self) -> RawResult<i32> {
        self.handler()?;
        let bytes = self.read_array::<4>()?;
        Ok(self.handler()?.read_i32(&mut &bytes[..])?)
    }

    /// Reads `size` bytes at `offset`, independent of the cursor
    ///
    /// Fails with [`RawError::ShortRead`] when fewer bytes are available.
    pub fn fetch_block(&mut self, offset: u64, size: usize) -> RawResult<Vec<u8>> {
        trace!("Fetching {} bytes at offset {}", size, offset);
        let available = self.file_size()?.saturating_sub(offset);
        if (size as u64) > available {
            return Err(RawError::ShortRead {
                expected: size,
                actual: available as usize,
            });
        }

        self.seek(offset)?;
        let mut buf = vec![0u8; size];
        let n = self.source.read(&mut buf)?;
        if n < size {
            return Err(RawError::ShortRead { expected: size, actual: n });
        }
        Ok(buf)
    }

    /// Reads whatever is available of `size` bytes at `offset`
    ///
    /// Used where vendors declare byte counts past the end of the file.
    pub fn fetch_available(&mut self, offset: u64, size: usize) -> RawResult<Vec<u8>> {
        let available = self.file_size()?.saturating_sub(offset);
        let len = size.min(available as usize);
        if len < size {
            debug!("Block at {} truncated from {} to {} bytes", offset, size, len);
        }
        self.fetch_block(offset, len)
    }
}

impl Drop for RawContainer {
    fn drop(&mut self) {
        self.source.close();
    }
}
