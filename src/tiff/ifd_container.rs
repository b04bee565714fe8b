//! TIFF-derived file container
//!
//! [`IfdFileContainer`] specialises [`RawContainer`] for files made of a
//! magic header followed by a chain of directories.

use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::io::byte_order::Endianness;
use crate::io::byte_source::ByteSource;
use crate::tiff::constants::{header, layout};
use crate::tiff::container::{MagicHeader, RawContainer};
use crate::tiff::errors::{RawError, RawResult};
use crate::tiff::ifd::IfdDir;

/// Container over a TIFF-derived file
pub struct IfdFileContainer {
    container: RawContainer,
    dialect: MagicHeader,
    first_directory_offset: u32,
    /// Main directory chain, read on first use
    directories: Option<Vec<Rc<IfdDir>>>,
}

impl IfdFileContainer {
    /// Opens `source` at `offset` and reads the `dialect` header
    pub fn open(source: Box<dyn ByteSource>, offset: u64, dialect: MagicHeader) -> RawResult<Self> {
        let mut container = RawContainer::new(source, offset)?;

        let mut magic = [0u8; header::MAGIC_SIZE];
        let n = container.read_bytes(&mut magic)?;
        if n < magic.len() {
            return Err(RawError::ShortRead { expected: magic.len(), actual: n });
        }
        let endian = container.detect_and_set_endianness(&magic, dialect)?;
        let first_directory_offset = container.read_u32()?;

        info!(
            "Opened {:?} container, {}, first directory at {}",
            dialect,
            endian.name(),
            first_directory_offset
        );

        Ok(IfdFileContainer {
            container,
            dialect,
            first_directory_offset,
            directories: None,
        })
    }

    /// The underlying container
    pub fn raw(&mut self) -> &mut RawContainer {
        &mut self.container
    }

    /// Header dialect
    pub fn dialect(&self) -> MagicHeader {
        self.dialect
    }

    /// Byte order announced by the header
    pub fn endian(&self) -> Endianness {
        self.container.endian()
    }

    /// Offset of the first directory
    pub fn first_directory_offset(&self) -> u64 {
        self.first_directory_offset as u64
    }

    /// The main directory chain
    ///
    /// Traversal stops at a zero link, at an offset already visited, or after
    /// a fixed number of directories. A first directory that cannot be read
    /// is an error; later failures end the chain.
    pub fn directories(&mut self) -> RawResult<Vec<Rc<IfdDir>>> {
        if let Some(dirs) = &self.directories {
            return Ok(dirs.clone());
        }

        let mut dirs = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.first_directory_offset());

        while let Some(offset) = next {
            if dirs.len() >= layout::MAX_CHAIN_LENGTH {
                warn!("Directory chain longer than {}, stopping", layout::MAX_CHAIN_LENGTH);
                break;
            }
            if !visited.insert(offset) {
                warn!("Directory chain loops back to offset {}, stopping", offset);
                break;
            }

            match IfdDir::open(&mut self.container, offset) {
                Ok(dir) => {
                    next = dir.next_directory_offset();
                    dirs.push(dir);
                }
                Err(e) if dirs.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Directory at {} unreadable, ending chain: {}", offset, e);
                    break;
                }
            }
        }

        debug!("Main chain holds {} directories", dirs.len());
        self.directories = Some(dirs.clone());
        Ok(dirs)
    }

    /// Number of directories in the main chain
    pub fn count_directories(&mut self) -> RawResult<usize> {
        Ok(self.directories()?.len())
    }

    /// Directory `index` of the main chain
    pub fn set_directory(&mut self, index: usize) -> RawResult<Option<Rc<IfdDir>>> {
        Ok(self.directories()?.get(index).cloned())
    }
}
