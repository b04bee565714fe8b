//! Image File Directory (IFD) structures and methods
//!
//! A directory is a table of tagged entries bound to an offset in a
//! [`RawContainer`]. Directories form chains through their next-directory
//! link and trees through SubIFDs, EXIF and MakerNote children.
//!
//! Directories hold no reference to their container. Every operation that
//! needs I/O takes the container explicitly, and loaded directories are
//! shared through `Rc`.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::tiff::constants::{layout, tags};
use crate::tiff::container::RawContainer;
use crate::tiff::errors::{RawError, RawResult};
use crate::tiff::types::{IfdType, IfdTypeTrait};
use crate::tiff::validation;
use crate::utils::tag_utils;

/// One entry of a directory table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdEntry {
    /// Tag identifier
    pub tag: u16,
    /// Field type code
    pub type_code: u16,
    /// Number of values
    pub count: u32,
    /// Raw value-or-offset field, in file byte order
    data: [u8; 4],
    /// The value-or-offset field decoded as an offset
    value_offset: u32,
}

impl IfdEntry {
    /// Creates an entry from its decoded fields
    pub fn new(tag: u16, type_code: u16, count: u32, data: [u8; 4], value_offset: u32) -> Self {
        IfdEntry {
            tag,
            type_code,
            count,
            data,
            value_offset,
        }
    }

    /// Field type, `None` for unknown codes
    pub fn field_type(&self) -> Option<IfdType> {
        IfdType::from_code(self.type_code)
    }

    /// Total size of the entry's values in bytes
    pub fn byte_size(&self) -> u64 {
        IfdType::unit_size_of(self.type_code) as u64 * self.count as u64
    }

    /// Whether the values are stored inside the entry record
    pub fn is_inline(&self) -> bool {
        self.byte_size() <= layout::INLINE_VALUE_SIZE
    }

    /// Offset of out-of-line values, relative to the container base
    pub fn value_offset(&self) -> u32 {
        self.value_offset
    }

    /// Raw bytes of all values
    ///
    /// Inline values come from the entry record; out-of-line values are read
    /// with a single block fetch at the recorded offset.
    pub fn load_data(&self, container: &mut RawContainer) -> RawResult<Vec<u8>> {
        let size = self.byte_size() as usize;
        if self.is_inline() {
            return Ok(self.data[..size].to_vec());
        }
        container.fetch_block(self.value_offset as u64, size)
    }

    fn check_type<T: IfdTypeTrait>(&self) -> RawResult<IfdType> {
        match self.field_type() {
            Some(field_type) if T::accepts(field_type) => Ok(field_type),
            _ => Err(RawError::TypeMismatch {
                tag: self.tag,
                expected: T::EXPECTED,
                found: self.type_code,
            }),
        }
    }

    /// Materialises the value at `index` as `T`
    pub fn get_value<T: IfdTypeTrait>(&self, container: &mut RawContainer, index: usize) -> RawResult<T> {
        let field_type = self.check_type::<T>()?;
        if index >= self.count as usize {
            return Err(RawError::ValueOutOfRange {
                tag: self.tag,
                index,
                count: self.count,
            });
        }

        let unit = field_type.unit_size();
        let start = index * unit;
        if self.is_inline() {
            return T::from_entry_bytes(&self.data[start..], unit, container.handler()?);
        }

        let bytes = container.fetch_block(self.value_offset as u64 + start as u64, unit)?;
        T::from_entry_bytes(&bytes, unit, container.handler()?)
    }

    /// Materialises all values as `T`
    pub fn get_array<T: IfdTypeTrait>(&self, container: &mut RawContainer) -> RawResult<Vec<T>> {
        let field_type = self.check_type::<T>()?;
        let unit = field_type.unit_size();
        let bytes = self.load_data(container)?;
        let handler = container.handler()?;

        bytes
            .chunks_exact(unit)
            .map(|chunk| T::from_entry_bytes(chunk, unit, handler))
            .collect()
    }

    /// Materialises the value at `index` as an unsigned integer
    ///
    /// Byte, Short and Long values are coerced uniformly.
    pub fn get_integer(&self, container: &mut RawContainer, index: usize) -> RawResult<u32> {
        match self.field_type() {
            Some(IfdType::Byte) | Some(IfdType::Undefined) => {
                self.get_value::<u8>(container, index).map(u32::from)
            }
            Some(IfdType::Short) => self.get_value::<u16>(container, index).map(u32::from),
            Some(IfdType::Long) | Some(IfdType::Ifd) => self.get_value::<u32>(container, index),
            _ => Err(RawError::TypeMismatch {
                tag: self.tag,
                expected: "integer",
                found: self.type_code,
            }),
        }
    }

    /// Materialises all values as unsigned integers
    pub fn get_integer_array(&self, container: &mut RawContainer) -> RawResult<Vec<u32>> {
        match self.field_type() {
            Some(IfdType::Byte) | Some(IfdType::Undefined) => {
                Ok(self.get_array::<u8>(container)?.into_iter().map(u32::from).collect())
            }
            Some(IfdType::Short) => {
                Ok(self.get_array::<u16>(container)?.into_iter().map(u32::from).collect())
            }
            Some(IfdType::Long) | Some(IfdType::Ifd) => self.get_array::<u32>(container),
            _ => Err(RawError::TypeMismatch {
                tag: self.tag,
                expected: "integer",
                found: self.type_code,
            }),
        }
    }

    /// Materialises an ASCII value, trimmed at the first NUL
    pub fn get_string(&self, container: &mut RawContainer) -> RawResult<String> {
        match self.field_type() {
            Some(IfdType::Ascii) | Some(IfdType::Byte) | Some(IfdType::Undefined) => {
                let mut bytes = self.load_data(container)?;
                if let Some(end) = bytes.iter().position(|&b| b == 0) {
                    bytes.truncate(end);
                }
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => Err(RawError::TypeMismatch {
                tag: self.tag,
                expected: "ASCII",
                found: self.type_code,
            }),
        }
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        let value = if self.is_inline() {
            format!("inline {:02x?}", &self.data[..self.byte_size() as usize])
        } else {
            format!("@{}", self.value_offset)
        };
        format!(
            "Tag: {} ({}), Type: {} ({}), Count: {}, Value: {}",
            self.tag,
            tag_utils::get_tag_name(self.tag),
            self.type_code,
            tag_utils::get_field_type_name(self.type_code),
            self.count,
            value
        )
    }
}

/// Well-known child directories reachable from a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedDirectory {
    /// EXIF directory (tag 34665)
    Exif,
    /// Vendor MakerNote directory (tag 37500)
    MakerNote,
}

impl NamedDirectory {
    /// Tag holding the child directory
    pub fn tag(&self) -> u16 {
        match self {
            NamedDirectory::Exif => tags::EXIF_IFD,
            NamedDirectory::MakerNote => tags::MAKER_NOTE,
        }
    }
}

/// Represents an Image File Directory
#[derive(Debug, Clone, Default)]
pub struct IfdDir {
    /// Offset of this directory, relative to the container base
    offset: u64,
    /// Entries by tag; the last entry wins on duplicate tags
    entries: BTreeMap<u16, IfdEntry>,
    /// Next-directory link, zero at the end of a chain
    next_offset: u32,
    loaded: bool,
}

impl IfdDir {
    /// Creates an unloaded directory at `offset`
    pub fn new(offset: u64) -> Self {
        IfdDir {
            offset,
            ..Default::default()
        }
    }

    /// Loads the directory at `offset` and wraps it for sharing
    pub fn open(container: &mut RawContainer, offset: u64) -> RawResult<Rc<IfdDir>> {
        let mut dir = IfdDir::new(offset);
        dir.load(container)?;
        Ok(Rc::new(dir))
    }

    /// Offset of this directory
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether the table has been read
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reads the entry table and the next-directory link
    ///
    /// Loading is idempotent. A truncated table is reported as
    /// [`RawError::StructuralCorruption`].
    pub fn load(&mut self, container: &mut RawContainer) -> RawResult<()> {
        if self.loaded {
            return Ok(());
        }

        match self.read_table(container) {
            Ok(()) => {
                self.loaded = true;
                Ok(())
            }
            Err(RawError::ShortRead { expected, actual }) => {
                Err(RawError::StructuralCorruption(format!(
                    "Directory at {} is truncated: needed {} bytes, got {}",
                    self.offset, expected, actual
                )))
            }
            Err(e) => Err(e),
        }
    }

    fn read_table(&mut self, container: &mut RawContainer) -> RawResult<()> {
        let file_size = container.file_size()?;
        validation::validate_directory_offset(self.offset, file_size)?;

        container.seek(self.offset)?;
        let count = container.read_u16()?;
        validation::validate_entry_count(count, self.offset)?;
        debug!("Reading directory at offset {} with {} entries", self.offset, count);

        let table_offset = self.offset + layout::ENTRY_COUNT_SIZE;
        let table = container.fetch_block(table_offset, count as usize * layout::ENTRY_SIZE as usize)?;
        let next_offset = container.read_u32()?;
        let handler = container.handler()?;

        let mut entries = BTreeMap::new();
        for record in table.chunks_exact(layout::ENTRY_SIZE as usize) {
            let tag = handler.read_u16(&mut &record[0..2])?;
            let type_code = handler.read_u16(&mut &record[2..4])?;
            let count = handler.read_u32(&mut &record[4..8])?;
            let data = [record[8], record[9], record[10], record[11]];
            let value_offset = handler.read_u32(&mut &record[8..12])?;

            let entry = IfdEntry::new(tag, type_code, count, data, value_offset);
            trace!("{}", entry.description());
            if entries.insert(tag, entry).is_some() {
                debug!("Duplicate tag {} in directory at {}, keeping the last", tag, self.offset);
            }
        }

        self.entries = entries;
        self.next_offset = next_offset;
        Ok(())
    }

    /// Entries in tag order
    pub fn entries(&self) -> impl Iterator<Item = &IfdEntry> {
        self.entries.values()
    }

    /// Number of entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Exact lookup of a tag
    pub fn get_entry(&self, tag: u16) -> Option<&IfdEntry> {
        let entry = self.entries.get(&tag);
        if entry.is_none() {
            trace!("Tag {} ({}) not found in directory at {}", tag, tag_utils::get_tag_name(tag), self.offset);
        }
        entry
    }

    /// First value of `tag` as `T`
    ///
    /// Returns `None` both when the tag is absent and when its value cannot
    /// be coerced to `T`. Use [`IfdDir::get_value_strict`] to tell them apart.
    pub fn get_value<T: IfdTypeTrait>(&self, container: &mut RawContainer, tag: u16) -> Option<T> {
        match self.get_value_strict(container, tag) {
            Ok(value) => value,
            Err(e) => {
                debug!("Tag {} ({}): {}", tag, tag_utils::get_tag_name(tag), e);
                None
            }
        }
    }

    /// First value of `tag` as `T`, reporting coercion failures
    pub fn get_value_strict<T: IfdTypeTrait>(
        &self,
        container: &mut RawContainer,
        tag: u16,
    ) -> RawResult<Option<T>> {
        match self.entries.get(&tag) {
            Some(entry) => entry.get_value(container, 0).map(Some),
            None => Ok(None),
        }
    }

    /// First value of `tag` as an unsigned integer of any width
    pub fn get_integer_value(&self, container: &mut RawContainer, tag: u16) -> Option<u32> {
        let entry = self.entries.get(&tag)?;
        match entry.get_integer(container, 0) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Tag {} ({}): {}", tag, tag_utils::get_tag_name(tag), e);
                None
            }
        }
    }

    /// All values of `tag` as `T`
    pub fn get_array<T: IfdTypeTrait>(&self, container: &mut RawContainer, tag: u16) -> Option<Vec<T>> {
        let entry = self.entries.get(&tag)?;
        match entry.get_array(container) {
            Ok(values) => Some(values),
            Err(e) => {
                debug!("Tag {} ({}): {}", tag, tag_utils::get_tag_name(tag), e);
                None
            }
        }
    }

    /// All values of `tag` as unsigned integers of any width
    pub fn get_integer_array(&self, container: &mut RawContainer, tag: u16) -> Option<Vec<u32>> {
        let entry = self.entries.get(&tag)?;
        match entry.get_integer_array(container) {
            Ok(values) => Some(values),
            Err(e) => {
                debug!("Tag {} ({}): {}", tag, tag_utils::get_tag_name(tag), e);
                None
            }
        }
    }

    /// Value of an ASCII tag
    pub fn get_string(&self, container: &mut RawContainer, tag: u16) -> Option<String> {
        self.entries.get(&tag)?.get_string(container).ok()
    }

    /// Next directory in the chain, `None` when the link is zero
    pub fn next_directory_offset(&self) -> Option<u64> {
        if self.next_offset == 0 {
            None
        } else {
            Some(self.next_offset as u64)
        }
    }

    /// Image dimensions, if both tags are present
    pub fn get_dimensions(&self, container: &mut RawContainer) -> Option<(u32, u32)> {
        let width = self.get_integer_value(container, tags::IMAGE_WIDTH)?;
        let height = self.get_integer_value(container, tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Child directories listed in `tag`
    ///
    /// Children that fail to load are skipped with a warning.
    pub fn get_sub_directories(&self, container: &mut RawContainer, tag: u16) -> Vec<Rc<IfdDir>> {
        let offsets = match self.get_integer_array(container, tag) {
            Some(offsets) => offsets,
            None => return Vec::new(),
        };

        let mut children = Vec::with_capacity(offsets.len());
        for offset in offsets {
            match IfdDir::open(container, offset as u64) {
                Ok(dir) => children.push(dir),
                Err(e) => warn!("Skipping child directory at {}: {}", offset, e),
            }
        }
        debug!("Directory at {} has {} children under tag {}", self.offset, children.len(), tag);
        children
    }

    /// EXIF or MakerNote child directory
    ///
    /// MakerNotes with a known vendor header are opened at their table
    /// start. Layouts whose offsets are relative to the MakerNote itself are
    /// not supported and yield `None`.
    pub fn get_named_sub_directory(
        &self,
        container: &mut RawContainer,
        name: NamedDirectory,
    ) -> Option<Rc<IfdDir>> {
        let entry = self.entries.get(&name.tag())?;
        let offset = match name {
            NamedDirectory::Exif => entry.get_integer(container, 0).ok()? as u64,
            NamedDirectory::MakerNote => {
                if entry.is_inline() {
                    return None;
                }
                let base = entry.value_offset() as u64;
                let header = container.fetch_available(base, 12).ok()?;
                base + makernote_table_start(&header)?
            }
        };

        match IfdDir::open(container, offset) {
            Ok(dir) => Some(dir),
            Err(e) => {
                warn!("Could not load {:?} directory at {}: {}", name, offset, e);
                None
            }
        }
    }
}

/// Offset of the entry table from the start of a MakerNote
fn makernote_table_start(header: &[u8]) -> Option<u64> {
    if header.starts_with(b"OLYMPUS\0") || header.starts_with(b"Nikon\0") {
        debug!("MakerNote uses self-relative offsets, not supported");
        None
    } else if header.starts_with(b"OLYMP\0") {
        Some(8)
    } else if header.starts_with(b"AOC\0") {
        Some(6)
    } else {
        Some(0)
    }
}

impl fmt::Display for IfdDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Directory (offset: {})", self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;
        writeln!(f, "  Tags:")?;
        for entry in self.entries.values() {
            writeln!(
                f,
                "    {} ({}): count {} [{}]",
                entry.tag,
                tag_utils::get_tag_name(entry.tag),
                entry.count,
                tag_utils::get_field_type_name(entry.type_code)
            )?;
        }
        if let Some(next) = self.next_directory_offset() {
            writeln!(f, "  Next directory: {}", next)?;
        }
        Ok(())
    }
}
