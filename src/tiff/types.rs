//! Directory entry field types and typed value coercion
//!
//! Every directory entry carries a field type code. Materialising a value
//! goes through [`IfdTypeTrait`], which decides which field types a Rust type
//! accepts and how one value is decoded from the entry's bytes.

use std::fmt;
use std::io::Read;

use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::field_types;
use crate::tiff::errors::{RawError, RawResult};

/// Field type of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfdType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
    Ifd,
}

impl IfdType {
    /// Maps a field type code to its type, `None` for unknown codes
    pub fn from_code(code: u16) -> Option<IfdType> {
        match code {
            field_types::BYTE => Some(IfdType::Byte),
            field_types::ASCII => Some(IfdType::Ascii),
            field_types::SHORT => Some(IfdType::Short),
            field_types::LONG => Some(IfdType::Long),
            field_types::RATIONAL => Some(IfdType::Rational),
            field_types::SBYTE => Some(IfdType::SByte),
            field_types::UNDEFINED => Some(IfdType::Undefined),
            field_types::SSHORT => Some(IfdType::SShort),
            field_types::SLONG => Some(IfdType::SLong),
            field_types::SRATIONAL => Some(IfdType::SRational),
            field_types::FLOAT => Some(IfdType::Float),
            field_types::DOUBLE => Some(IfdType::Double),
            field_types::IFD => Some(IfdType::Ifd),
            _ => None,
        }
    }

    /// Size in bytes of one value of this type
    pub fn unit_size(&self) -> usize {
        match self {
            IfdType::Byte | IfdType::Ascii | IfdType::SByte | IfdType::Undefined => 1,
            IfdType::Short | IfdType::SShort => 2,
            IfdType::Long | IfdType::SLong | IfdType::Float | IfdType::Ifd => 4,
            IfdType::Rational | IfdType::SRational | IfdType::Double => 8,
        }
    }

    /// Size in bytes of a field type code, 0 for unknown codes
    pub fn unit_size_of(code: u16) -> usize {
        IfdType::from_code(code).map_or(0, |t| t.unit_size())
    }
}

impl fmt::Display for IfdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Unsigned rational value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: u32,
    pub denom: u32,
}

/// Signed rational value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SRational {
    pub num: i32,
    pub denom: i32,
}

/// Coercion of directory entry bytes into a Rust value
pub trait IfdTypeTrait: Sized {
    /// Human readable name used in type mismatch errors
    const EXPECTED: &'static str;

    /// Whether values of `field_type` can be materialised as `Self`
    fn accepts(field_type: IfdType) -> bool;

    /// Decodes one value from the front of `reader`
    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self>;

    /// Decodes one value from a byte slice holding at least one unit
    fn from_entry_bytes(bytes: &[u8], unit: usize, handler: &dyn ByteOrderHandler) -> RawResult<Self> {
        if bytes.len() < unit {
            return Err(RawError::ShortRead {
                expected: unit,
                actual: bytes.len(),
            });
        }
        let mut cursor = bytes;
        Ok(Self::read_one(&mut cursor, handler)?)
    }
}

impl IfdTypeTrait for u8 {
    const EXPECTED: &'static str = "BYTE";

    fn accepts(field_type: IfdType) -> bool {
        matches!(field_type, IfdType::Byte | IfdType::Undefined | IfdType::Ascii)
    }

    fn read_one(reader: &mut dyn Read, _handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        let mut b = [0u8; 1];
        reader.read_exact(&mut b)?;
        Ok(b[0])
    }
}

impl IfdTypeTrait for i8 {
    const EXPECTED: &'static str = "SBYTE";

    fn accepts(field_type: IfdType) -> bool {
        field_type == IfdType::SByte
    }

    fn read_one(reader: &mut dyn Read, _handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        let mut b = [0u8; 1];
        reader.read_exact(&mut b)?;
        Ok(b[0] as i8)
    }
}

impl IfdTypeTrait for u16 {
    const EXPECTED: &'static str = "SHORT";

    fn accepts(field_type: IfdType) -> bool {
        field_type == IfdType::Short
    }

    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        handler.read_u16(reader)
    }
}

impl IfdTypeTrait for i16 {
    const EXPECTED: &'static str = "SSHORT";

    fn accepts(field_type: IfdType) -> bool {
        field_type == IfdType::SShort
    }

    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        handler.read_i16(reader)
    }
}

impl IfdTypeTrait for u32 {
    const EXPECTED: &'static str = "LONG";

    fn accepts(field_type: IfdType) -> bool {
        matches!(field_type, IfdType::Long | IfdType::Ifd)
    }

    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        handler.read_u32(reader)
    }
}

impl IfdTypeTrait for i32 {
    const EXPECTED: &'static str = "SLONG";

    fn accepts(field_type: IfdType) -> bool {
        field_type == IfdType::SLong
    }

    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        handler.read_i32(reader)
    }
}

impl IfdTypeTrait for Rational {
    const EXPECTED: &'static str = "RATIONAL";

    fn accepts(field_type: IfdType) -> bool {
        field_type == IfdType::Rational
    }

    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        let (num, denom) = handler.read_rational(reader)?;
        Ok(Rational { num, denom })
    }
}

impl IfdTypeTrait for SRational {
    const EXPECTED: &'static str = "SRATIONAL";

    fn accepts(field_type: IfdType) -> bool {
        field_type == IfdType::SRational
    }

    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        let (num, denom) = handler.read_srational(reader)?;
        Ok(SRational { num, denom })
    }
}

impl IfdTypeTrait for f32 {
    const EXPECTED: &'static str = "FLOAT";

    fn accepts(field_type: IfdType) -> bool {
        field_type == IfdType::Float
    }

    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        handler.read_f32(reader)
    }
}

impl IfdTypeTrait for f64 {
    const EXPECTED: &'static str = "DOUBLE";

    fn accepts(field_type: IfdType) -> bool {
        field_type == IfdType::Double
    }

    fn read_one(reader: &mut dyn Read, handler: &dyn ByteOrderHandler) -> std::io::Result<Self> {
        handler.read_f64(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::{BigEndianHandler, LittleEndianHandler};

    #[test]
    fn unit_sizes() {
        assert_eq!(IfdType::unit_size_of(field_types::SHORT), 2);
        assert_eq!(IfdType::unit_size_of(field_types::RATIONAL), 8);
        assert_eq!(IfdType::unit_size_of(field_types::IFD), 4);
        assert_eq!(IfdType::unit_size_of(99), 0);
    }

    #[test]
    fn decodes_per_byte_order() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(u16::from_entry_bytes(&bytes, 2, &LittleEndianHandler).unwrap(), 0x3412);
        assert_eq!(u16::from_entry_bytes(&bytes, 2, &BigEndianHandler).unwrap(), 0x1234);
        assert_eq!(u32::from_entry_bytes(&bytes, 4, &BigEndianHandler).unwrap(), 0x12345678);
    }

    #[test]
    fn short_slice_is_an_error() {
        let err = u32::from_entry_bytes(&[1, 2], 4, &LittleEndianHandler).unwrap_err();
        assert!(matches!(err, RawError::ShortRead { expected: 4, actual: 2 }));
    }

    #[test]
    fn accepted_families() {
        assert!(u32::accepts(IfdType::Long));
        assert!(!u32::accepts(IfdType::Short));
        assert!(u8::accepts(IfdType::Undefined));
        assert!(!f64::accepts(IfdType::Rational));
    }
}
