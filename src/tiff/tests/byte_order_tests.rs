//! Tests for the byte order module

extern crate std;

use std::io::Cursor;
use byteorder::{LittleEndian, BigEndian, WriteBytesExt};
use crate::io::byte_order::{Endianness, ByteOrderHandler, LittleEndianHandler, BigEndianHandler};
use crate::tiff::container::MagicHeader;

#[test]
fn test_magic_little_endian() {
    std::assert_eq!(MagicHeader::Tiff.endianness(b"II*\0"), Some(Endianness::Little));
    std::assert_eq!(MagicHeader::Orf.endianness(b"IIRO"), Some(Endianness::Little));
}

#[test]
fn test_magic_big_endian() {
    std::assert_eq!(MagicHeader::Tiff.endianness(b"MM\0*"), Some(Endianness::Big));
    std::assert_eq!(MagicHeader::Orf.endianness(b"MMOR"), Some(Endianness::Big));
}

#[test]
fn test_magic_invalid() {
    std::assert_eq!(MagicHeader::Tiff.endianness(b"IIRO"), None);
    std::assert_eq!(MagicHeader::Tiff.endianness(b"II"), None);
}

#[test]
fn test_undetermined_has_no_handler() {
    std::assert!(Endianness::Undetermined.create_handler().is_none());
    std::assert!(Endianness::Little.create_handler().is_some());
}

#[test]
fn test_little_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    buffer.write_u32::<LittleEndian>(0x12345678).unwrap();
    buffer.write_i16::<LittleEndian>(-2).unwrap();
    buffer.write_u32::<LittleEndian>(3).unwrap();
    buffer.write_u32::<LittleEndian>(4).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = LittleEndianHandler;

    std::assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    std::assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    std::assert_eq!(handler.read_i16(&mut cursor).unwrap(), -2);
    std::assert_eq!(handler.read_rational(&mut cursor).unwrap(), (3, 4));
}

#[test]
fn test_big_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x1234).unwrap();
    buffer.write_u32::<BigEndian>(0x12345678).unwrap();
    buffer.write_i32::<BigEndian>(-7).unwrap();
    buffer.write_f64::<BigEndian>(1.5).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = BigEndianHandler;

    std::assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    std::assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    std::assert_eq!(handler.read_i32(&mut cursor).unwrap(), -7);
    std::assert_eq!(handler.read_f64(&mut cursor).unwrap(), 1.5);
}

#[test]
fn test_mirrored_vectors() {
    let bytes = [0xDE, 0xAD, 0xBE, 0xEF];
    let le = LittleEndianHandler.read_u32(&mut &bytes[..]).unwrap();
    let be = BigEndianHandler.read_u32(&mut &bytes[..]).unwrap();
    std::assert_eq!(le, 0xEFBEADDE);
    std::assert_eq!(be, 0xDEADBEEF);
    std::assert_eq!(le.swap_bytes(), be);
}
