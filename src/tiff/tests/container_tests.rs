//! I/O pattern tests for entry materialisation

use crate::io::byte_order::Endianness;
use crate::tiff::container::{MagicHeader, RawContainer};
use crate::tiff::ifd::IfdDir;
use crate::tiff::ifd_container::IfdFileContainer;
use crate::tiff::tests::test_utils::{CountingSource, Entry, FixtureBuilder};

fn fixture() -> Vec<u8> {
    let mut builder = FixtureBuilder::tiff_le(8);
    builder.ifd_at(
        8,
        &[
            Entry::short(256, 640),
            Entry::shorts(258, &[12, 12]),
            Entry::longs(273, &[1000, 2000, 3000]),
        ],
        0,
    );
    builder.finish()
}

#[test]
fn inline_values_need_no_reads() {
    let (source, reads) = CountingSource::new(fixture());
    let mut file = IfdFileContainer::open(Box::new(source), 0, MagicHeader::Tiff).unwrap();
    let dir = file.set_directory(0).unwrap().unwrap();
    let container = file.raw();

    let before = reads.get();
    std::assert_eq!(dir.get_value::<u16>(container, 256), Some(640));
    std::assert_eq!(dir.get_array::<u16>(container, 258), Some(vec![12, 12]));
    std::assert_eq!(reads.get(), before);
}

#[test]
fn out_of_line_values_use_one_fetch() {
    let (source, reads) = CountingSource::new(fixture());
    let mut file = IfdFileContainer::open(Box::new(source), 0, MagicHeader::Tiff).unwrap();
    let dir = file.set_directory(0).unwrap().unwrap();
    let container = file.raw();

    let before = reads.get();
    std::assert_eq!(dir.get_array::<u32>(container, 273), Some(vec![1000, 2000, 3000]));
    std::assert_eq!(reads.get(), before + 1);

    let before = reads.get();
    std::assert_eq!(dir.get_value::<u32>(container, 273), Some(1000));
    std::assert_eq!(reads.get(), before + 1);
}

#[test]
fn out_of_line_data_matches_recorded_offset() {
    let (source, _) = CountingSource::new(fixture());
    let mut file = IfdFileContainer::open(Box::new(source), 0, MagicHeader::Tiff).unwrap();
    let dir = file.set_directory(0).unwrap().unwrap();
    let entry = dir.get_entry(273).unwrap().clone();
    std::assert!(!entry.is_inline());

    let container = file.raw();
    let data = entry.load_data(container).unwrap();
    let direct = container.fetch_block(entry.value_offset() as u64, 12).unwrap();
    std::assert_eq!(data, direct);
}

#[test]
fn container_at_base_offset() {
    let mut bytes = vec![0xFF; 16];
    bytes.extend(fixture());
    let (source, _) = CountingSource::new(bytes);

    let mut file = IfdFileContainer::open(Box::new(source), 16, MagicHeader::Tiff).unwrap();
    std::assert_eq!(file.endian(), Endianness::Little);
    let dir = file.set_directory(0).unwrap().unwrap();
    std::assert_eq!(dir.get_array::<u32>(file.raw(), 273), Some(vec![1000, 2000, 3000]));
}

#[test]
fn directory_without_byte_order_fails() {
    let (source, _) = CountingSource::new(fixture());
    let mut container = RawContainer::new(Box::new(source), 0).unwrap();
    std::assert!(IfdDir::open(&mut container, 8).is_err());
}
