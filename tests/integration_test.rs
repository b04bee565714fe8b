//! Integration tests for the RAW drivers

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use rawkit::io::StreamSource;
use rawkit::raw::{open_raw_file, CfaPattern, DataType, RawFile, RawFileType, RawOptions};
use rawkit::tiff::constants::{compression, photometric, rw2_tags, tags};
use rawkit::{RawError, RawKit};

// Field types used by the fixtures
const BYTE: u16 = 1;
const SHORT: u16 = 3;
const LONG: u16 = 4;

/// Little-endian container image, written piece by piece
struct Fixture {
    buf: Vec<u8>,
}

impl Fixture {
    fn new(magic: &[u8; 4], first_ifd: u32) -> Self {
        let mut buf = magic.to_vec();
        buf.write_u32::<LittleEndian>(first_ifd).unwrap();
        Fixture { buf }
    }

    fn tiff(first_ifd: u32) -> Self {
        Fixture::new(b"II*\0", first_ifd)
    }

    fn put(&mut self, offset: u32, bytes: &[u8]) {
        let end = offset as usize + bytes.len();
        if self.buf.len() < end {
            self.buf.resize(end, 0);
        }
        self.buf[offset as usize..end].copy_from_slice(bytes);
    }

    /// Writes a directory; values over four bytes go right after the table
    fn ifd(&mut self, offset: u32, entries: &[(u16, u16, Vec<u32>)], next: u32) {
        let mut table = Vec::new();
        table.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
        let mut data_at = offset + 2 + 12 * entries.len() as u32 + 4;
        let mut extra = Vec::new();

        for (tag, field_type, values) in entries {
            let mut data = Vec::new();
            for &v in values {
                match *field_type {
                    BYTE => data.push(v as u8),
                    SHORT => data.write_u16::<LittleEndian>(v as u16).unwrap(),
                    _ => data.write_u32::<LittleEndian>(v).unwrap(),
                }
            }
            table.write_u16::<LittleEndian>(*tag).unwrap();
            table.write_u16::<LittleEndian>(*field_type).unwrap();
            table.write_u32::<LittleEndian>(values.len() as u32).unwrap();
            if data.len() <= 4 {
                data.resize(4, 0);
                table.extend_from_slice(&data);
            } else {
                table.write_u32::<LittleEndian>(data_at).unwrap();
                extra.push((data_at, data.clone()));
                data_at += (data.len() as u32 + 1) & !1;
            }
        }
        table.write_u32::<LittleEndian>(next).unwrap();

        self.put(offset, &table);
        for (at, data) in extra {
            self.put(at, &data);
        }
    }

    fn open(&self, file_type: RawFileType) -> Box<dyn RawFile> {
        open_raw_file(Box::new(StreamSource::from_bytes(self.buf.clone())), file_type).unwrap()
    }
}

fn short(tag: u16, v: u32) -> (u16, u16, Vec<u32>) {
    (tag, SHORT, vec![v])
}

fn long(tag: u16, v: u32) -> (u16, u16, Vec<u32>) {
    (tag, LONG, vec![v])
}

// Lossless JPEG of a 3x2, 8-bit grid decoding to 129 128 130 / 129 131 128
fn ljpeg_3x2() -> Vec<u8> {
    [
        &[0xFF, 0xD8][..],
        &[
            0xFF, 0xC4, 0x00, 0x16, 0x00, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02,
        ],
        &[0xFF, 0xC3, 0x00, 0x0B, 0x08, 0x00, 0x02, 0x00, 0x03, 0x01, 0x01, 0x11, 0x00],
        &[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x02, 0x00, 0x00],
        &[0xB3, 0x4D, 0xE7],
        &[0xFF, 0xD9],
    ]
    .concat()
}

// Baseline JPEG header announcing `width` x `height`
fn jpeg_preview(width: u16, height: u16) -> Vec<u8> {
    let [wh, wl] = width.to_be_bytes();
    let [hh, hl] = height.to_be_bytes();
    vec![
        0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x0B, 0x08, hh, hl, wh, wl, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xD9,
    ]
}

fn orf_fixture(strip_len: u32) -> Fixture {
    let mut f = Fixture::new(b"IIRO", 8);
    f.ifd(
        8,
        &[
            long(tags::IMAGE_WIDTH, 100),
            long(tags::IMAGE_LENGTH, 100),
            short(tags::BITS_PER_SAMPLE, 16),
            short(tags::COMPRESSION, compression::NONE),
            long(tags::STRIP_OFFSETS, 1000),
            long(tags::STRIP_BYTE_COUNTS, strip_len),
        ],
        0,
    );
    f.put(1000, &vec![0u8; strip_len as usize]);
    f
}

#[test]
fn orf_short_strip_goes_to_olympus_decoder() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = orf_fixture(8000);
    let mut raw = fixture.open(RawFileType::Orf);

    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!(data.data_type, DataType::Cfa);
    assert_eq!(data.compression, compression::OLYMPUS);
    assert_eq!((data.width, data.height), (100, 100));
    assert_eq!(data.bytes.len(), 20000);
    assert_eq!(data.white_level, 4095);
    assert!(data.samples_u16().unwrap().iter().all(|&s| s == 0));
}

#[test]
fn orf_no_decompress_keeps_packed_bytes() {
    let mut raw = orf_fixture(8000).open(RawFileType::Orf);
    let data = raw.get_raw_data(RawOptions::NO_DECOMPRESS).unwrap();
    assert_eq!(data.data_type, DataType::CompressedCfa);
    assert_eq!(data.compression, compression::OLYMPUS);
    assert_eq!(data.bytes.len(), 8000);
}

#[test]
fn orf_full_size_strip_is_uncompressed() {
    let mut raw = orf_fixture(20000).open(RawFileType::Orf);
    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!(data.data_type, DataType::Cfa);
    assert_eq!(data.compression, compression::NONE);
    assert_eq!(data.bytes.len(), 20000);
}

#[test]
fn orf_dimensions_beyond_strip_fail_cleanly() {
    let mut f = Fixture::new(b"IIRO", 8);
    f.ifd(
        8,
        &[
            long(tags::IMAGE_WIDTH, 200_000),
            long(tags::IMAGE_LENGTH, 200_000),
            short(tags::BITS_PER_SAMPLE, 16),
            short(tags::COMPRESSION, compression::NONE),
            long(tags::STRIP_OFFSETS, 100),
            long(tags::STRIP_BYTE_COUNTS, 16),
        ],
        0,
    );
    f.put(100, &[0u8; 16]);
    let mut raw = f.open(RawFileType::Orf);

    assert!(matches!(raw.get_raw_data(RawOptions::NONE), Err(RawError::Truncated(_))));
    let packed = raw.get_raw_data(RawOptions::NO_DECOMPRESS).unwrap();
    assert_eq!(packed.bytes.len(), 16);
}

#[test]
fn orf_rejects_plain_tiff_magic() {
    let mut f = Fixture::tiff(8);
    f.ifd(8, &[long(tags::IMAGE_WIDTH, 1)], 0);
    let result = open_raw_file(Box::new(StreamSource::from_bytes(f.buf)), RawFileType::Orf);
    assert!(matches!(result, Err(RawError::InvalidMagic(_))));
}

fn nef_fixture(code: u32) -> Fixture {
    let mut f = Fixture::tiff(8);
    f.ifd(
        8,
        &[
            short(tags::NEW_SUBFILE_TYPE, 1),
            long(tags::IMAGE_WIDTH, 160),
            long(tags::IMAGE_LENGTH, 120),
            short(tags::PHOTOMETRIC_INTERPRETATION, photometric::RGB),
            long(tags::SUB_IFDS, 100),
        ],
        0,
    );
    f.ifd(
        100,
        &[
            long(tags::IMAGE_WIDTH, 4),
            long(tags::IMAGE_LENGTH, 2),
            short(tags::BITS_PER_SAMPLE, 16),
            short(tags::COMPRESSION, code),
            short(tags::PHOTOMETRIC_INTERPRETATION, photometric::CFA),
            long(tags::STRIP_OFFSETS, 400),
            long(tags::STRIP_BYTE_COUNTS, 16),
            (tags::CFA_REPEAT_PATTERN_DIM, SHORT, vec![2, 2]),
            (tags::CFA_PATTERN, BYTE, vec![0, 1, 1, 2]),
        ],
        0,
    );
    let samples: Vec<u8> = (1u16..=8).flat_map(|s| s.to_le_bytes()).collect();
    f.put(400, &samples);
    f
}

#[test]
fn nef_uncompressed_subifd() {
    let mut raw = nef_fixture(compression::NONE).open(RawFileType::Nef);
    let cfa = raw.locate_cfa_directory().unwrap();
    assert_eq!(cfa.offset(), 100);

    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!(data.data_type, DataType::Cfa);
    assert_eq!(data.cfa_pattern, CfaPattern::Rggb);
    assert_eq!(data.white_level, 65535);
    assert_eq!(data.samples_u16().unwrap(), (1u16..=8).collect::<Vec<_>>());
}

#[test]
fn nef_vendor_compression_is_passed_through() {
    let mut raw = nef_fixture(compression::NIKON_QUANTIZED).open(RawFileType::Nef);
    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!(data.data_type, DataType::CompressedCfa);
    assert_eq!(data.compression, compression::NIKON_QUANTIZED);
    assert_eq!(data.bytes.len(), 16);
}

#[test]
fn tiff_ep_without_cfa_directory() {
    let mut f = Fixture::tiff(8);
    f.ifd(8, &[short(tags::PHOTOMETRIC_INTERPRETATION, photometric::RGB)], 0);
    let mut raw = f.open(RawFileType::Erf);
    assert!(matches!(raw.get_raw_data(RawOptions::NONE), Err(RawError::NotFound(_))));
}

fn dng_fixture(cfa_entries: Vec<(u16, u16, Vec<u32>)>, payload_at: u32, payload: &[u8]) -> Fixture {
    let mut f = Fixture::tiff(8);
    f.ifd(
        8,
        &[
            short(tags::NEW_SUBFILE_TYPE, 1),
            short(tags::PHOTOMETRIC_INTERPRETATION, photometric::CFA),
            long(tags::SUB_IFDS, 100),
            (tags::DNG_VERSION, BYTE, vec![1, 4, 0, 0]),
        ],
        0,
    );
    let mut entries = vec![
        long(tags::NEW_SUBFILE_TYPE, 0),
        short(tags::BITS_PER_SAMPLE, 8),
        short(tags::COMPRESSION, compression::LJPEG),
        short(tags::PHOTOMETRIC_INTERPRETATION, photometric::CFA),
    ];
    entries.extend(cfa_entries);
    f.ifd(100, &entries, 0);
    f.put(payload_at, payload);
    f
}

#[test]
fn dng_lossless_jpeg_strip() {
    let stream = ljpeg_3x2();
    let fixture = dng_fixture(
        vec![
            long(tags::IMAGE_WIDTH, 3),
            long(tags::IMAGE_LENGTH, 2),
            long(tags::STRIP_OFFSETS, 600),
            long(tags::STRIP_BYTE_COUNTS, stream.len() as u32),
        ],
        600,
        &stream,
    );
    let mut raw = fixture.open(RawFileType::Dng);

    // The reduced-resolution main directory is skipped
    assert_eq!(raw.locate_cfa_directory().unwrap().offset(), 100);

    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!(data.data_type, DataType::Cfa);
    assert_eq!((data.width, data.height), (3, 2));
    assert_eq!(data.white_level, 255);
    assert_eq!(data.samples_u16().unwrap(), vec![129, 128, 130, 129, 131, 128]);

    let packed = raw.get_raw_data(RawOptions::NO_DECOMPRESS).unwrap();
    assert_eq!(packed.data_type, DataType::CompressedCfa);
    assert_eq!(packed.bytes, stream);
}

#[test]
fn dng_lossless_jpeg_tiles() {
    let stream = ljpeg_3x2();
    let len = stream.len() as u32;
    let payload = [stream.clone(), stream].concat();
    let fixture = dng_fixture(
        vec![
            long(tags::IMAGE_WIDTH, 6),
            long(tags::IMAGE_LENGTH, 2),
            long(tags::TILE_WIDTH, 3),
            long(tags::TILE_LENGTH, 2),
            (tags::TILE_OFFSETS, LONG, vec![600, 600 + len]),
            (tags::TILE_BYTE_COUNTS, LONG, vec![len, len]),
        ],
        600,
        &payload,
    );
    let mut raw = fixture.open(RawFileType::Dng);

    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!((data.width, data.height), (6, 2));
    assert_eq!(
        data.samples_u16().unwrap(),
        vec![129, 128, 130, 129, 128, 130, 129, 131, 128, 129, 131, 128]
    );
}

fn cr2_fixture(with_raw_directory: bool) -> Fixture {
    let stream = ljpeg_3x2();
    let mut f = Fixture::tiff(8);
    f.ifd(8, &[long(tags::IMAGE_WIDTH, 3)], 40);
    f.ifd(40, &[long(tags::IMAGE_WIDTH, 3)], 80);
    f.ifd(80, &[long(tags::IMAGE_WIDTH, 3)], if with_raw_directory { 120 } else { 0 });
    if with_raw_directory {
        f.ifd(
            120,
            &[
                short(tags::COMPRESSION, compression::JPEG_OLD),
                long(tags::STRIP_OFFSETS, 600),
                long(tags::STRIP_BYTE_COUNTS, stream.len() as u32),
                (tags::CR2_SLICE, SHORT, vec![1, 2, 1]),
            ],
            0,
        );
    }
    f.put(600, &stream);
    f
}

#[test]
fn cr2_slices_are_reassembled() {
    let mut raw = cr2_fixture(true).open(RawFileType::Cr2);
    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!(data.compression, compression::LJPEG);
    assert_eq!(data.slices, vec![1, 2, 1]);
    assert_eq!((data.width, data.height), (3, 2));
    // stream order: slice 0 rows (129 128)(130 129), slice 1 rows (131)(128)
    assert_eq!(data.samples_u16().unwrap(), vec![129, 128, 131, 130, 129, 128]);
}

#[test]
fn cr2_without_fourth_directory() {
    let mut raw = cr2_fixture(false).open(RawFileType::Cr2);
    assert!(matches!(raw.locate_cfa_directory(), Err(RawError::NotFound(_))));
    assert!(raw.get_raw_data(RawOptions::NONE).is_err());
}

fn rw2_fixture(data_len: usize) -> Fixture {
    let mut f = Fixture::new(b"IIU\0", 8);
    f.ifd(
        8,
        &[
            short(rw2_tags::SENSOR_WIDTH, 4),
            short(rw2_tags::SENSOR_HEIGHT, 2),
            short(tags::BITS_PER_SAMPLE, 12),
            long(rw2_tags::RAW_DATA_OFFSET, 200),
        ],
        0,
    );
    f.put(200, &vec![0x11; data_len]);
    f
}

#[test]
fn rw2_unpacked_and_packed_data() {
    let mut raw = rw2_fixture(16).open(RawFileType::Rw2);
    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!(data.data_type, DataType::Cfa);
    assert_eq!((data.width, data.height), (4, 2));
    assert_eq!(data.samples_u16().unwrap(), vec![0x1111; 8]);

    let mut raw = rw2_fixture(12).open(RawFileType::Rw2);
    let data = raw.get_raw_data(RawOptions::NONE).unwrap();
    assert_eq!(data.data_type, DataType::CompressedCfa);
    assert_eq!(data.compression, compression::PANASONIC);
    assert_eq!(data.bytes.len(), 12);
}

fn thumbnail_fixture() -> (Fixture, Vec<u8>, Vec<u8>) {
    let small = jpeg_preview(160, 120);
    let large = jpeg_preview(640, 480);
    let mut f = Fixture::tiff(8);
    f.ifd(
        8,
        &[
            long(tags::JPEG_INTERCHANGE_FORMAT, 1000),
            long(tags::JPEG_INTERCHANGE_FORMAT_LENGTH, small.len() as u32),
        ],
        100,
    );
    f.ifd(
        100,
        &[
            long(tags::IMAGE_WIDTH, 640),
            long(tags::IMAGE_LENGTH, 480),
            short(tags::COMPRESSION, compression::JPEG_OLD),
            long(tags::STRIP_OFFSETS, 1100),
            long(tags::STRIP_BYTE_COUNTS, large.len() as u32),
        ],
        200,
    );
    f.ifd(
        200,
        &[
            long(tags::IMAGE_WIDTH, 2),
            long(tags::IMAGE_LENGTH, 1),
            (tags::BITS_PER_SAMPLE, SHORT, vec![8, 8, 8]),
            short(tags::COMPRESSION, compression::NONE),
            short(tags::PHOTOMETRIC_INTERPRETATION, photometric::RGB),
            short(tags::SAMPLES_PER_PIXEL, 3),
            long(tags::STRIP_OFFSETS, 1200),
            long(tags::STRIP_BYTE_COUNTS, 6),
        ],
        0,
    );
    f.put(1000, &small);
    f.put(1100, &large);
    f.put(1200, &[255, 0, 0, 0, 0, 255]);
    (f, small, large)
}

#[test]
fn thumbnails_are_listed_and_selected() {
    let (fixture, small, large) = thumbnail_fixture();
    let mut raw = fixture.open(RawFileType::Pef);

    assert_eq!(raw.list_thumbnail_sizes(), vec![2, 160, 640]);

    let exact = raw.get_thumbnail(160).unwrap();
    assert_eq!(exact.data_type, DataType::Jpeg);
    assert_eq!((exact.width, exact.height), (160, 120));
    assert_eq!(exact.data, small);

    let bigger = raw.get_thumbnail(500).unwrap();
    assert_eq!(bigger.data, large);

    let below = raw.get_thumbnail(4000).unwrap();
    assert_eq!(below.width, 640);

    let pixmap = raw.get_thumbnail(1).unwrap();
    assert_eq!(pixmap.data_type, DataType::Pixmap8Rgb);
    assert_eq!(pixmap.data, vec![255, 0, 0, 0, 0, 255]);
}

#[test]
fn missing_thumbnails_do_not_affect_raw_data() {
    let mut raw = nef_fixture(compression::NONE).open(RawFileType::Nef);
    assert!(raw.list_thumbnail_sizes().is_empty());
    assert!(matches!(raw.get_thumbnail(160), Err(RawError::NotFound(_))));
    assert_eq!(raw.get_raw_data(RawOptions::NONE).unwrap().data_type, DataType::Cfa);
}

#[test]
fn identify_and_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("P1010001.ORF");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&orf_fixture(8000).buf).unwrap();
    drop(file);

    assert_eq!(RawFileType::identify(&path), Some(RawFileType::Orf));

    let kit = RawKit::new(Some(dir.path().join("rawkit.log").to_str().unwrap())).unwrap();
    let data = kit.raw_data(&path, RawOptions::NONE).unwrap();
    assert_eq!(data.bytes.len(), 20000);

    let report = kit.analyze(&path, false).unwrap();
    assert!(report.contains("File type: ORF (Olympus)"));
    assert!(report.contains("Dimensions: 100x100"));

    let unknown = dir.path().join("picture.xyz");
    assert!(matches!(
        kit.raw_data(&unknown, RawOptions::NONE),
        Err(RawError::UnknownFileType(_))
    ));
}
