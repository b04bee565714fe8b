//! Shared vendor driver contract
//!
//! Every supported RAW format implements [`RawFile`]. The trait carries the
//! extraction pipeline shared by all TIFF-derived formats: locate the CFA
//! directory, pull the pixel bytes out of it, translate the vendor
//! compression code and decompress when a decoder exists. Drivers override
//! the steps where their format deviates.

use std::collections::BTreeMap;
use std::ops::BitOr;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::compression::{CompressionFactory, DecodedImage};
use crate::io::byte_order::Endianness;
use crate::io::byte_source::ByteSource;
use crate::raw::cfa::CfaPattern;
use crate::raw::factory::RawFileType;
use crate::raw::rawdata::{DataType, RawData, TileLayout};
use crate::raw::thumbnail::{self, Thumbnail, ThumbnailDesc};
use crate::tiff::constants::{compression, new_subfile_type, photometric, tags};
use crate::tiff::container::{MagicHeader, RawContainer};
use crate::tiff::errors::{RawError, RawResult};
use crate::tiff::ifd::{IfdDir, NamedDirectory};
use crate::tiff::ifd_container::IfdFileContainer;

/// Options for [`RawFile::get_raw_data`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawOptions(u32);

impl RawOptions {
    pub const NONE: RawOptions = RawOptions(0);
    /// Return compressed payloads untouched
    pub const NO_DECOMPRESS: RawOptions = RawOptions(1);

    pub fn contains(self, other: RawOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn no_decompress(self) -> bool {
        self.contains(RawOptions::NO_DECOMPRESS)
    }
}

impl BitOr for RawOptions {
    type Output = RawOptions;

    fn bitor(self, rhs: RawOptions) -> RawOptions {
        RawOptions(self.0 | rhs.0)
    }
}

/// State shared by every TIFF-derived driver
pub struct RawFileBase {
    container: IfdFileContainer,
    thumbnails: Option<BTreeMap<u32, ThumbnailDesc>>,
}

impl RawFileBase {
    /// Opens `source` with the header `dialect`
    pub fn open(source: Box<dyn ByteSource>, dialect: MagicHeader) -> RawResult<Self> {
        Ok(RawFileBase {
            container: IfdFileContainer::open(source, 0, dialect)?,
            thumbnails: None,
        })
    }

    pub fn container(&mut self) -> &mut IfdFileContainer {
        &mut self.container
    }

    pub fn raw(&mut self) -> &mut RawContainer {
        self.container.raw()
    }

    pub fn endian(&self) -> Endianness {
        self.container.endian()
    }

    /// First directory of the main chain
    pub fn main_directory(&mut self) -> RawResult<Rc<IfdDir>> {
        self.container
            .set_directory(0)?
            .ok_or_else(|| RawError::NotFound("main directory".to_string()))
    }

    /// EXIF directory referenced by the main directory
    pub fn exif_directory(&mut self) -> Option<Rc<IfdDir>> {
        let main = self.main_directory().ok()?;
        main.get_named_sub_directory(self.container.raw(), NamedDirectory::Exif)
    }

    /// Camera maker from the main directory
    pub fn make(&mut self) -> Option<String> {
        let main = self.main_directory().ok()?;
        main.get_string(self.container.raw(), tags::MAKE)
    }

    /// Camera model from the main directory
    pub fn model(&mut self) -> Option<String> {
        let main = self.main_directory().ok()?;
        main.get_string(self.container.raw(), tags::MODEL)
    }

    /// Embedded previews keyed by size, located on first use
    pub fn thumbnails(&mut self) -> &BTreeMap<u32, ThumbnailDesc> {
        if self.thumbnails.is_none() {
            let found = match self.container.directories() {
                Ok(dirs) => thumbnail::collect_thumbnails(self.container.raw(), &dirs),
                Err(e) => {
                    warn!("Cannot enumerate thumbnails: {}", e);
                    BTreeMap::new()
                }
            };
            debug!("Found {} thumbnail sizes", found.len());
            self.thumbnails = Some(found);
        }
        self.thumbnails.get_or_insert_with(BTreeMap::new)
    }

    /// TIFF-EP search for the sensor data directory
    ///
    /// Looks through the main chain, then the SubIFDs of the first
    /// directory, for a CFA photometric interpretation. With
    /// `full_resolution_only`, reduced-resolution directories are skipped.
    pub fn tiff_ep_cfa_directory(&mut self, full_resolution_only: bool) -> RawResult<Rc<IfdDir>> {
        let chain = self.container.directories()?;
        let container = self.container.raw();

        let mut candidates = chain.clone();
        if let Some(first) = chain.first() {
            candidates.extend(first.get_sub_directories(container, tags::SUB_IFDS));
        }

        for dir in candidates {
            if dir.get_integer_value(container, tags::PHOTOMETRIC_INTERPRETATION) != Some(photometric::CFA) {
                continue;
            }
            if full_resolution_only {
                let subfile = dir.get_integer_value(container, tags::NEW_SUBFILE_TYPE).unwrap_or(0);
                if subfile & new_subfile_type::REDUCED_RESOLUTION != 0 {
                    continue;
                }
            }
            debug!("CFA directory at {}", dir.offset());
            return Ok(dir);
        }

        Err(RawError::NotFound("CFA directory".to_string()))
    }

    /// Raw data described by `dir`, CFA pattern falling back to EXIF
    pub fn raw_data_from_dir(&mut self, dir: &IfdDir) -> RawResult<RawData> {
        let mut data = raw_data_from_dir(self.container.raw(), dir)?;
        if data.cfa_pattern == CfaPattern::None {
            if let Some(exif) = self.exif_directory() {
                let container = self.container.raw();
                if let Some(bytes) = exif.get_array::<u8>(container, tags::EXIF_CFA_PATTERN) {
                    data.cfa_pattern = CfaPattern::from_exif(&bytes, container.handler()?);
                }
            }
        }
        Ok(data)
    }
}

/// A camera RAW file of one vendor format
pub trait RawFile {
    fn file_type(&self) -> RawFileType;

    /// Shared container state
    fn base(&mut self) -> &mut RawFileBase;

    fn locate_main_directory(&mut self) -> RawResult<Rc<IfdDir>> {
        self.base().main_directory()
    }

    /// Directory holding the sensor data
    fn locate_cfa_directory(&mut self) -> RawResult<Rc<IfdDir>>;

    /// Maps a vendor compression code to the code the decoders know
    fn translate_compression_type(&self, code: u32) -> u32 {
        code
    }

    /// Extracts the sensor data
    fn get_raw_data(&mut self, options: RawOptions) -> RawResult<RawData> {
        let dir = self.locate_cfa_directory()?;
        let mut data = self.base().raw_data_from_dir(&dir)?;
        data.compression = self.translate_compression_type(data.compression);
        let endian = self.base().endian();
        decompress_raw_data(data, options, endian)
    }

    /// Sizes of the embedded previews, ascending
    fn list_thumbnail_sizes(&mut self) -> Vec<u32> {
        self.base().thumbnails().keys().copied().collect()
    }

    /// Preview closest to `size`
    fn get_thumbnail(&mut self, size: u32) -> RawResult<Thumbnail> {
        let base = self.base();
        let desc = thumbnail::find_thumbnail(base.thumbnails(), size)?.clone();
        info!("Serving {}x{} thumbnail for size {}", desc.width, desc.height, size);
        thumbnail::load_thumbnail(base.raw(), &desc)
    }
}

/// Pixel bytes and layout from a directory
///
/// Strips are concatenated in order. Several compressed strips, or tiles,
/// are recorded in [`RawData::tiles`] so each can be decoded on its own.
pub fn raw_data_from_dir(container: &mut RawContainer, dir: &IfdDir) -> RawResult<RawData> {
    let bpc = dir
        .get_integer_value(container, tags::BITS_PER_SAMPLE)
        .ok_or_else(|| RawError::NotFound("bits per sample".to_string()))?;
    let (width, height) = dir
        .get_dimensions(container)
        .ok_or_else(|| RawError::NotFound("image dimensions".to_string()))?;
    let compression = dir
        .get_integer_value(container, tags::COMPRESSION)
        .unwrap_or(compression::NONE);
    let photometric = dir
        .get_integer_value(container, tags::PHOTOMETRIC_INTERPRETATION)
        .unwrap_or(0);

    let (offsets, counts, tile_size) = if let Some(offsets) = dir.get_integer_array(container, tags::STRIP_OFFSETS) {
        let counts = dir
            .get_integer_array(container, tags::STRIP_BYTE_COUNTS)
            .ok_or_else(|| RawError::NotFound("strip byte counts".to_string()))?;
        let rows = dir.get_integer_value(container, tags::ROWS_PER_STRIP).unwrap_or(height);
        let split = offsets.len() > 1 && compression != compression::NONE;
        (offsets, counts, if split { Some((width, rows)) } else { None })
    } else if let Some(offsets) = dir.get_integer_array(container, tags::TILE_OFFSETS) {
        let counts = dir
            .get_integer_array(container, tags::TILE_BYTE_COUNTS)
            .ok_or_else(|| RawError::NotFound("tile byte counts".to_string()))?;
        let tile_width = dir
            .get_integer_value(container, tags::TILE_WIDTH)
            .ok_or_else(|| RawError::NotFound("tile width".to_string()))?;
        let tile_height = dir
            .get_integer_value(container, tags::TILE_LENGTH)
            .ok_or_else(|| RawError::NotFound("tile length".to_string()))?;
        (offsets, counts, Some((tile_width, tile_height)))
    } else {
        return Err(RawError::NotFound("strip or tile offsets".to_string()));
    };

    if offsets.len() != counts.len() {
        return Err(RawError::StructuralCorruption(format!(
            "{} data offsets but {} byte counts",
            offsets.len(),
            counts.len()
        )));
    }

    let mut bytes = Vec::new();
    let mut fetched = Vec::with_capacity(counts.len());
    for (&offset, &count) in offsets.iter().zip(&counts) {
        let block = container.fetch_available(offset as u64, count as usize)?;
        if block.len() < count as usize {
            warn!("Pixel data at {} holds {} of {} bytes", offset, block.len(), count);
        }
        fetched.push(block.len() as u32);
        bytes.extend_from_slice(&block);
    }

    let tiles = tile_size.map(|(tile_width, tile_height)| TileLayout {
        tile_width,
        tile_height,
        byte_counts: fetched,
    });

    let cfa_pattern = match (
        dir.get_array::<u16>(container, tags::CFA_REPEAT_PATTERN_DIM),
        dir.get_array::<u8>(container, tags::CFA_PATTERN),
    ) {
        (Some(dims), Some(pattern)) => CfaPattern::from_tiff_ep(&dims, &pattern),
        _ => CfaPattern::None,
    };

    info!(
        "Raw data {}x{}, {} bits, compression {}, {} bytes",
        width,
        height,
        bpc,
        compression,
        bytes.len()
    );

    Ok(RawData {
        width,
        height,
        bpc: bpc as u16,
        data_type: DataType::None,
        compression,
        cfa_pattern,
        photometric_interpretation: photometric,
        white_level: 0,
        slices: Vec::new(),
        tiles,
        bytes,
    })
}

/// Routes `data` by its compression code
///
/// Uncompressed data is tagged `Cfa` as is. Codes with a decoder are
/// decoded unless `options` asks otherwise. Anything else is returned
/// untouched as `CompressedCfa`.
pub fn decompress_raw_data(mut data: RawData, options: RawOptions, endian: Endianness) -> RawResult<RawData> {
    match data.compression {
        compression::NONE => {
            data.data_type = DataType::Cfa;
            if data.bpc > 0 && data.bpc <= 16 {
                data.white_level = ((1u32 << data.bpc) - 1) as u16;
            }
            if data.tiles.is_some() {
                untile(&mut data)?;
            }
            if endian == Endianness::Big && data.bpc > 8 && data.is_16_bit_grid() {
                for pair in data.bytes.chunks_exact_mut(2) {
                    pair.swap(0, 1);
                }
            }
        }
        code if CompressionFactory::is_supported(code) => {
            data.data_type = DataType::CompressedCfa;
            if options.no_decompress() {
                debug!("Leaving compression {} undecoded", code);
                return Ok(data);
            }
            let image = decode(&data)?;
            data.set_decoded(image);
        }
        code => {
            debug!("No decoder for compression {}, keeping the payload", code);
            data.data_type = DataType::CompressedCfa;
        }
    }
    Ok(data)
}

/// Decodes a single stream or a grid of tiles into one image
fn decode(data: &RawData) -> RawResult<DecodedImage> {
    let width = data.width as usize;
    let height = data.height as usize;

    let layout = match &data.tiles {
        None => {
            let handler = CompressionFactory::create_handler(data.compression, width, height)?;
            info!("Decoding {} bytes with {}", data.bytes.len(), handler.name());
            return handler.decompress(&data.bytes);
        }
        Some(layout) => layout,
    };

    let tile_width = layout.tile_width as usize;
    let tile_height = layout.tile_height as usize;
    if tile_width == 0 || tile_height == 0 {
        return Err(RawError::StructuralCorruption("zero tile size".to_string()));
    }
    let tiles_across = (width + tile_width - 1) / tile_width;
    let handler = CompressionFactory::create_handler(data.compression, tile_width, tile_height)?;
    info!("Decoding {} tiles with {}", layout.byte_counts.len(), handler.name());

    // Each tile sample costs at least one bit of compressed data
    let total = width
        .checked_mul(height)
        .filter(|&n| n / 8 <= data.bytes.len())
        .ok_or_else(|| {
            RawError::Truncated(format!(
                "{} bytes of tiles for a {}x{} image",
                data.bytes.len(),
                width,
                height
            ))
        })?;
    let mut samples = vec![0u16; total];
    let mut bits_per_sample = 0;
    let mut pos = 0;
    for (index, &count) in layout.byte_counts.iter().enumerate() {
        let segment = segment_at(&data.bytes, pos, count)?;
        pos += count as usize;

        let tile = handler.decompress(segment)?;
        bits_per_sample = bits_per_sample.max(tile.bits_per_sample);

        let x0 = (index % tiles_across) * tile_width;
        let y0 = (index / tiles_across) * tile_height;
        if x0 >= width {
            continue;
        }
        let cols = tile.width.min(width - x0);
        for row in 0..tile.height.min(height.saturating_sub(y0)) {
            let src = &tile.samples[row * tile.width..row * tile.width + cols];
            let dst = (y0 + row) * width + x0;
            samples[dst..dst + cols].copy_from_slice(src);
        }
    }

    Ok(DecodedImage {
        width,
        height,
        bits_per_sample,
        samples,
    })
}

fn segment_at(bytes: &[u8], pos: usize, count: u32) -> RawResult<&[u8]> {
    bytes
        .get(pos..pos + count as usize)
        .ok_or_else(|| RawError::Truncated(format!("tile of {} bytes at {}", count, pos)))
}

/// Reassembles uncompressed tiles into raster order
fn untile(data: &mut RawData) -> RawResult<()> {
    let layout = match data.tiles.take() {
        Some(layout) => layout,
        None => return Ok(()),
    };
    if data.bpc % 8 != 0 {
        return Err(RawError::Unsupported(format!("{}-bit tiled data", data.bpc)));
    }
    let sample = data.bytes_per_sample();
    let width = data.width as usize;
    let height = data.height as usize;
    let tile_width = layout.tile_width as usize;
    let tile_height = layout.tile_height as usize;
    if tile_width == 0 || tile_height == 0 {
        return Err(RawError::StructuralCorruption("zero tile size".to_string()));
    }
    let tiles_across = (width + tile_width - 1) / tile_width;
    let tile_row_bytes = tile_width * sample;

    let out_len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(sample))
        .filter(|&n| n <= data.bytes.len())
        .ok_or_else(|| {
            RawError::Truncated(format!(
                "{} bytes of tiles for a {}x{} image",
                data.bytes.len(),
                width,
                height
            ))
        })?;
    let mut out = vec![0u8; out_len];
    let mut pos = 0;
    for (index, &count) in layout.byte_counts.iter().enumerate() {
        let tile = segment_at(&data.bytes, pos, count)?;
        pos += count as usize;

        let x0 = (index % tiles_across) * tile_width;
        let y0 = (index / tiles_across) * tile_height;
        if x0 >= width {
            continue;
        }
        let row_bytes = tile_width.min(width - x0) * sample;
        for row in 0..tile_height.min(height.saturating_sub(y0)) {
            let start = row * tile_row_bytes;
            if start + row_bytes > tile.len() {
                break;
            }
            let dst = ((y0 + row) * width + x0) * sample;
            out[dst..dst + row_bytes].copy_from_slice(&tile[start..start + row_bytes]);
        }
    }

    data.bytes = out;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(compression: u32, bpc: u16, bytes: Vec<u8>) -> RawData {
        RawData {
            width: 2,
            height: 1,
            bpc,
            compression,
            bytes,
            ..Default::default()
        }
    }

    #[test]
    fn options_bitset() {
        let options = RawOptions::NONE | RawOptions::NO_DECOMPRESS;
        assert!(options.no_decompress());
        assert!(!RawOptions::default().no_decompress());
    }

    #[test]
    fn uncompressed_is_cfa() {
        let data = decompress_raw_data(raw(1, 12, vec![1, 0, 2, 0]), RawOptions::NONE, Endianness::Little).unwrap();
        assert_eq!(data.data_type, DataType::Cfa);
        assert_eq!(data.white_level, 4095);
        assert_eq!(data.bytes, vec![1, 0, 2, 0]);
    }

    #[test]
    fn big_endian_16_bit_samples_are_normalised() {
        let data = decompress_raw_data(raw(1, 16, vec![0x01, 0x02, 0x03, 0x04]), RawOptions::NONE, Endianness::Big)
            .unwrap();
        assert_eq!(data.samples_u16(), Some(vec![0x0102, 0x0304]));
    }

    #[test]
    fn unknown_compression_is_kept() {
        let data = decompress_raw_data(raw(34713, 12, vec![9; 3]), RawOptions::NONE, Endianness::Little).unwrap();
        assert_eq!(data.data_type, DataType::CompressedCfa);
        assert_eq!(data.bytes, vec![9; 3]);
    }

    #[test]
    fn no_decompress_keeps_payload() {
        let data = decompress_raw_data(
            raw(compression::OLYMPUS, 12, vec![0; 16]),
            RawOptions::NO_DECOMPRESS,
            Endianness::Little,
        )
        .unwrap();
        assert_eq!(data.data_type, DataType::CompressedCfa);
        assert_eq!(data.bytes.len(), 16);
    }

    fn oversized_tiles(compression: u32) -> RawData {
        RawData {
            width: 200_000,
            height: 200_000,
            bpc: 16,
            compression,
            tiles: Some(TileLayout {
                tile_width: 256,
                tile_height: 256,
                byte_counts: vec![16],
            }),
            bytes: vec![0; 16],
            ..Default::default()
        }
    }

    #[test]
    fn tile_grid_larger_than_data() {
        for code in [compression::NONE, compression::LJPEG] {
            let result = decompress_raw_data(oversized_tiles(code), RawOptions::NONE, Endianness::Little);
            assert!(matches!(result, Err(RawError::Truncated(_))), "compression {}", code);
        }
    }

    #[test]
    fn uncompressed_tiles_are_reassembled() {
        // 3x2 image of 8-bit samples in 2x2 tiles; the right tile is padded
        let mut data = RawData {
            width: 3,
            height: 2,
            bpc: 8,
            compression: compression::NONE,
            tiles: Some(TileLayout {
                tile_width: 2,
                tile_height: 2,
                byte_counts: vec![4, 4],
            }),
            bytes: vec![1, 2, 4, 5, 3, 0, 6, 0],
            ..Default::default()
        };
        data = decompress_raw_data(data, RawOptions::NONE, Endianness::Little).unwrap();
        assert_eq!(data.bytes, vec![1, 2, 3, 4, 5, 6]);
        assert!(data.tiles.is_none());
    }
}
