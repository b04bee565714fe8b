//! Lossless JPEG (process 14) decompressor
//!
//! Parses the marker stream of an embedded lossless JPEG, builds the Huffman
//! decode tables and reconstructs the sample grid by predictive decoding.
//! Only the lossless frame type (SOF3) is accepted.

pub mod huffman;
pub mod markers;

use log::{debug, trace};

use crate::compression::bit_reader::BitReader;
use crate::compression::handler::{CompressionHandler, DecodedImage};
use crate::tiff::constants::compression;
use crate::tiff::errors::{RawError, RawResult};
use crate::tiff::validation;
use huffman::HuffmanTable;
use markers::{FrameHeader, ScanHeader};

/// Predictor for a sample from its left (`ra`), above (`rb`) and
/// above-left (`rc`) neighbours
type Predictor = fn(i32, i32, i32) -> i32;

fn predictor_for(psv: u8) -> RawResult<Predictor> {
    let predictor: Predictor = match psv {
        0 => |_, _, _| 0,
        1 => |ra, _, _| ra,
        2 => |_, rb, _| rb,
        3 => |_, _, rc| rc,
        4 => |ra, rb, rc| ra + rb - rc,
        5 => |ra, rb, rc| ra + ((rb - rc) >> 1),
        6 => |ra, rb, rc| rb + ((ra - rc) >> 1),
        7 => |ra, rb, _| (ra + rb) >> 1,
        _ => {
            return Err(RawError::Unsupported(format!(
                "predictor selection value {}",
                psv
            )))
        }
    };
    Ok(predictor)
}

/// Working state of one decode call
struct DecodeContext {
    tables: [Option<HuffmanTable>; 4],
    frame: Option<FrameHeader>,
    restart_interval: u16,
}

impl DecodeContext {
    fn new() -> Self {
        DecodeContext {
            tables: [None, None, None, None],
            frame: None,
            restart_interval: 0,
        }
    }

    fn parse_dht(&mut self, mut payload: &[u8]) -> RawResult<()> {
        while !payload.is_empty() {
            if payload.len() < 17 {
                return Err(RawError::MarkerSequence("DHT segment too short".to_string()));
            }
            let class_id = payload[0];
            let id = (class_id & 0x0F) as usize;
            if id >= self.tables.len() {
                return Err(RawError::HuffmanDecode(format!("table id {} out of range", id)));
            }

            let mut counts = [0u8; 16];
            counts.copy_from_slice(&payload[1..17]);
            let total: usize = counts.iter().map(|&c| c as usize).sum();
            let values = payload
                .get(17..17 + total)
                .ok_or_else(|| RawError::MarkerSequence("DHT symbols truncated".to_string()))?;

            debug!("Huffman table {} with {} codes", id, total);
            self.tables[id] = Some(HuffmanTable::new(&counts, values)?);
            payload = &payload[17 + total..];
        }
        Ok(())
    }

    fn parse_dri(&mut self, payload: &[u8]) -> RawResult<()> {
        if payload.len() < 2 {
            return Err(RawError::MarkerSequence("DRI segment too short".to_string()));
        }
        self.restart_interval = u16::from_be_bytes([payload[0], payload[1]]);
        debug!("Restart interval {}", self.restart_interval);
        Ok(())
    }

    fn parse_sof3(&mut self, payload: &[u8]) -> RawResult<()> {
        if self.frame.is_some() {
            return Err(RawError::MarkerSequence("second frame header".to_string()));
        }
        let frame = FrameHeader::parse(payload)?;
        validation::validate_range(frame.precision, 2, 16, "sample precision")?;
        if frame.rows == 0 || frame.cols == 0 {
            return Err(RawError::StructuralCorruption(format!(
                "lossless frame of {}x{} samples",
                frame.cols, frame.rows
            )));
        }
        if frame.components.is_empty() || frame.components.len() > 4 {
            return Err(RawError::Unsupported(format!(
                "{} frame components",
                frame.components.len()
            )));
        }
        if let Some(c) = frame.components.iter().find(|c| c.h != 1 || c.v != 1) {
            return Err(RawError::Unsupported(format!(
                "sampling factors {}x{} on component {}",
                c.h, c.v, c.id
            )));
        }
        debug!(
            "Lossless frame: {}x{}, {} components, {} bits",
            frame.cols,
            frame.rows,
            frame.components.len(),
            frame.precision
        );
        self.frame = Some(frame);
        Ok(())
    }
}

/// Lossless JPEG decompressor
#[derive(Debug, Clone, Copy, Default)]
pub struct LJpegDecompressor;

impl LJpegDecompressor {
    pub fn new() -> Self {
        LJpegDecompressor
    }

    /// Decodes a complete SOI..EOI stream
    pub fn decode(&self, data: &[u8]) -> RawResult<DecodedImage> {
        let mut pos = 0;
        match markers::read_marker(data, &mut pos) {
            Ok(markers::SOI) => {}
            _ => return Err(RawError::MarkerSequence("stream does not start with SOI".to_string())),
        }

        let mut ctx = DecodeContext::new();
        loop {
            let marker = markers::read_marker(data, &mut pos)?;
            match marker {
                markers::DHT => ctx.parse_dht(markers::read_segment(data, &mut pos)?)?,
                markers::DRI => ctx.parse_dri(markers::read_segment(data, &mut pos)?)?,
                markers::SOF3 => ctx.parse_sof3(markers::read_segment(data, &mut pos)?)?,
                markers::SOS => {
                    let scan = ScanHeader::parse(markers::read_segment(data, &mut pos)?)?;
                    return self.decode_scan(&ctx, &scan, &data[pos..]);
                }
                m if markers::is_sof(m) => {
                    return Err(RawError::Unsupported(format!(
                        "frame type {:#04x} is not lossless",
                        m
                    )))
                }
                markers::DQT | markers::DAC | markers::DNL | markers::COM => {
                    markers::read_segment(data, &mut pos)?;
                }
                m if (markers::APP0..=markers::APP15).contains(&m) => {
                    markers::read_segment(data, &mut pos)?;
                }
                markers::SOI | markers::EOI => {
                    return Err(RawError::MarkerSequence(format!(
                        "unexpected marker {:#04x} before scan",
                        marker
                    )))
                }
                m if markers::is_rst(m) => {
                    return Err(RawError::MarkerSequence(format!(
                        "restart marker {:#04x} outside entropy data",
                        m
                    )))
                }
                m => {
                    debug!("Skipping unknown marker {:#04x}", m);
                    markers::read_segment(data, &mut pos)?;
                }
            }
        }
    }

    fn decode_scan(&self, ctx: &DecodeContext, scan: &ScanHeader, entropy: &[u8]) -> RawResult<DecodedImage> {
        let frame = ctx
            .frame
            .as_ref()
            .ok_or_else(|| RawError::MarkerSequence("scan before frame header".to_string()))?;

        let comps = frame.components.len();
        if scan.components.len() != comps {
            return Err(RawError::Unsupported(format!(
                "scan covers {} of {} components",
                scan.components.len(),
                comps
            )));
        }
        let mut tables = Vec::with_capacity(comps);
        for &(id, selector) in &scan.components {
            let table = ctx
                .tables
                .get(selector as usize)
                .and_then(|t| t.as_ref())
                .ok_or_else(|| {
                    RawError::HuffmanDecode(format!("component {} uses undefined table {}", id, selector))
                })?;
            tables.push(table);
        }

        let precision = frame.precision as u32;
        let pt = scan.point_transform as u32;
        if pt >= precision {
            return Err(RawError::Unsupported(format!(
                "point transform {} with precision {}",
                pt, precision
            )));
        }
        let predictor = predictor_for(scan.predictor)?;

        let rows = frame.rows as usize;
        let cols = frame.cols as usize;
        let width = cols * comps;
        let restart_rows = match ctx.restart_interval as usize {
            0 => 0,
            interval if interval % cols == 0 => interval / cols,
            interval => {
                return Err(RawError::Unsupported(format!(
                    "restart interval {} is not a whole number of rows of {}",
                    interval, cols
                )))
            }
        };

        // Every sample costs at least one bit of entropy data
        let total = width
            .checked_mul(rows)
            .filter(|&n| n / 8 <= entropy.len())
            .ok_or_else(|| {
                RawError::Truncated(format!(
                    "{} bytes of entropy data for a {}x{} frame",
                    entropy.len(),
                    width,
                    rows
                ))
            })?;

        // Reconstruction wraps at the precision left after the point transform
        let mask = (1i32 << (precision - pt)) - 1;
        let initial = 1i32 << (precision - pt - 1);
        let mut prev = vec![0i32; width];
        let mut cur = vec![0i32; width];
        let mut samples = Vec::with_capacity(total);

        let mut reader = BitReader::new(entropy);
        let mut rows_to_go = restart_rows;

        for row in 0..rows {
            let mut first_row = row == 0;
            if row > 0 && restart_rows > 0 && rows_to_go == 0 {
                process_restart(&mut reader)?;
                rows_to_go = restart_rows;
                first_row = true;
            }

            for col in 0..cols {
                for (ci, table) in tables.iter().enumerate() {
                    let diff = table.decode_diff(&mut reader)?;
                    let idx = col * comps + ci;
                    let pred = if first_row {
                        if col == 0 {
                            initial
                        } else {
                            cur[idx - comps]
                        }
                    } else if col == 0 {
                        prev[idx]
                    } else {
                        predictor(cur[idx - comps], prev[idx], prev[idx - comps])
                    };
                    cur[idx] = (pred + diff) & mask;
                }
            }

            if reader.overrun() {
                return Err(match reader.pending_marker() {
                    Some(marker) => RawError::MarkerSequence(format!(
                        "marker {:#04x} inside row {}",
                        marker, row
                    )),
                    None => RawError::Truncated(format!("entropy data ends in row {}", row)),
                });
            }

            samples.extend(cur.iter().map(|&s| (s << pt) as u16));
            std::mem::swap(&mut prev, &mut cur);
            rows_to_go = rows_to_go.saturating_sub(1);
        }

        match reader.next_marker() {
            Some(markers::EOI) => trace!("EOI after {} rows", rows),
            other => debug!("Scan not followed by EOI: {:?}", other),
        }

        Ok(DecodedImage {
            width,
            height: rows,
            bits_per_sample: frame.precision,
            samples,
        })
    }
}

fn process_restart(reader: &mut BitReader) -> RawResult<()> {
    match reader.next_marker() {
        Some(marker) if markers::is_rst(marker) => {
            trace!("Restart marker {:#04x}", marker);
            Ok(())
        }
        Some(marker) => Err(RawError::MarkerSequence(format!(
            "expected a restart marker, found {:#04x}",
            marker
        ))),
        None => Err(RawError::Truncated("missing restart marker".to_string())),
    }
}

impl CompressionHandler for LJpegDecompressor {
    fn decompress(&self, data: &[u8]) -> RawResult<DecodedImage> {
        self.decode(data)
    }

    fn name(&self) -> &'static str {
        "Lossless JPEG"
    }

    fn code(&self) -> u32 {
        compression::LJPEG
    }
}
