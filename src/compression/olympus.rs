//! Olympus ORF bit-unpacking decompressor
//!
//! Each sample is a prefix-coded residual whose width adapts to recent
//! magnitudes, predicted from same-colour neighbours two columns left and
//! two rows up. Even and odd columns keep separate adaptive state, reset at
//! the start of every row. Samples are 12 bits wide.

use log::{debug, trace};

use crate::compression::bit_reader::BitReader;
use crate::compression::handler::{CompressionHandler, DecodedImage};
use crate::tiff::constants::compression;
use crate::tiff::errors::{RawError, RawResult};

/// Bytes preceding the bitstream
const HEADER_SIZE: usize = 7;

const SAMPLE_BITS: u8 = 12;

/// Olympus decompressor for a `width` x `height` mosaic
#[derive(Debug, Clone, Copy)]
pub struct OlympusDecompressor {
    width: usize,
    height: usize,
}

impl OlympusDecompressor {
    pub fn new(width: usize, height: usize) -> Self {
        OlympusDecompressor { width, height }
    }

    fn predict(&self, out: &[u16], row: usize, col: usize) -> i32 {
        let at = |r: usize, c: usize| out[r * self.width + c] as i32;

        if row < 2 && col < 2 {
            0
        } else if row < 2 {
            at(row, col - 2)
        } else if col < 2 {
            at(row - 2, col)
        } else {
            let w = at(row, col - 2);
            let n = at(row - 2, col);
            let nw = at(row - 2, col - 2);
            if (w < nw && nw < n) || (n < nw && nw < w) {
                if (w - nw).abs() > 32 || (n - nw).abs() > 32 {
                    w + n - nw
                } else {
                    (w + n) >> 1
                }
            } else if (w - nw).abs() > (n - nw).abs() {
                w
            } else {
                n
            }
        }
    }

    /// Decodes the full mosaic
    pub fn decode(&self, data: &[u8]) -> RawResult<DecodedImage> {
        if data.len() < HEADER_SIZE {
            return Err(RawError::Truncated(format!(
                "Olympus data holds {} bytes, header needs {}",
                data.len(),
                HEADER_SIZE
            )));
        }
        debug!("Olympus decode: {}x{} from {} bytes", self.width, self.height, data.len());

        // Each sample takes at least four bits of the stream
        let bitstream = &data[HEADER_SIZE..];
        let total = self
            .width
            .checked_mul(self.height)
            .filter(|&n| n / 2 <= bitstream.len())
            .ok_or_else(|| {
                RawError::Truncated(format!(
                    "{} bytes of Olympus data for a {}x{} mosaic",
                    bitstream.len(),
                    self.width,
                    self.height
                ))
            })?;

        let mut reader = BitReader::unstuffed(bitstream);
        let mut out = vec![0u16; total];
        let mut corrupt = 0usize;

        for row in 0..self.height {
            // [magnitude, running average, small-value streak] per column parity
            let mut state = [[0i32; 3]; 2];

            for col in 0..self.width {
                let carry = &mut state[col & 1];
                let i: u32 = if carry[2] < 3 { 2 } else { 0 };
                let mut nbits: u32 = 2 + i;
                while nbits + i < 16 && ((carry[0] as u16 as u32) >> (nbits + i)) != 0 {
                    nbits += 1;
                }

                let head = reader.get_bits(3) as i32;
                let sign = if head & 4 != 0 { -1 } else { 0 };
                let low = head & 3;

                let lookahead = reader.peek_bits(12);
                let mut high = if lookahead == 0 {
                    12
                } else {
                    lookahead.leading_zeros() as i32 - 20
                };
                reader.skip_bits(if high == 12 { 12 } else { high as u32 + 1 });
                if high == 12 {
                    high = (reader.get_bits(16 - nbits) >> 1) as i32;
                }

                carry[0] = (high << nbits) | reader.get_bits(nbits) as i32;
                let diff = (carry[0] ^ sign) + carry[1];
                carry[1] = (diff * 3 + carry[1]) >> 5;
                carry[2] = if carry[0] > 16 { 0 } else { carry[2] + 1 };

                let pred = self.predict(&out, row, col);
                let value = pred + ((diff << 2) | low);
                if value >> SAMPLE_BITS != 0 {
                    corrupt += 1;
                    trace!("Out of range sample {} at {},{}", value, row, col);
                }
                out[row * self.width + col] = value as u16;
            }
        }

        if reader.overrun() {
            debug!("Olympus data ran short, tail of the image is padded");
        }
        if corrupt > 0 {
            debug!("{} Olympus samples outside the 12-bit range", corrupt);
        }

        Ok(DecodedImage {
            width: self.width,
            height: self.height,
            bits_per_sample: SAMPLE_BITS,
            samples: out,
        })
    }
}

impl CompressionHandler for OlympusDecompressor {
    fn decompress(&self, data: &[u8]) -> RawResult<DecodedImage> {
        self.decode(data)
    }

    fn name(&self) -> &'static str {
        "Olympus"
    }

    fn code(&self) -> u32 {
        compression::OLYMPUS
    }
}
