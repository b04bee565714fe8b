//! Canonical Huffman tables for lossless JPEG

use crate::compression::bit_reader::BitReader;
use crate::tiff::errors::{RawError, RawResult};

/// Codes up to this length decode through the lookahead table
const LOOKAHEAD_BITS: u32 = 8;

/// Decode table built from a DHT segment
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Symbols in code order
    values: Vec<u8>,
    /// Largest code of each length, -1 when there are none
    maxcode: [i32; 17],
    /// Smallest code of each length
    mincode: [i32; 17],
    /// Index in `values` of the first code of each length
    valptr: [i32; 17],
    /// (code length, symbol) indexed by the next eight bits; length 0 means
    /// the code is longer than eight bits
    lookahead: Vec<(u8, u8)>,
}

impl HuffmanTable {
    /// Builds a table from the 16 code-length counts and the symbols
    pub fn new(counts: &[u8; 16], values: &[u8]) -> RawResult<Self> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total > 256 || total != values.len() {
            return Err(RawError::HuffmanDecode(format!(
                "table declares {} codes for {} symbols",
                total,
                values.len()
            )));
        }

        let mut maxcode = [-1i32; 17];
        let mut mincode = [0i32; 17];
        let mut valptr = [0i32; 17];
        let mut lookahead = vec![(0u8, 0u8); 1 << LOOKAHEAD_BITS];

        let mut code: u32 = 0;
        let mut k = 0usize;
        for len in 1..=16u32 {
            let count = counts[len as usize - 1] as usize;
            if count > 0 {
                valptr[len as usize] = k as i32;
                mincode[len as usize] = code as i32;
                for _ in 0..count {
                    if code >= (1 << len) {
                        return Err(RawError::HuffmanDecode(format!(
                            "code lengths overflow at length {}",
                            len
                        )));
                    }
                    if len <= LOOKAHEAD_BITS {
                        let shift = LOOKAHEAD_BITS - len;
                        let first = (code << shift) as usize;
                        for slot in &mut lookahead[first..first + (1 << shift)] {
                            *slot = (len as u8, values[k]);
                        }
                    }
                    code += 1;
                    k += 1;
                }
                maxcode[len as usize] = code as i32 - 1;
            }
            code <<= 1;
        }

        Ok(HuffmanTable {
            values: values.to_vec(),
            maxcode,
            mincode,
            valptr,
            lookahead,
        })
    }

    /// Decodes one symbol
    pub fn decode(&self, reader: &mut BitReader) -> RawResult<u8> {
        let peek = reader.peek_bits(LOOKAHEAD_BITS);
        let (len, value) = self.lookahead[peek as usize];
        if len > 0 {
            reader.skip_bits(len as u32);
            return Ok(value);
        }

        reader.skip_bits(LOOKAHEAD_BITS);
        let mut code = peek as i32;
        for len in (LOOKAHEAD_BITS as usize + 1)..=16 {
            code = (code << 1) | reader.get_bits(1) as i32;
            if code <= self.maxcode[len] {
                let index = self.valptr[len] + code - self.mincode[len];
                return Ok(self.values[index as usize]);
            }
        }

        Err(RawError::HuffmanDecode(format!("no code matches {:#06x}", code)))
    }

    /// Decodes one difference value: a magnitude category then its extra bits
    pub fn decode_diff(&self, reader: &mut BitReader) -> RawResult<i32> {
        let category = self.decode(reader)? as u32;
        match category {
            0 => Ok(0),
            16 => Ok(32768),
            1..=15 => {
                let bits = reader.get_bits(category) as i32;
                Ok(extend(bits, category))
            }
            _ => Err(RawError::HuffmanDecode(format!(
                "difference category {} out of range",
                category
            ))),
        }
    }
}

/// Sign extension of a `size`-bit difference value
fn extend(bits: i32, size: u32) -> i32 {
    if bits < 1 << (size - 1) {
        bits - (1 << size) + 1
    } else {
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(lengths: &[(usize, u8)]) -> [u8; 16] {
        let mut c = [0u8; 16];
        for &(len, n) in lengths {
            c[len - 1] = n;
        }
        c
    }

    #[test]
    fn short_codes() {
        // "0" -> 0, "10" -> 1, "110" -> 2
        let table = HuffmanTable::new(&counts(&[(1, 1), (2, 1), (3, 1)]), &[0, 1, 2]).unwrap();
        let mut r = BitReader::new(&[0b0101_1000]);
        assert_eq!(table.decode(&mut r).unwrap(), 0);
        assert_eq!(table.decode(&mut r).unwrap(), 1);
        assert_eq!(table.decode(&mut r).unwrap(), 2);
    }

    #[test]
    fn long_codes_use_slow_path() {
        // seven codes of length 3, then two of length 10
        let values: Vec<u8> = (0..10).collect();
        let table = HuffmanTable::new(&counts(&[(3, 7), (10, 2)]), &values[..9]).unwrap();
        // length-10 codes start at 0b111 << 7
        let mut r = BitReader::new(&[0b1110_0000, 0b0100_0000]);
        assert_eq!(table.decode(&mut r).unwrap(), 8);
        let mut r = BitReader::new(&[0b1110_0000, 0b0000_0000]);
        assert_eq!(table.decode(&mut r).unwrap(), 7);
        let mut r = BitReader::new(&[0b1100_0000]);
        assert_eq!(table.decode(&mut r).unwrap(), 6);
    }

    #[test]
    fn unmatched_code_is_an_error() {
        let table = HuffmanTable::new(&counts(&[(1, 1), (2, 1), (3, 1)]), &[0, 1, 2]).unwrap();
        let mut r = BitReader::new(&[0xE0, 0x00, 0x00]);
        assert!(matches!(table.decode(&mut r), Err(RawError::HuffmanDecode(_))));
    }

    #[test]
    fn rejects_inconsistent_tables() {
        assert!(HuffmanTable::new(&counts(&[(1, 3)]), &[0, 1, 2]).is_err());
        assert!(HuffmanTable::new(&counts(&[(2, 2)]), &[0]).is_err());
    }

    #[test]
    fn extend_sign() {
        assert_eq!(extend(0, 1), -1);
        assert_eq!(extend(1, 1), 1);
        assert_eq!(extend(1, 2), -2);
        assert_eq!(extend(5, 3), 5);
        assert_eq!(extend(0, 3), -7);
    }
}
