//! MSB-first bit reader over entropy-coded data
//!
//! In JPEG mode `FF 00` decodes to `FF` and any other byte after `FF`
//! ends the entropy-coded segment. Past the end of the segment the reader
//! supplies zero bits and counts them, so callers can tell a stream that ran
//! dry from one that was merely padded.

/// Bit reader with a 64-bit buffer, filled a byte at a time
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    buf: u64,
    /// Valid bits in `buf`
    bits: u32,
    /// Zero bits appended after the end of the segment
    padding: u32,
    /// Marker that ended the segment, if one was seen
    marker: Option<u8>,
    /// Whether `FF 00` stuffing and markers apply
    stuffed: bool,
}

impl<'a> BitReader<'a> {
    /// Reader for JPEG entropy-coded data
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            pos: 0,
            buf: 0,
            bits: 0,
            padding: 0,
            marker: None,
            stuffed: true,
        }
    }

    /// Reader for plain packed data without byte stuffing
    pub fn unstuffed(data: &'a [u8]) -> Self {
        BitReader {
            stuffed: false,
            ..BitReader::new(data)
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.marker.is_some() || self.pos >= self.data.len() {
            self.padding += 8;
            return 0;
        }

        let byte = self.data[self.pos];
        self.pos += 1;
        if !self.stuffed || byte != 0xFF {
            return byte;
        }

        match self.data.get(self.pos) {
            Some(0x00) => {
                self.pos += 1;
                0xFF
            }
            Some(&marker) => {
                // leave the marker for `next_marker`
                self.marker = Some(marker);
                self.pos -= 1;
                self.padding += 8;
                0
            }
            None => {
                self.pos -= 1;
                self.padding += 8;
                0
            }
        }
    }

    fn fill(&mut self) {
        while self.bits <= 56 {
            let byte = self.next_byte() as u64;
            self.buf |= byte << (56 - self.bits);
            self.bits += 8;
        }
    }

    /// Next `n` bits without consuming them, `n <= 32`
    pub fn peek_bits(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        if self.bits < n {
            self.fill();
        }
        (self.buf >> (64 - n)) as u32
    }

    /// Consumes `n` bits previously peeked
    pub fn skip_bits(&mut self, n: u32) {
        if n == 0 {
            return;
        }
        if self.bits < n {
            self.fill();
        }
        self.buf <<= n;
        self.bits -= n;
    }

    /// Reads `n` bits, `n <= 32`
    pub fn get_bits(&mut self, n: u32) -> u32 {
        let value = self.peek_bits(n);
        self.skip_bits(n);
        value
    }

    /// Whether bits past the end of the segment have been consumed
    pub fn overrun(&self) -> bool {
        self.padding > self.bits
    }

    /// Marker that ended the segment, if reached
    pub fn pending_marker(&self) -> Option<u8> {
        self.marker
    }

    /// Discards buffered bits and locates the next marker
    ///
    /// Returns the marker code and positions the reader just past it, with
    /// a fresh bit buffer. `FF` fill bytes before a marker are skipped.
    pub fn next_marker(&mut self) -> Option<u8> {
        self.buf = 0;
        self.bits = 0;
        self.padding = 0;
        self.marker = None;

        let mut i = self.pos;
        while i + 1 < self.data.len() {
            if self.data[i] == 0xFF {
                let code = self.data[i + 1];
                if code != 0x00 && code != 0xFF {
                    self.pos = i + 2;
                    return Some(code);
                }
            }
            i += 1;
        }
        self.pos = self.data.len();
        None
    }

    /// Bytes consumed from the input so far
    pub fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_msb_first() {
        let mut r = BitReader::new(&[0b1011_0011, 0b0100_1101]);
        assert_eq!(r.get_bits(3), 0b101);
        assert_eq!(r.get_bits(7), 0b1001101);
        assert_eq!(r.peek_bits(6), 0b001101);
        assert!(!r.overrun());
    }

    #[test]
    fn stuffed_ff_is_data() {
        let mut r = BitReader::new(&[0xFF, 0x00, 0x12]);
        assert_eq!(r.get_bits(16), 0xFF12);
        assert!(!r.overrun());
        assert_eq!(r.pending_marker(), None);
    }

    #[test]
    fn marker_ends_segment() {
        let mut r = BitReader::new(&[0xAB, 0xFF, 0xD0, 0xCD]);
        assert_eq!(r.get_bits(8), 0xAB);
        assert_eq!(r.get_bits(8), 0);
        assert!(r.overrun());
        assert_eq!(r.pending_marker(), Some(0xD0));
        assert_eq!(r.next_marker(), Some(0xD0));
        assert_eq!(r.get_bits(8), 0xCD);
    }

    #[test]
    fn fill_bytes_before_marker() {
        let mut r = BitReader::new(&[0x80, 0xFF, 0xFF, 0xD9]);
        r.get_bits(1);
        assert_eq!(r.next_marker(), Some(0xD9));
    }

    #[test]
    fn end_of_data_pads_zeros() {
        let mut r = BitReader::unstuffed(&[0xFF, 0xD8]);
        assert_eq!(r.get_bits(16), 0xFFD8);
        assert!(!r.overrun());
        assert_eq!(r.get_bits(4), 0);
        assert!(r.overrun());
    }
}
