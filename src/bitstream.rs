use bitvec::prelude::*;
use log::trace;

use crate::constants::Marker;
use crate::error::{DecodeError, Result};

/// Reads entropy-coded scan data one bit at a time, most significant bit first.
///
/// Stuffed `0xFF 0x00` pairs yield a single `0xFF` data byte. Restart markers
/// are consumed and remembered in a flag that the MCU loop polls between
/// MCUs. Any other marker ends the segment: it is recorded and no further
/// bits are handed out.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    current: u8,
    bit_index: usize,
    restart_seen: bool,
    end_marker: Option<Marker>,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            pos: 0,
            current: 0,
            bit_index: 8,
            restart_seen: false,
            end_marker: None,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_index == 8 {
            self.next_byte()?;
        }
        let bit = self.current.view_bits::<Msb0>()[self.bit_index];
        self.bit_index += 1;
        Ok(bit)
    }

    /// Reads `count` bits as an unsigned big-endian value.
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        let mut value = 0u16;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u16;
        }
        Ok(value)
    }

    /// Drops whatever is left of the current byte.
    pub fn align(&mut self) {
        self.bit_index = 8;
    }

    /// Clears and returns the restart flag.
    ///
    /// If the flag is not already set, a restart marker sitting right at the
    /// read position is consumed as well. Only meaningful after `align`.
    pub fn take_restart(&mut self) -> bool {
        if !self.restart_seen && self.end_marker.is_none() {
            while self.pos + 1 < self.data.len() && self.data[self.pos] == 0xFF {
                match Marker::from(self.data[self.pos + 1]) {
                    // Fill byte before the marker.
                    Marker::Other(0xFF) => self.pos += 1,
                    Marker::RST(n) => {
                        trace!("restart marker RST{} at byte {}", n, self.pos);
                        self.pos += 2;
                        self.restart_seen = true;
                        break;
                    }
                    _ => break,
                }
            }
        }
        std::mem::replace(&mut self.restart_seen, false)
    }

    /// The marker that terminated the entropy-coded segment, once reached.
    pub fn end_marker(&self) -> Option<Marker> {
        self.end_marker
    }

    /// Offset just past the last byte consumed.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn next_byte(&mut self) -> Result<()> {
        loop {
            if self.end_marker.is_some() {
                return Err(DecodeError::Truncated("entropy-coded segment ended mid-scan"));
            }
            let byte = *self.data.get(self.pos).ok_or(DecodeError::Truncated("entropy-coded data"))?;
            self.pos += 1;
            if byte != 0xFF {
                self.current = byte;
                self.bit_index = 0;
                return Ok(());
            }

            let next = *self.data.get(self.pos).ok_or(DecodeError::Truncated("entropy-coded data"))?;
            self.pos += 1;
            match next {
                0x00 => {
                    self.current = 0xFF;
                    self.bit_index = 0;
                    return Ok(());
                }
                0xD0..=0xD7 => {
                    trace!("restart marker RST{} at byte {}", next - 0xD0, self.pos - 2);
                    self.restart_seen = true;
                }
                // A run of fill bytes: the last 0xFF introduces the marker.
                0xFF => self.pos -= 1,
                code => {
                    self.end_marker = Some(Marker::from(code));
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_bits_msb_first() {
        let data = vec!(0xA5, 0x0F);
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
        assert_eq!(reader.read_bits(4).unwrap(), 0b0101);
        assert_eq!(reader.read_bits(8).unwrap(), 0x0F);
    }

    #[test]
    fn test_stuffed_byte() {
        let data = vec!(0xFF, 0x00, 0x80);
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(12).unwrap(), 0xFF8);
        assert!(!reader.take_restart());
    }

    #[test]
    fn test_restart_marker_is_transparent() {
        let data = vec!(0x12, 0xFF, 0xD0, 0x34);
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(8).unwrap(), 0x12);
        assert_eq!(reader.read_bits(8).unwrap(), 0x34);
        assert!(reader.take_restart());
        assert!(!reader.take_restart());
    }

    #[test]
    fn test_take_restart_consumes_pending_marker() {
        let data = vec!(0xF0, 0xFF, 0xD1, 0xAB);
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b111);
        reader.align();
        assert!(reader.take_restart());
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
    }

    #[test]
    fn test_terminating_marker() {
        let data = vec!(0xAB, 0xFF, 0xD9);
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
        assert_eq!(reader.read_bit(), Err(DecodeError::Truncated("entropy-coded segment ended mid-scan")));
        assert_eq!(reader.end_marker(), Some(Marker::EOI));
        assert!(!reader.take_restart());
    }

    #[test]
    fn test_fill_bytes_before_marker() {
        let data = vec!(0x01, 0xFF, 0xFF, 0xFF, 0xD9);
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(8).unwrap(), 0x01);
        assert!(reader.read_bit().is_err());
        assert_eq!(reader.end_marker(), Some(Marker::EOI));
    }

    #[test]
    fn test_end_of_input() {
        let data = vec!(0x01);
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(8).unwrap(), 0x01);
        assert_eq!(reader.read_bit(), Err(DecodeError::Truncated("entropy-coded data")));
        assert_eq!(reader.end_marker(), None);
    }
}
