//! Builds small synthetic baseline JPEG files for the decoder tests.
//!
//! Every image uses the same two Huffman tables: a DC table giving each
//! magnitude category 0-11 a fixed 4-bit code equal to the category, and an
//! AC table whose only code is `0` for end-of-block. A block is therefore
//! written as a DC difference followed by a single `0` bit.
#![allow(dead_code)]

/// Packs bits most significant first, stuffing a zero after every 0xFF.
#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter::default()
    }

    pub fn bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        if self.filled == 8 {
            self.emit(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    pub fn bits(&mut self, value: u16, count: u8) {
        for i in (0..count).rev() {
            self.bit((value >> i) & 1 == 1);
        }
    }

    /// One block whose DC coefficient differs from the previous block's by `diff`.
    pub fn block(&mut self, diff: i32) {
        let category = (32 - diff.unsigned_abs().leading_zeros()) as u8;
        let magnitude = if diff >= 0 { diff } else { diff + (1 << category) - 1 };
        self.bits(category as u16, 4);
        self.bits(magnitude as u16, category);
        self.bit(false);
    }

    /// Pads the partial byte with 1 bits.
    pub fn flush(&mut self) {
        while self.filled != 0 {
            self.bit(true);
        }
    }

    /// Pads to a byte boundary and writes RSTn.
    pub fn restart(&mut self, n: u8) {
        self.flush();
        self.bytes.extend_from_slice(&[0xFF, 0xD0 + (n % 8)]);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.bytes
    }

    fn emit(&mut self, byte: u8) {
        self.bytes.push(byte);
        if byte == 0xFF {
            self.bytes.push(0x00);
        }
    }
}

/// Entropy-coded data for a run of blocks, one DC difference each.
pub fn blocks(diffs: &[i32]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for diff in diffs {
        writer.block(*diff);
    }
    writer.finish()
}

/// Frame component: id, horizontal and vertical sampling, quantization table.
pub type FrameComponent = (u8, u8, u8, u8);

pub struct JpegBuilder {
    bytes: Vec<u8>,
}

impl JpegBuilder {
    pub fn new() -> Self {
        JpegBuilder { bytes: vec!(0xFF, 0xD8) }
    }

    pub fn segment(mut self, marker: u8, body: &[u8]) -> Self {
        self.bytes.extend_from_slice(&[0xFF, marker]);
        self.bytes.extend_from_slice(&(body.len() as u16 + 2).to_be_bytes());
        self.bytes.extend_from_slice(body);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// An 8-bit quantization table with every entry set to `value`.
    pub fn flat_quantization(self, id: u8, value: u8) -> Self {
        let mut body = vec!(id);
        body.extend_from_slice(&[value; 64]);
        self.segment(0xDB, &body)
    }

    /// The DC and AC tables described in the module docs, both under `id`.
    pub fn huffman_tables(self, id: u8) -> Self {
        let mut body = vec!(id);
        let mut dc_counts = [0u8; 16];
        dc_counts[3] = 12;
        body.extend_from_slice(&dc_counts);
        body.extend(0..12u8);

        body.push(0x10 | id);
        let mut ac_counts = [0u8; 16];
        ac_counts[0] = 1;
        body.extend_from_slice(&ac_counts);
        body.push(0x00);
        self.segment(0xC4, &body)
    }

    pub fn frame(self, width: u16, height: u16, components: &[FrameComponent]) -> Self {
        let mut body = vec!(8);
        body.extend_from_slice(&height.to_be_bytes());
        body.extend_from_slice(&width.to_be_bytes());
        body.push(components.len() as u8);
        for (id, h, v, quant) in components {
            body.extend_from_slice(&[*id, (h << 4) | v, *quant]);
        }
        self.segment(0xC0, &body)
    }

    pub fn restart_interval(self, interval: u16) -> Self {
        self.segment(0xDD, &interval.to_be_bytes())
    }

    /// Scan header naming `(component id, DC table, AC table)` per component,
    /// followed by the entropy-coded `data`.
    pub fn scan(self, components: &[(u8, u8, u8)], data: &[u8]) -> Self {
        let mut body = vec!(components.len() as u8);
        for (id, dc, ac) in components {
            body.extend_from_slice(&[*id, (dc << 4) | ac]);
        }
        body.extend_from_slice(&[0, 63, 0]);
        self.segment(0xDA, &body).raw(data)
    }

    pub fn end(self) -> Vec<u8> {
        self.raw(&[0xFF, 0xD9]).bytes
    }
}

/// Grayscale image of `width x height` with quantization 1 and the given
/// block DC differences.
pub fn gray_jpeg(width: u16, height: u16, diffs: &[i32]) -> Vec<u8> {
    JpegBuilder::new()
        .flat_quantization(0, 1)
        .huffman_tables(0)
        .frame(width, height, &[(1, 1, 1, 0)])
        .scan(&[(1, 0, 0)], &blocks(diffs))
        .end()
}
