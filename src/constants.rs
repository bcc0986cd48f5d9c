/// Zigzag scan position to natural (row-major 8x8) position.
pub const ZIGZAG_TO_NATURAL: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10,
    17, 24, 32, 25, 18, 11, 4, 5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6, 7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63
];

/// A marker code, i.e. the byte following 0xFF outside of entropy-coded data.
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy)]
pub enum Marker {
    /// Baseline DCT frame header.
    SOF0,
    /// Any other frame type (extended, progressive, lossless, arithmetic...).
    SOF(u8),
    DHT,
    DAC,
    RST(u8),
    SOI,
    EOI,
    SOS,
    DQT,
    DNL,
    DRI,
    APP(u8),
    COM,
    TEM,
    /// Reserved or otherwise uninterpreted marker code.
    Other(u8),
}

impl Marker {
    pub fn code(self) -> u8 {
        match self {
            Marker::SOF0 => 0xC0,
            Marker::SOF(n) => 0xC0 + n,
            Marker::DHT => 0xC4,
            Marker::DAC => 0xCC,
            Marker::RST(n) => 0xD0 + n,
            Marker::SOI => 0xD8,
            Marker::EOI => 0xD9,
            Marker::SOS => 0xDA,
            Marker::DQT => 0xDB,
            Marker::DNL => 0xDC,
            Marker::DRI => 0xDD,
            Marker::APP(n) => 0xE0 + n,
            Marker::COM => 0xFE,
            Marker::TEM => 0x01,
            Marker::Other(code) => code,
        }
    }

    /// Frame types and coding modes this decoder refuses outright.
    pub fn is_unsupported(self) -> bool {
        matches!(self, Marker::SOF(_) | Marker::DAC)
    }

    /// Markers that stand alone, without a length field or payload.
    pub fn is_standalone(self) -> bool {
        matches!(self, Marker::SOI | Marker::EOI | Marker::RST(_) | Marker::TEM)
    }
}

impl From<u8> for Marker {
    fn from(code: u8) -> Self {
        match code {
            0xC0 => Marker::SOF0,
            0xC4 => Marker::DHT,
            0xCC => Marker::DAC,
            // 0xC8 is the reserved JPG extension marker, not a frame type.
            0xC8 => Marker::Other(code),
            0xC1..=0xCF => Marker::SOF(code - 0xC0),
            0xD0..=0xD7 => Marker::RST(code - 0xD0),
            0xD8 => Marker::SOI,
            0xD9 => Marker::EOI,
            0xDA => Marker::SOS,
            0xDB => Marker::DQT,
            0xDC => Marker::DNL,
            0xDD => Marker::DRI,
            0xE0..=0xEF => Marker::APP(code - 0xE0),
            0xFE => Marker::COM,
            0x01 => Marker::TEM,
            _ => Marker::Other(code),
        }
    }
}
