use log::{debug, warn};
use smallvec::SmallVec;

use crate::constants::Marker;
use crate::error::{DecodeError, Result, TableClass};
use crate::huffman::HuffmanTree;
use crate::tables::{QuantizationTable, TableStore};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Component {
    pub id: u8,
    pub horizontal_sampling_factor: u8,
    pub vertical_sampling_factor: u8,
    pub quant_table_id: u8,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: SmallVec<Component, 3>,
}

impl Frame {
    pub fn max_horizontal_sampling_factor(&self) -> u8 {
        self.components.iter().map(|c| c.horizontal_sampling_factor).max().unwrap_or(1)
    }

    pub fn max_vertical_sampling_factor(&self) -> u8 {
        self.components.iter().map(|c| c.vertical_sampling_factor).max().unwrap_or(1)
    }

    /// MCU size in pixels, as (width, height).
    pub fn mcu_size(&self) -> (usize, usize) {
        (
            8 * self.max_horizontal_sampling_factor() as usize,
            8 * self.max_vertical_sampling_factor() as usize,
        )
    }

    /// Number of MCUs across and down, counting partial MCUs at the edges.
    pub fn mcu_count(&self) -> (usize, usize) {
        let (mcu_width, mcu_height) = self.mcu_size();
        (
            (self.width as usize + mcu_width - 1) / mcu_width,
            (self.height as usize + mcu_height - 1) / mcu_height,
        )
    }

    pub fn component_index(&self, id: u8) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }
}

/// Table selectors for one component of a scan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanChannel {
    pub component_id: u8,
    pub dc_table_id: u8,
    pub ac_table_id: u8,
}

#[derive(Clone, Debug)]
pub struct ScanHeader {
    pub channels: SmallVec<ScanChannel, 4>,
    pub first_dct_coeff: u8,
    pub last_dct_coeff: u8,
    pub successive_approx_high: u8,
    pub successive_approx_low: u8,
}

/// One table as declared in a DHT segment, before its tree is built.
#[derive(Debug, Eq, PartialEq)]
pub struct HuffmanTableSpec {
    pub class: TableClass,
    pub index: u8,
    pub lengths: [u8; 16],
    pub symbols: SmallVec<u8, 162>,
}

impl HuffmanTableSpec {
    pub fn build(&self) -> Result<HuffmanTree> {
        HuffmanTree::build(&self.lengths, &self.symbols)
    }
}

/// Where the segment parser is in the marker stream.
#[derive(Debug)]
pub enum ParserState {
    BeforeFrame,
    FrameKnown(Frame),
    InScan,
    EndOfImage,
}

/// Everything needed to decode the first scan, plus the scan's entropy-coded bytes.
#[derive(Debug)]
pub struct Jpeg<'a> {
    pub frame: Frame,
    pub tables: TableStore,
    pub restart_interval: u16,
    pub scan: ScanHeader,
    /// Input from the first entropy-coded byte to the end of the file.
    pub bitstream: &'a [u8],
}

fn get_u16(buf: &[u8], offset: usize) -> u16 {
    ((buf[offset] as u16) << 8) | buf[offset + 1] as u16
}

fn too_short(segment: &str) -> DecodeError {
    DecodeError::Malformed(format!("{} segment too short", segment))
}

pub(crate) fn parse_quantization_table(buf: &[u8]) -> Result<Vec<(u8, QuantizationTable)>> {
    let mut offset = 0;
    let mut ret = Vec::new();
    while offset < buf.len() {
        let precision = buf[offset] >> 4;
        let id = buf[offset] & 0x0F;
        let width = match precision {
            0 => 1,
            1 => 2,
            _ => return Err(DecodeError::Malformed(format!("quantization table precision {}", precision))),
        };
        let body = buf.get((offset + 1)..(offset + 1 + 64 * width)).ok_or_else(|| too_short("DQT"))?;
        let mut zigzag = [0u16; 64];
        for (i, value) in zigzag.iter_mut().enumerate() {
            *value = if width == 2 { get_u16(body, 2 * i) } else { body[i] as u16 };
        }
        ret.push((id, QuantizationTable::from_zigzag(&zigzag)));
        offset += 1 + 64 * width;
    }
    Ok(ret)
}

pub(crate) fn parse_huffman_table(buf: &[u8]) -> Result<Vec<HuffmanTableSpec>> {
    let mut offset = 0;
    let mut ret = Vec::new();
    while offset < buf.len() {
        let class = match buf[offset] >> 4 {
            0 => TableClass::DC,
            1 => TableClass::AC,
            other => return Err(DecodeError::Malformed(format!("Huffman table class {}", other))),
        };
        let index = buf[offset] & 0x0F;
        let mut lengths = [0u8; 16];
        lengths.copy_from_slice(buf.get((offset + 1)..(offset + 17)).ok_or_else(|| too_short("DHT"))?);
        let sym_count = lengths.iter().map(|len| *len as usize).sum::<usize>();
        let symbols = buf.get((offset + 17)..(offset + 17 + sym_count)).ok_or_else(|| too_short("DHT"))?;

        ret.push(HuffmanTableSpec {
            class,
            index,
            lengths,
            symbols: SmallVec::from(symbols),
        });
        offset += 17 + sym_count;
    }
    Ok(ret)
}

/// Returns `None` for a DRI segment of the wrong size, which is ignored.
pub(crate) fn parse_restart_interval(buf: &[u8]) -> Option<u16> {
    if buf.len() != 2 {
        return None;
    }
    Some(get_u16(buf, 0))
}

pub(crate) fn parse_start_of_frame_0(buf: &[u8]) -> Result<Frame> {
    if buf.len() < 6 {
        return Err(too_short("SOF0"));
    }
    let precision = buf[0];
    if precision != 8 {
        return Err(DecodeError::Unsupported(format!("{}-bit sample precision", precision)));
    }
    let height = get_u16(buf, 1);
    let width = get_u16(buf, 3);
    if height == 0 || width == 0 {
        return Err(DecodeError::Malformed(format!("image dimensions {}x{}", width, height)));
    }
    let channels = buf[5] as usize;
    if channels != 1 && channels != 3 {
        return Err(DecodeError::Unsupported(format!("{} color components", channels)));
    }
    if buf.len() < 6 + 3 * channels {
        return Err(too_short("SOF0"));
    }

    let mut components = SmallVec::<Component, 3>::new();
    for i in 0..channels {
        let id = buf[6 + 3 * i];
        let component = Component {
            id,
            horizontal_sampling_factor: buf[6 + 3 * i + 1] >> 4,
            vertical_sampling_factor: buf[6 + 3 * i + 1] & 0x0F,
            quant_table_id: buf[6 + 3 * i + 2],
        };
        if !(1..=4).contains(&component.horizontal_sampling_factor)
            || !(1..=4).contains(&component.vertical_sampling_factor)
        {
            return Err(DecodeError::Malformed(format!(
                "sampling factors {}x{} for component {}",
                component.horizontal_sampling_factor, component.vertical_sampling_factor, id
            )));
        }
        if component.quant_table_id > 3 {
            return Err(DecodeError::Malformed(format!("quantization table selector {}", component.quant_table_id)));
        }
        if components.iter().any(|c| c.id == id) {
            return Err(DecodeError::Malformed(format!("duplicate component id {}", id)));
        }
        components.push(component);
    }

    Ok(Frame { precision, height, width, components })
}

pub(crate) fn parse_start_of_scan(buf: &[u8]) -> Result<ScanHeader> {
    let num_channels = *buf.first().ok_or_else(|| too_short("SOS"))? as usize;
    if !(1..=4).contains(&num_channels) {
        return Err(DecodeError::Malformed(format!("{} components in scan", num_channels)));
    }
    if buf.len() < 1 + 2 * num_channels + 3 {
        return Err(too_short("SOS"));
    }

    let mut channels = SmallVec::<ScanChannel, 4>::new();
    for i in 0..num_channels {
        let offset = 1 + 2 * i;
        channels.push(ScanChannel {
            component_id: buf[offset],
            dc_table_id: buf[offset + 1] >> 4,
            ac_table_id: buf[offset + 1] & 0x0F,
        });
    }
    let tail = 1 + 2 * num_channels;
    let scan = ScanHeader {
        channels,
        first_dct_coeff: buf[tail],
        last_dct_coeff: buf[tail + 1],
        successive_approx_high: buf[tail + 2] >> 4,
        successive_approx_low: buf[tail + 2] & 0x0F,
    };
    if scan.first_dct_coeff != 0
        || scan.last_dct_coeff != 63
        || scan.successive_approx_high != 0
        || scan.successive_approx_low != 0
    {
        return Err(DecodeError::Unsupported(format!(
            "non-baseline scan (Ss={}, Se={}, Ah={}, Al={})",
            scan.first_dct_coeff, scan.last_dct_coeff, scan.successive_approx_high, scan.successive_approx_low
        )));
    }
    Ok(scan)
}

/// Walks marker segments up to the first scan, collecting tables and the frame header.
pub struct SegmentParser<'a> {
    data: &'a [u8],
    offset: usize,
    tables: TableStore,
    restart_interval: u16,
    state: ParserState,
}

impl<'a> SegmentParser<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < 2 || data[0] != 0xFF || Marker::from(data[1]) != Marker::SOI {
            return Err(DecodeError::MissingSoi);
        }
        Ok(SegmentParser {
            data,
            offset: 2,
            tables: TableStore::default(),
            restart_interval: 0,
            state: ParserState::BeforeFrame,
        })
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Parses segments until the scan header, then hands off the scan.
    ///
    /// Afterwards `state()` is `InScan` on success and `EndOfImage` if EOI
    /// came first.
    pub fn run(&mut self) -> Result<Jpeg<'a>> {
        loop {
            let marker = self.next_marker()?;
            if marker.is_unsupported() {
                return Err(DecodeError::Unsupported(format!("marker 0xFF{:02X}", marker.code())));
            }
            match marker {
                Marker::EOI => {
                    self.state = ParserState::EndOfImage;
                    return Err(DecodeError::NoScan);
                }
                standalone if standalone.is_standalone() => {
                    warn!("ignoring stray {:?} marker at byte {}", standalone, self.offset - 2);
                }
                Marker::SOS => {
                    let body = self.segment_body("SOS")?;
                    let frame = match std::mem::replace(&mut self.state, ParserState::InScan) {
                        ParserState::FrameKnown(frame) => frame,
                        other => {
                            self.state = other;
                            return Err(DecodeError::ScanBeforeFrame);
                        }
                    };
                    let scan = parse_start_of_scan(body)?;
                    debug!("SOS: {} component(s), entropy data at byte {}", scan.channels.len(), self.offset);
                    return Ok(Jpeg {
                        frame,
                        tables: std::mem::take(&mut self.tables),
                        restart_interval: self.restart_interval,
                        scan,
                        bitstream: &self.data[self.offset..],
                    });
                }
                Marker::SOF0 => {
                    let body = self.segment_body("SOF0")?;
                    if !matches!(self.state, ParserState::BeforeFrame) {
                        return Err(DecodeError::DuplicateFrame);
                    }
                    let frame = parse_start_of_frame_0(body)?;
                    debug!(
                        "SOF0: {}x{}, {} component(s), MCU {:?}",
                        frame.width,
                        frame.height,
                        frame.components.len(),
                        frame.mcu_size()
                    );
                    self.state = ParserState::FrameKnown(frame);
                }
                Marker::DQT => {
                    let body = self.segment_body("DQT")?;
                    for (id, table) in parse_quantization_table(body)? {
                        debug!("DQT: table {}", id);
                        self.tables.set_quantization(id, table)?;
                    }
                }
                Marker::DHT => {
                    let body = self.segment_body("DHT")?;
                    for spec in parse_huffman_table(body)? {
                        debug!("DHT: {} table {}, {} symbols", spec.class, spec.index, spec.symbols.len());
                        let tree = spec.build()?;
                        self.tables.set_huffman(spec.class, spec.index, tree)?;
                    }
                }
                Marker::DRI => {
                    let body = self.segment_body("DRI")?;
                    match parse_restart_interval(body) {
                        Some(interval) => {
                            debug!("DRI: restart every {} MCUs", interval);
                            self.restart_interval = interval;
                        }
                        None => warn!("ignoring DRI segment with {} payload bytes", body.len()),
                    }
                }
                other => {
                    let body = self.segment_body("marker")?;
                    debug!("skipping {:?} segment ({} bytes)", other, body.len());
                }
            }
        }
    }

    /// Reads the next marker code, skipping fill bytes and any junk before it.
    fn next_marker(&mut self) -> Result<Marker> {
        loop {
            let junk_start = self.offset;
            while self.offset < self.data.len() && self.data[self.offset] != 0xFF {
                self.offset += 1;
            }
            if self.offset != junk_start {
                warn!("skipped {} junk bytes at byte {}", self.offset - junk_start, junk_start);
            }
            while self.offset + 1 < self.data.len() && self.data[self.offset + 1] == 0xFF {
                self.offset += 1;
            }
            if self.offset + 1 >= self.data.len() {
                return Err(DecodeError::Truncated("looking for a marker"));
            }
            let code = self.data[self.offset + 1];
            self.offset += 2;
            if code != 0x00 {
                return Ok(Marker::from(code));
            }
        }
    }

    /// Reads a length-prefixed payload and moves past it.
    fn segment_body(&mut self, segment: &'static str) -> Result<&'a [u8]> {
        if self.offset + 2 > self.data.len() {
            return Err(DecodeError::Truncated(segment));
        }
        let length = get_u16(self.data, self.offset) as usize;
        if length < 2 {
            return Err(DecodeError::Malformed(format!("{} segment length {} too short", segment, length)));
        }
        let body = self
            .data
            .get((self.offset + 2)..(self.offset + length))
            .ok_or(DecodeError::Truncated(segment))?;
        self.offset += length;
        Ok(body)
    }
}

impl<'a> Jpeg<'a> {
    pub fn from_slice(file: &'a [u8]) -> Result<Self> {
        SegmentParser::new(file)?.run()
    }
}
