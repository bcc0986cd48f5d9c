use log::{debug, trace, warn};
use smallvec::SmallVec;

use crate::bitstream::BitReader;
use crate::color::{ycbcr_to_rgb, ComponentTiles, Upsampling};
use crate::constants::{Marker, ZIGZAG_TO_NATURAL};
use crate::error::{DecodeError, Result, TableClass};
use crate::huffman::HuffmanTree;
use crate::idct::{inverse_dct, Tile};
use crate::image::{PixelGrid, Rgb};
use crate::jpeg::{Frame, Jpeg, ScanHeader};
use crate::tables::{QuantizationTable, TableStore};

/// 64 dequantized coefficients in natural order.
pub type DecodedBlock = [i32; 64];

#[derive(Clone, Debug, Default)]
pub struct DecodeOptions {
    pub upsampling: Upsampling,
}

/// Decoding state for one component of the current scan: the tables it
/// selected and its running DC prediction.
#[derive(Debug)]
pub struct ScanComponent<'a> {
    /// Position of the component in the frame header.
    pub frame_index: usize,
    /// Blocks per MCU, horizontally and vertically.
    pub h: usize,
    pub v: usize,
    pub dc_table: &'a HuffmanTree,
    pub ac_table: &'a HuffmanTree,
    pub quant_table: &'a QuantizationTable,
    pub dc_predictor: i32,
}

/// Maps a `category`-bit magnitude to its signed value.
fn extend(raw: u16, category: u8) -> i32 {
    let raw = raw as i32;
    if category > 0 && raw < (1 << (category - 1)) {
        raw - (1 << category) + 1
    } else {
        raw
    }
}

/// Decodes one 8x8 block: DC difference, AC run/size pairs, dequantization
/// and un-zigzagging.
pub fn decode_block(reader: &mut BitReader, component: &mut ScanComponent) -> Result<DecodedBlock> {
    let mut ret = [0i32; 64];
    let quant = component.quant_table;

    let category = component.dc_table.decode(reader)?;
    if category > 11 {
        return Err(DecodeError::Malformed(format!("DC magnitude category {}", category)));
    }
    let diff = extend(reader.read_bits(category)?, category);
    component.dc_predictor = component.dc_predictor.wrapping_add(diff);
    ret[0] = component.dc_predictor.wrapping_mul(quant.get(0) as i32);

    let mut k = 1;
    while k < 64 {
        let sym = component.ac_table.decode(reader)?;
        match sym {
            0x00 => break,
            0xF0 => {
                k += 16;
                continue;
            }
            _ => {}
        }
        let run = (sym >> 4) as usize;
        let size = sym & 0x0F;
        if size > 10 {
            return Err(DecodeError::Malformed(format!("AC magnitude category {}", size)));
        }
        k += run;
        if k >= 64 {
            break;
        }
        let value = extend(reader.read_bits(size)?, size);
        let natural = ZIGZAG_TO_NATURAL[k];
        ret[natural] = value.wrapping_mul(quant.get(natural) as i32);
        k += 1;
    }
    Ok(ret)
}

/// Binds every scan component to its frame entry and tables, failing on
/// anything the scan references that was never defined.
///
/// A single-component scan is non-interleaved and gets a 1x1 MCU whatever
/// its sampling factors, following the JPEG standard rather than decoding
/// h x v blocks per MCU. Only block order within wide images is affected.
pub fn resolve_scan<'a>(
    frame: &Frame,
    scan: &ScanHeader,
    tables: &'a TableStore,
) -> Result<SmallVec<ScanComponent<'a>, 4>> {
    if scan.channels.len() != frame.components.len() {
        return Err(DecodeError::Unsupported(format!(
            "scan covers {} of {} components",
            scan.channels.len(),
            frame.components.len()
        )));
    }

    let interleaved = scan.channels.len() > 1;
    let mut ret = SmallVec::new();
    for channel in scan.channels.iter() {
        let frame_index = frame
            .component_index(channel.component_id)
            .ok_or(DecodeError::UnknownComponent(channel.component_id))?;
        if ret.iter().any(|c: &ScanComponent| c.frame_index == frame_index) {
            return Err(DecodeError::Malformed(format!("component {} repeated in scan", channel.component_id)));
        }
        let component = &frame.components[frame_index];
        let (h, v) = if interleaved {
            (component.horizontal_sampling_factor as usize, component.vertical_sampling_factor as usize)
        } else {
            (1, 1)
        };
        ret.push(ScanComponent {
            frame_index,
            h,
            v,
            dc_table: tables.huffman(TableClass::DC, channel.dc_table_id)?,
            ac_table: tables.huffman(TableClass::AC, channel.ac_table_id)?,
            quant_table: tables.quantization(component.quant_table_id)?,
            dc_predictor: 0,
        });
    }
    Ok(ret)
}

/// Runs the MCU loop over the scan's entropy-coded data.
pub(crate) fn decode_scan(jpeg: &Jpeg, options: &DecodeOptions) -> Result<PixelGrid> {
    let frame = &jpeg.frame;
    let mut components = resolve_scan(frame, &jpeg.scan, &jpeg.tables)?;
    let mut reader = BitReader::new(jpeg.bitstream);

    let max_h = components.iter().map(|c| c.h).max().unwrap_or(1);
    let max_v = components.iter().map(|c| c.v).max().unwrap_or(1);
    let (mcu_width, mcu_height) = (8 * max_h, 8 * max_v);
    let (width, height) = (frame.width as usize, frame.height as usize);
    let mcus_x = (width + mcu_width - 1) / mcu_width;
    let mcus_y = (height + mcu_height - 1) / mcu_height;
    let total_mcus = mcus_x * mcus_y;
    let restart_interval = jpeg.restart_interval as usize;
    debug!(
        "decoding {}x{} MCUs of {}x{} pixels, restart interval {}",
        mcus_x, mcus_y, mcu_width, mcu_height, restart_interval
    );

    let mut grid = PixelGrid::new(width, height);
    let mut tiles = vec!(SmallVec::<Tile, 4>::new(); frame.components.len());
    let mut mcu_count = 0;

    for mcu_y in 0..mcus_y {
        trace!("MCU row {} starts at byte {}", mcu_y, reader.position());
        for mcu_x in 0..mcus_x {
            for component in components.iter_mut() {
                let out = &mut tiles[component.frame_index];
                out.clear();
                for _ in 0..(component.h * component.v) {
                    let block = decode_block(&mut reader, component)?;
                    out.push(inverse_dct(&block));
                }
            }

            let planes = components
                .iter()
                .map(|c| ComponentTiles { tiles: &tiles[c.frame_index], h: c.h, v: c.v })
                .collect::<SmallVec<ComponentTiles, 3>>();
            for y in 0..mcu_height {
                let py = mcu_y * mcu_height + y;
                if py >= height {
                    break;
                }
                for x in 0..mcu_width {
                    let px = mcu_x * mcu_width + x;
                    if px >= width {
                        break;
                    }
                    grid.set(px, py, mcu_pixel(frame, &components, &planes, x, y, max_h, max_v, options));
                }
            }

            mcu_count += 1;
            if restart_interval > 0 && mcu_count % restart_interval == 0 && mcu_count < total_mcus {
                reader.align();
                if !reader.take_restart() {
                    warn!("restart marker missing after MCU {}", mcu_count);
                }
                for component in components.iter_mut() {
                    component.dc_predictor = 0;
                }
            }
        }
    }

    match reader.end_marker() {
        None | Some(Marker::EOI) => {}
        Some(marker) => warn!("scan ended on {:?} instead of EOI; later scans are ignored", marker),
    }
    Ok(grid)
}

#[allow(clippy::too_many_arguments)]
fn mcu_pixel(
    frame: &Frame,
    components: &[ScanComponent],
    planes: &[ComponentTiles],
    x: usize,
    y: usize,
    max_h: usize,
    max_v: usize,
    options: &DecodeOptions,
) -> Rgb {
    // Planes are in scan order; colour roles follow frame order.
    let plane = |role: usize| {
        let position = components.iter().position(|c| c.frame_index == role).unwrap_or(role);
        planes[position].upsample(x, y, max_h, max_v, options.upsampling)
    };
    if frame.components.len() == 1 {
        Rgb::gray(planes[0].sample(x as i64, y as i64))
    } else {
        ycbcr_to_rgb(plane(0), plane(1), plane(2))
    }
}

/// Decodes a baseline JPEG into RGB pixels using default options.
pub fn decode(input: &[u8]) -> Result<PixelGrid> {
    decode_with_options(input, &DecodeOptions::default())
}

pub fn decode_with_options(input: &[u8], options: &DecodeOptions) -> Result<PixelGrid> {
    let jpeg = Jpeg::from_slice(input)?;
    decode_scan(&jpeg, options)
}
