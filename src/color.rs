use crate::idct::Tile;
use crate::image::Rgb;

/// How subsampled planes are stretched back to full resolution.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Upsampling {
    /// Bilinear interpolation with sample centres at half-pixel offsets.
    #[default]
    Bilinear,
    /// Each output pixel takes the sample covering it.
    NearestNeighbor,
}

/// The decoded tiles of one component within one MCU.
pub struct ComponentTiles<'a> {
    /// `h * v` tiles, row-major by block position.
    pub tiles: &'a [Tile],
    pub h: usize,
    pub v: usize,
}

impl ComponentTiles<'_> {
    /// Sample at `(col, row)` in the component's MCU-local grid, clamped to its edges.
    pub fn sample(&self, col: i64, row: i64) -> u8 {
        let col = col.clamp(0, (self.h * 8) as i64 - 1) as usize;
        let row = row.clamp(0, (self.v * 8) as i64 - 1) as usize;
        match self.tiles.get((row / 8) * self.h + col / 8) {
            Some(tile) => tile[(row % 8) * 8 + col % 8],
            None => 0,
        }
    }

    /// Value for MCU pixel `(x, y)` when the MCU spans `max_h x max_v` blocks.
    pub fn upsample(&self, x: usize, y: usize, max_h: usize, max_v: usize, kind: Upsampling) -> u8 {
        match kind {
            Upsampling::NearestNeighbor => {
                self.sample(((x * self.h) / max_h) as i64, ((y * self.v) / max_v) as i64)
            }
            Upsampling::Bilinear => {
                let u = (x as f64 + 0.5) * self.h as f64 / max_h as f64 - 0.5;
                let v = (y as f64 + 0.5) * self.v as f64 / max_v as f64 - 0.5;
                let col = u.floor();
                let row = v.floor();
                let fx = u - col;
                let fy = v - row;
                let (col, row) = (col as i64, row as i64);

                let s00 = self.sample(col, row) as f64;
                let s10 = self.sample(col + 1, row) as f64;
                let s01 = self.sample(col, row + 1) as f64;
                let s11 = self.sample(col + 1, row + 1) as f64;

                let res = (1. - fx) * (1. - fy) * s00
                    + fx * (1. - fy) * s10
                    + (1. - fx) * fy * s01
                    + fx * fy * s11;
                res.round().clamp(0., 255.) as u8
            }
        }
    }
}

fn to_byte(value: f64) -> u8 {
    value.round().clamp(0., 255.) as u8
}

pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> Rgb {
    let y = y as f64;
    let cb = cb as f64 - 128.;
    let cr = cr as f64 - 128.;
    Rgb {
        r: to_byte(y + 1.402 * cr),
        g: to_byte(y - 0.344136 * cb - 0.714136 * cr),
        b: to_byte(y + 1.772 * cb),
    }
}
